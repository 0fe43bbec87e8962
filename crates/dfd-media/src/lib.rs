#![deny(unreachable_patterns)]
//! Media handling for detection requests.
//!
//! This crate provides:
//! - FFprobe metadata and an FFmpeg rawvideo frame decoder
//! - Deterministic stride-based frame sampling
//! - Center-crop and mean/std normalization into extractor tensors
//! - Image decoding and JPEG/base64 encoding for responses
//! - Scoped temporary files for uploaded videos

pub mod decode;
pub mod error;
pub mod frame;
pub mod image_io;
pub mod probe;
pub mod sampler;
pub mod tensor;
pub mod upload;

pub use decode::{ChannelOrder, DecodedFrame, FfmpegDecoder, VideoDecoder, VideoMetadata};
pub use error::{MediaError, MediaResult};
pub use frame::SampledFrame;
pub use image_io::{decode_image, encode_jpeg_base64};
pub use probe::{probe_video, VideoInfo};
pub use sampler::{compute_stride, extract_frames, sample_frames};
pub use tensor::{normalize, normalize_batch, NormalizedBatch, CROP_SIZE, IMAGENET_MEAN, IMAGENET_STD};
pub use upload::{persist_upload, upload_suffix, TempUpload};
