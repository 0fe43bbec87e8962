//! Deterministic frame sampling.
//!
//! A single stride is fixed before decoding starts:
//! - no target rate: `max(1, frame_count / max_frames)`, spreading the sample
//!   across the whole video
//! - target rate: `max(1, round(fps / frame_rate))`
//!
//! The video is then walked from frame 0 and every frame whose position is a
//! multiple of the stride is kept, until `max_frames` are kept or the stream
//! ends. The decoder is closed on every exit path.

use std::path::Path;

use dfd_models::VideoSamplingParams;
use tracing::debug;

use crate::decode::{FfmpegDecoder, VideoDecoder, VideoMetadata};
use crate::error::MediaResult;
use crate::frame::SampledFrame;

/// Distance between accepted frames. Always at least 1.
pub fn compute_stride(metadata: &VideoMetadata, frame_rate: Option<f64>, max_frames: u32) -> u64 {
    match frame_rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => {
            let ratio = metadata.fps / rate;
            if ratio.is_finite() && ratio >= 1.0 {
                // Half-way ratios round to the even stride: 2.5 -> 2, 7.5 -> 8.
                ratio.round_ties_even() as u64
            } else {
                1
            }
        }
        _ => {
            let max_frames = u64::from(max_frames.max(1));
            (metadata.frame_count / max_frames).max(1)
        }
    }
}

/// Sample frames from an open decoder. Takes ownership so the decoder is
/// always closed before returning.
pub fn sample_frames<D: VideoDecoder>(
    decoder: D,
    params: &VideoSamplingParams,
) -> MediaResult<Vec<SampledFrame>> {
    let mut decoder = scopeguard::guard(decoder, |mut d| d.close());

    let metadata = decoder.metadata();
    let stride = compute_stride(&metadata, params.frame_rate, params.max_frames);
    let limit = params.max_frames as usize;

    let mut frames = Vec::with_capacity(limit);
    let mut position: u64 = 0;

    while frames.len() < limit {
        let Some(decoded) = decoder.read_next()? else {
            break;
        };

        if position % stride == 0 {
            let image = decoded.into_rgb_image()?;
            frames.push(SampledFrame::new(frames.len(), position, image));
        }

        position += 1;
    }

    debug!(
        fps = metadata.fps,
        frame_count = metadata.frame_count,
        stride,
        decoded = position,
        sampled = frames.len(),
        "Frame sampling finished"
    );

    Ok(frames)
}

/// Open a video file with FFmpeg and sample it.
///
/// Blocking; run on a blocking thread.
pub fn extract_frames(
    video_path: impl AsRef<Path>,
    params: &VideoSamplingParams,
) -> MediaResult<Vec<SampledFrame>> {
    let decoder = FfmpegDecoder::open(video_path)?;
    sample_frames(decoder, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{ChannelOrder, DecodedFrame};
    use crate::error::MediaError;
    use std::cell::Cell;
    use std::rc::Rc;

    /// In-memory decoder: frame `n` is a 1x1 pixel whose red channel is `n`.
    struct FakeDecoder {
        metadata: VideoMetadata,
        total: u64,
        next: u64,
        fail_at: Option<u64>,
        order: ChannelOrder,
        closed: Rc<Cell<u32>>,
    }

    impl FakeDecoder {
        fn new(fps: f64, reported: u64, total: u64) -> (Self, Rc<Cell<u32>>) {
            let closed = Rc::new(Cell::new(0));
            let decoder = Self {
                metadata: VideoMetadata {
                    fps,
                    frame_count: reported,
                },
                total,
                next: 0,
                fail_at: None,
                order: ChannelOrder::Rgb,
                closed: Rc::clone(&closed),
            };
            (decoder, closed)
        }
    }

    impl VideoDecoder for FakeDecoder {
        fn metadata(&self) -> VideoMetadata {
            self.metadata
        }

        fn read_next(&mut self) -> MediaResult<Option<DecodedFrame>> {
            if Some(self.next) == self.fail_at {
                return Err(MediaError::decode("corrupt packet"));
            }
            if self.next >= self.total {
                return Ok(None);
            }
            let value = (self.next % 256) as u8;
            self.next += 1;
            let data = match self.order {
                ChannelOrder::Rgb => vec![value, 0, 255],
                ChannelOrder::Bgr => vec![255, 0, value],
            };
            Ok(Some(DecodedFrame {
                width: 1,
                height: 1,
                order: self.order,
                data,
            }))
        }

        fn close(&mut self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    fn source_frames(frames: &[SampledFrame]) -> Vec<u64> {
        frames.iter().map(|f| f.source_frame).collect()
    }

    #[test]
    fn test_adaptive_stride() {
        let meta = VideoMetadata { fps: 30.0, frame_count: 300 };
        assert_eq!(compute_stride(&meta, None, 30), 10);
        assert_eq!(compute_stride(&meta, None, 100), 3);
        assert_eq!(compute_stride(&meta, None, 1000), 1);
    }

    #[test]
    fn test_adaptive_stride_with_unknown_frame_count() {
        let meta = VideoMetadata { fps: 30.0, frame_count: 0 };
        assert_eq!(compute_stride(&meta, None, 30), 1);
    }

    #[test]
    fn test_fixed_rate_stride_rounds() {
        let meta = VideoMetadata { fps: 30.0, frame_count: 300 };
        assert_eq!(compute_stride(&meta, Some(1.0), 30), 30);
        assert_eq!(compute_stride(&meta, Some(4.0), 30), 8); // 7.5
        assert_eq!(compute_stride(&meta, Some(60.0), 30), 1);

        let ntsc = VideoMetadata { fps: 29.97, frame_count: 0 };
        assert_eq!(compute_stride(&ntsc, Some(10.0), 30), 3);
    }

    #[test]
    fn test_fixed_rate_stride_ties_go_to_even() {
        let pal = VideoMetadata { fps: 25.0, frame_count: 250 };
        assert_eq!(compute_stride(&pal, Some(10.0), 30), 2);
        assert_eq!(compute_stride(&pal, Some(2.0), 30), 12);
    }

    #[test]
    fn test_fixed_rate_stride_with_unknown_fps() {
        let meta = VideoMetadata { fps: 0.0, frame_count: 300 };
        assert_eq!(compute_stride(&meta, Some(5.0), 30), 1);
    }

    #[test]
    fn test_samples_every_stride_frame() {
        let (decoder, closed) = FakeDecoder::new(30.0, 100, 100);
        let frames = sample_frames(decoder, &VideoSamplingParams::new(None, 10)).unwrap();

        assert_eq!(source_frames(&frames), vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_never_exceeds_max_frames() {
        // Container under-reports the length: stride 1, but far more frames decode.
        let (decoder, closed) = FakeDecoder::new(30.0, 5, 500);
        let frames = sample_frames(decoder, &VideoSamplingParams::new(None, 5)).unwrap();
        assert_eq!(frames.len(), 5);
        assert_eq!(source_frames(&frames), vec![0, 1, 2, 3, 4]);
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_short_stream_returns_fewer_frames() {
        // Container over-reports the length.
        let (decoder, _) = FakeDecoder::new(30.0, 1000, 25);
        let frames = sample_frames(decoder, &VideoSamplingParams::new(None, 10)).unwrap();
        assert_eq!(source_frames(&frames), vec![0]);
    }

    #[test]
    fn test_empty_stream_is_not_an_error() {
        let (decoder, closed) = FakeDecoder::new(30.0, 0, 0);
        let frames = sample_frames(decoder, &VideoSamplingParams::default()).unwrap();
        assert!(frames.is_empty());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_fixed_rate_sampling() {
        let (decoder, _) = FakeDecoder::new(30.0, 300, 300);
        let frames = sample_frames(decoder, &VideoSamplingParams::new(Some(2.0), 100)).unwrap();
        assert_eq!(frames.len(), 20);
        assert_eq!(frames[1].source_frame, 15);
        assert_eq!(frames[19].source_frame, 285);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let params = VideoSamplingParams::new(None, 7);
        let (first, _) = FakeDecoder::new(24.0, 173, 173);
        let (second, _) = FakeDecoder::new(24.0, 173, 173);
        let a = sample_frames(first, &params).unwrap();
        let b = sample_frames(second, &params).unwrap();
        assert_eq!(source_frames(&a), source_frames(&b));
        assert_eq!(a.len(), 7);
    }

    #[test]
    fn test_decoder_closed_on_mid_stream_failure() {
        let (mut decoder, closed) = FakeDecoder::new(30.0, 100, 100);
        decoder.fail_at = Some(13);
        let result = sample_frames(decoder, &VideoSamplingParams::new(None, 10));
        assert!(matches!(result, Err(MediaError::Decode(_))));
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_bgr_decoder_output_becomes_rgb() {
        let (mut decoder, _) = FakeDecoder::new(30.0, 3, 3);
        decoder.order = ChannelOrder::Bgr;
        let frames = sample_frames(decoder, &VideoSamplingParams::new(None, 3)).unwrap();
        assert_eq!(frames[2].image.get_pixel(0, 0).0, [2, 0, 255]);
    }
}
