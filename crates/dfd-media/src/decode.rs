//! Sequential video decoding.
//!
//! [`VideoDecoder`] is the seam between the sampler and whatever produces
//! frames. [`FfmpegDecoder`] streams packed pixels from an `ffmpeg` child
//! process over a pipe, one frame at a time, so memory stays bounded by a
//! single frame regardless of video length.

use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Byte order of the three colour channels in a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// One packed 8-bit, 3-channel frame as produced by a decoder.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
    pub data: Vec<u8>,
}

impl DecodedFrame {
    /// Convert to an RGB image, swapping channels when the decoder emits BGR.
    pub fn into_rgb_image(self) -> MediaResult<RgbImage> {
        let DecodedFrame {
            width,
            height,
            order,
            mut data,
        } = self;

        if order == ChannelOrder::Bgr {
            for pixel in data.chunks_exact_mut(3) {
                pixel.swap(0, 2);
            }
        }

        RgbImage::from_raw(width, height, data).ok_or_else(|| {
            MediaError::decode(format!("Frame buffer does not match {}x{}x3", width, height))
        })
    }
}

/// Stream-level metadata reported when the video is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    /// Frames per second; 0 when unknown
    pub fps: f64,
    /// Frame count from the container; may be 0 or inaccurate
    pub frame_count: u64,
}

/// An open video stream read front to back.
pub trait VideoDecoder {
    fn metadata(&self) -> VideoMetadata;

    /// Next frame, or `None` once the stream is exhausted.
    fn read_next(&mut self) -> MediaResult<Option<DecodedFrame>>;

    /// Release the underlying handle. Must be idempotent.
    fn close(&mut self);
}

/// Decoder backed by an `ffmpeg` process writing raw RGB24 frames to stdout.
pub struct FfmpegDecoder {
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    width: u32,
    height: u32,
    metadata: VideoMetadata,
}

impl FfmpegDecoder {
    /// Open a video file for sequential decoding.
    pub fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let info = probe_video(path)?;
        if info.width == 0 || info.height == 0 {
            return Err(MediaError::video_open(format!(
                "{}: video stream has no dimensions",
                path.display()
            )));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-noautorotate", "-i"])
            .arg(path)
            .args([
                "-map", "0:v:0",
                "-vsync", "0",
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MediaError::video_open(format!("Failed to spawn FFmpeg: {}", e)))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MediaError::internal("Failed to capture FFmpeg stdout"));
            }
        };

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frame_count = info.frame_count,
            "Opened video for decoding"
        );

        Ok(Self {
            child: Some(child),
            stdout: Some(BufReader::new(stdout)),
            width: info.width,
            height: info.height,
            metadata: VideoMetadata {
                fps: info.fps,
                frame_count: info.frame_count,
            },
        })
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn read_next(&mut self) -> MediaResult<Option<DecodedFrame>> {
        let frame_len = self.frame_len();
        let Some(reader) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut data = vec![0u8; frame_len];
        let filled = fill_buffer(reader, &mut data)
            .map_err(|e| MediaError::decode(format!("Failed to read FFmpeg output: {}", e)))?;

        if filled < frame_len {
            if filled > 0 {
                warn!(filled, expected = frame_len, "Discarding truncated trailing frame");
            }
            self.stdout = None;
            return Ok(None);
        }

        Ok(Some(DecodedFrame {
            width: self.width,
            height: self.height,
            order: ChannelOrder::Rgb,
            data,
        }))
    }

    fn close(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            // ffmpeg is usually still running when we stop early.
            match child.try_wait() {
                Ok(Some(status)) if !status.success() => {
                    debug!(code = ?status.code(), "FFmpeg exited with failure");
                }
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes read.
fn fill_buffer(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgr_frames_are_swapped_to_rgb() {
        let frame = DecodedFrame {
            width: 2,
            height: 1,
            order: ChannelOrder::Bgr,
            data: vec![1, 2, 3, 4, 5, 6],
        };
        let image = frame.into_rgb_image().unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [3, 2, 1]);
        assert_eq!(image.get_pixel(1, 0).0, [6, 5, 4]);
    }

    #[test]
    fn test_rgb_frames_are_untouched() {
        let frame = DecodedFrame {
            width: 1,
            height: 1,
            order: ChannelOrder::Rgb,
            data: vec![10, 20, 30],
        };
        assert_eq!(frame.into_rgb_image().unwrap().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let frame = DecodedFrame {
            width: 4,
            height: 4,
            order: ChannelOrder::Rgb,
            data: vec![0; 5],
        };
        assert!(matches!(frame.into_rgb_image(), Err(MediaError::Decode(_))));
    }

    #[test]
    fn test_fill_buffer_reports_short_reads() {
        let mut reader: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 6];
        assert_eq!(fill_buffer(&mut reader, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_open_missing_file_fails() {
        // Fails on the missing binary or the missing file, both before spawning.
        assert!(FfmpegDecoder::open("/definitely/not/here.mp4").is_err());
    }
}
