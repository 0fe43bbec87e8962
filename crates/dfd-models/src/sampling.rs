//! Video sampling parameters.

use serde::{Deserialize, Serialize};

use crate::limits::{DEFAULT_MAX_FRAMES, MAX_FRAME_RATE, MAX_VIDEO_FRAMES};

/// How frames are drawn from an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSamplingParams {
    /// Target sampling rate in fps. `None` spreads `max_frames` over the
    /// whole video.
    #[serde(default)]
    pub frame_rate: Option<f64>,
    /// Upper bound on sampled frames
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
}

fn default_max_frames() -> u32 {
    DEFAULT_MAX_FRAMES
}

impl Default for VideoSamplingParams {
    fn default() -> Self {
        Self {
            frame_rate: None,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl VideoSamplingParams {
    pub fn new(frame_rate: Option<f64>, max_frames: u32) -> Self {
        Self {
            frame_rate,
            max_frames,
        }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_frames == 0 || self.max_frames > MAX_VIDEO_FRAMES {
            return Err(format!("max_frames must be between 1 and {}", MAX_VIDEO_FRAMES));
        }

        if let Some(rate) = self.frame_rate {
            // NaN fails both comparisons, so check it explicitly.
            if !rate.is_finite() || rate <= 0.0 || rate > MAX_FRAME_RATE {
                return Err(format!("frame_rate must be between 0 and {} fps", MAX_FRAME_RATE));
            }
        }

        Ok(())
    }
}
