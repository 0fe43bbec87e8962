//! Video detection response pieces.

use serde::{Deserialize, Serialize};

use crate::prediction::Verdict;

/// How a video was sampled, echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInfo {
    pub frames_extracted: usize,
    /// Requested rate; `null` when adaptive sampling was used
    pub frame_rate_used: Option<f64>,
    pub max_frames_limit: u32,
}

/// A sampled frame judged fake, with its JPEG image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeFrame {
    /// Position among the sampled frames, not the source frame number
    pub frame_index: usize,
    pub prediction: Verdict,
    pub confidence: f64,
    pub raw_prediction: i64,
    pub image_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_info_adaptive_rate_is_null() {
        let info = ProcessingInfo {
            frames_extracted: 12,
            frame_rate_used: None,
            max_frames_limit: 30,
        };
        let json = serde_json::to_value(info).unwrap();
        assert!(json["frame_rate_used"].is_null());
        assert_eq!(json["frames_extracted"], 12);
    }

    #[test]
    fn test_fake_frame_serialization() {
        let frame = FakeFrame {
            frame_index: 3,
            prediction: Verdict::Fake,
            confidence: 1.0,
            raw_prediction: 1,
            image_base64: "AAAA".to_string(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["frame_index"], 3);
        assert_eq!(json["prediction"], "Fake");
        assert_eq!(json["image_base64"], "AAAA");
    }
}
