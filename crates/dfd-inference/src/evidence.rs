//! Fake-frame evidence selection.

use dfd_media::{encode_jpeg_base64, MediaResult, SampledFrame};
use dfd_models::{CanonicalPrediction, FakeFrame, Verdict};
use image::RgbImage;

/// A sampled frame judged fake, borrowing its image from the frame list.
#[derive(Debug, Clone, Copy)]
pub struct FakeFrameEvidence<'a> {
    pub frame_index: usize,
    pub prediction: Verdict,
    pub confidence: f64,
    pub raw_prediction: i64,
    pub image: &'a RgbImage,
}

impl FakeFrameEvidence<'_> {
    /// JPEG-encode the frame for the response.
    pub fn encode(&self) -> MediaResult<FakeFrame> {
        Ok(FakeFrame {
            frame_index: self.frame_index,
            prediction: self.prediction,
            confidence: self.confidence,
            raw_prediction: self.raw_prediction,
            image_base64: encode_jpeg_base64(self.image)?,
        })
    }
}

/// Keep the frames whose prediction is fake, in their original order.
///
/// `frames` and `predictions` must line up one-to-one; anything else is a
/// bug in the caller and panics.
pub fn select_evidence<'a>(
    frames: &'a [SampledFrame],
    predictions: &[CanonicalPrediction],
) -> Vec<FakeFrameEvidence<'a>> {
    assert_eq!(
        frames.len(),
        predictions.len(),
        "frames and predictions must have equal length"
    );

    frames
        .iter()
        .zip(predictions)
        .enumerate()
        .filter(|(_, (_, prediction))| prediction.is_fake)
        .map(|(position, (frame, prediction))| {
            debug_assert_eq!(frame.index, position, "sampled frames out of order");
            FakeFrameEvidence {
                frame_index: frame.index,
                prediction: prediction.label,
                confidence: prediction.confidence,
                raw_prediction: prediction.raw_prediction,
                image: &frame.image,
            }
        })
        .collect()
}

/// Encode every selected frame; fails on the first frame that cannot be encoded.
pub fn encode_evidence(evidence: &[FakeFrameEvidence<'_>]) -> MediaResult<Vec<FakeFrame>> {
    evidence.iter().map(FakeFrameEvidence::encode).collect()
}
