//! Sampled video frames.

use image::RgbImage;

/// A frame selected by the sampler.
///
/// `index` is the position among sampled frames and is the key every later
/// stage uses to refer back to this frame. `source_frame` is the decoder
/// frame number it was taken from.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub index: usize,
    pub source_frame: u64,
    pub image: RgbImage,
}

impl SampledFrame {
    pub fn new(index: usize, source_frame: u64, image: RgbImage) -> Self {
        Self {
            index,
            source_frame,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
