//! Extractor input preparation.
//!
//! Each image is center-cropped to 224x224, scaled to [0, 1] and normalized
//! per channel with the ImageNet statistics. Output is channel-first
//! (`[3, 224, 224]` per image, `[N, 3, 224, 224]` per batch), which is what
//! the ViT feature extractor consumes.
//!
//! Images smaller than the crop on either side are zero-padded (black)
//! symmetrically before cropping, the same way torchvision's `CenterCrop`
//! behaves. Crop offsets are `round((dim - 224) / 2)` with ties to even.

use image::RgbImage;
use ndarray::{Array3, Array4};
use rayon::prelude::*;

use crate::error::{MediaError, MediaResult};

/// Side length of the square crop fed to the extractor
pub const CROP_SIZE: usize = 224;
/// Per-channel mean (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// A stacked batch together with the index of the item each row came from.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    /// `indices[i]` is the caller's index for row `i` of `tensor`
    pub indices: Vec<usize>,
    pub tensor: Array4<f32>,
}

impl NormalizedBatch {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One axis of the crop: where to start reading in the source, where to
/// start writing in the output, and how many pixels to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CropWindow {
    src_start: usize,
    dst_start: usize,
    len: usize,
}

fn crop_window(dim: usize) -> CropWindow {
    if dim >= CROP_SIZE {
        let excess = dim - CROP_SIZE;
        let half = excess / 2;
        // Ties to even: 0.5 -> 0, 1.5 -> 2, 2.5 -> 2.
        let src_start = if excess % 2 == 1 && half % 2 == 1 { half + 1 } else { half };
        CropWindow {
            src_start,
            dst_start: 0,
            len: CROP_SIZE,
        }
    } else {
        CropWindow {
            src_start: 0,
            dst_start: (CROP_SIZE - dim) / 2,
            len: dim,
        }
    }
}

/// Normalize one RGB image into a `[3, 224, 224]` tensor.
pub fn normalize(image: &RgbImage) -> Array3<f32> {
    let cols = crop_window(image.width() as usize);
    let rows = crop_window(image.height() as usize);

    // Padding is black before normalization.
    let mut out = Array3::<f32>::zeros((3, CROP_SIZE, CROP_SIZE));
    for c in 0..3 {
        let pad = (0.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        out.index_axis_mut(ndarray::Axis(0), c).fill(pad);
    }

    for y in 0..rows.len {
        let src_y = (rows.src_start + y) as u32;
        let dst_y = rows.dst_start + y;
        for x in 0..cols.len {
            let src_x = (cols.src_start + x) as u32;
            let dst_x = cols.dst_start + x;
            let pixel = image.get_pixel(src_x, src_y);
            for c in 0..3 {
                let value = f32::from(pixel[c]) / 255.0;
                out[[c, dst_y, dst_x]] = (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            }
        }
    }

    out
}

/// Normalize and stack `(index, image)` pairs. Row `i` of the output is the
/// `i`-th input; images are processed in parallel but never reordered.
pub fn normalize_batch(images: &[(usize, &RgbImage)]) -> MediaResult<NormalizedBatch> {
    let tensors: Vec<Array3<f32>> = images.par_iter().map(|(_, image)| normalize(image)).collect();

    let per_image = 3 * CROP_SIZE * CROP_SIZE;
    let mut data = Vec::with_capacity(tensors.len() * per_image);
    for tensor in tensors {
        data.extend(tensor.into_raw_vec());
    }

    let tensor = Array4::from_shape_vec((images.len(), 3, CROP_SIZE, CROP_SIZE), data)
        .map_err(|e| MediaError::internal(format!("Batch shape mismatch: {}", e)))?;

    Ok(NormalizedBatch {
        indices: images.iter().map(|(index, _)| *index).collect(),
        tensor,
    })
}
