//! Still-image decoding and JPEG evidence encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::{MediaError, MediaResult};

/// JPEG quality used for evidence thumbnails
const EVIDENCE_JPEG_QUALITY: u8 = 90;

/// Decode an uploaded image of any supported format into RGB.
///
/// Alpha is dropped and grayscale is expanded to three channels.
pub fn decode_image(bytes: &[u8]) -> MediaResult<RgbImage> {
    if bytes.is_empty() {
        return Err(MediaError::invalid_image("empty file"));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| MediaError::invalid_image(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Encode an RGB image as JPEG and return it base64-encoded.
pub fn encode_jpeg_base64(image: &RgbImage) -> MediaResult<String> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, EVIDENCE_JPEG_QUALITY);
    encoder.encode_image(image)?;
    Ok(STANDARD.encode(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png_drops_alpha() {
        let source = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 0]));
        let decoded = decode_image(&png_bytes(&source)).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_image(b"definitely not an image");
        assert!(matches!(result, Err(MediaError::InvalidImage(_))));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(decode_image(&[]), Err(MediaError::InvalidImage(_))));
    }

    #[test]
    fn test_jpeg_base64_decodes_back() {
        let image = RgbImage::from_pixel(16, 8, Rgb([200, 100, 50]));
        let encoded = encode_jpeg_base64(&image).unwrap();

        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let roundtrip = image::load_from_memory(&bytes).unwrap();
        assert_eq!((roundtrip.width(), roundtrip.height()), (16, 8));
    }
}
