//! Upload and sampling limits.

/// Hard cap on frames sampled from one video
pub const MAX_VIDEO_FRAMES: u32 = 100;
/// Frames sampled when the caller does not say
pub const DEFAULT_MAX_FRAMES: u32 = 30;
/// Highest accepted sampling rate (fps)
pub const MAX_FRAME_RATE: f64 = 60.0;

/// Maximum size of a single uploaded file
pub const MAX_FILE_SIZE_MB: usize = 100;
/// Maximum number of files in one batch request
pub const MAX_BATCH_FILES: usize = 20;

/// Image content types known to decode.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

/// Video content types known to decode.
pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/wmv",
    "video/flv",
    "video/webm",
];

/// File size limit in bytes.
pub fn file_size_limit_bytes() -> usize {
    MAX_FILE_SIZE_MB * 1024 * 1024
}

/// Uploads are accepted by MIME category (`image/*`); the table above lists
/// the types the decoder is known to handle.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

pub fn is_video_content_type(content_type: &str) -> bool {
    content_type.starts_with("video/")
}

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

pub fn is_allowed_video_type(content_type: &str) -> bool {
    ALLOWED_VIDEO_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_categories() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("image/heic"));
        assert!(!is_image_content_type("video/mp4"));
        assert!(is_video_content_type("video/quicktime"));
        assert!(!is_video_content_type("application/octet-stream"));
    }

    #[test]
    fn test_allowed_tables() {
        assert!(is_allowed_image_type("image/webp"));
        assert!(!is_allowed_image_type("image/heic"));
        assert!(is_allowed_video_type("video/webm"));
    }

    #[test]
    fn test_file_size_limit() {
        assert_eq!(file_size_limit_bytes(), 100 * 1024 * 1024);
    }
}
