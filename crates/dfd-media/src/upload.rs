//! Temporary on-disk copies of uploaded videos.
//!
//! FFmpeg reads from a path, so video uploads are spooled to a temp file
//! that is removed when the [`TempUpload`] is dropped, whatever the outcome
//! of the detection.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::MediaResult;

/// An uploaded payload written to a uniquely named temp file.
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
    size: usize,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl AsRef<Path> for TempUpload {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Write `bytes` to a fresh temp file. `suffix` keeps the original extension
/// (e.g. `.mp4`) so FFmpeg can use it as a demuxer hint.
pub fn persist_upload(bytes: &[u8], suffix: &str) -> MediaResult<TempUpload> {
    let mut file = tempfile::Builder::new()
        .prefix("dfd-upload-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;

    debug!(path = %file.path().display(), size = bytes.len(), "Spooled upload to disk");

    Ok(TempUpload {
        file,
        size: bytes.len(),
    })
}

/// File extension (with leading dot) of an uploaded filename, if any.
pub fn upload_suffix(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_and_cleanup() {
        let upload = persist_upload(b"fake video bytes", ".mp4").unwrap();
        let path = upload.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake video bytes");
        assert_eq!(upload.size(), 16);

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn test_uploads_get_distinct_paths() {
        let a = persist_upload(b"a", "").unwrap();
        let b = persist_upload(b"b", "").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_upload_suffix() {
        assert_eq!(upload_suffix(Some("clip.MP4")), ".mp4");
        assert_eq!(upload_suffix(Some("archive.tar.gz")), ".gz");
        assert_eq!(upload_suffix(Some("noext")), "");
        assert_eq!(upload_suffix(Some("../../etc/pa$$.w/d")), "");
        assert_eq!(upload_suffix(None), "");
    }
}
