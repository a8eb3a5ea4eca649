use crate::error::UploadError;

pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff"];
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// True if `filename` ends in one of the accepted image extensions (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        })
        .unwrap_or(false)
}

/// Gatekeeping applied to an upload before any byte of it is decoded.
#[derive(Clone, Copy, Debug)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        UploadPolicy {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn validate(&self, filename: &str, size: usize) -> Result<(), UploadError> {
        if filename.trim().is_empty() {
            return Err(UploadError::NoFileSelected);
        }
        if !allowed_file(filename) {
            return Err(UploadError::UnsupportedExtension {
                filename: filename.to_string(),
            });
        }
        if size > self.max_bytes {
            return Err(UploadError::PayloadTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}
