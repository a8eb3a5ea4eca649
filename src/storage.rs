use crate::error::StorageError;
use crate::image_utils::image_io::encode_jpeg;
use chrono::Local;
use image::RgbImage;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULTS_DIR: &str = "results";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
/// Collisions tolerated for one name before a write gives up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Second-resolution local timestamp used in file names and reports.
pub fn request_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Persists uploads and annotated results under timestamped names.
///
/// Files are never overwritten. When a name is taken, typically by another request in the same
/// second, a counter is inserted after the timestamp: `result_<ts>_1.jpg`, `result_<ts>_2.jpg`.
#[derive(Clone, Debug)]
pub struct ResultStore {
    results_dir: PathBuf,
    uploads_dir: PathBuf,
    jpeg_quality: u8,
}

impl ResultStore {
    pub fn new(results_dir: impl Into<PathBuf>, uploads_dir: impl Into<PathBuf>) -> Self {
        ResultStore {
            results_dir: results_dir.into(),
            uploads_dir: uploads_dir.into(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Encodes the annotated image as JPEG. Shared by the saved file and the inline report copy.
    pub fn encode_result(&self, image: &RgbImage) -> Result<Vec<u8>, StorageError> {
        Ok(encode_jpeg(image, self.jpeg_quality)?)
    }

    /// Writes `result_<timestamp>.jpg` and returns its path.
    pub fn save_result(&self, jpeg: &[u8], timestamp: &str) -> Result<PathBuf, StorageError> {
        write_new_file(&self.results_dir, jpeg, |attempt| match attempt {
            0 => format!("result_{timestamp}.jpg"),
            n => format!("result_{timestamp}_{n}.jpg"),
        })
    }

    /// Writes `upload_<timestamp>_<filename>`, keeping only the final path component of the
    /// client-supplied name.
    pub fn save_upload(
        &self,
        filename: &str,
        bytes: &[u8],
        timestamp: &str,
    ) -> Result<PathBuf, StorageError> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");
        write_new_file(&self.uploads_dir, bytes, |attempt| match attempt {
            0 => format!("upload_{timestamp}_{name}"),
            n => format!("upload_{timestamp}_{n}_{name}"),
        })
    }
}

/// Creates a file in `dir` under the first free name produced by `name_for(0)`,
/// `name_for(1)`, ... and writes `bytes` to it.
fn write_new_file(
    dir: &Path,
    bytes: &[u8],
    name_for: impl Fn(usize) -> String,
) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut path = dir.join(name_for(0));
    for attempt in 1..=MAX_NAME_ATTEMPTS {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                return match file.write_all(bytes) {
                    Ok(()) => Ok(path),
                    Err(source) => Err(StorageError::Io { path, source }),
                };
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                path = dir.join(name_for(attempt));
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        }
    }
    Err(StorageError::Io {
        path,
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free file name left"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_results_and_uploads_under_timestamped_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results"), dir.path().join("uploads"));

        let jpeg = store.encode_result(&RgbImage::new(8, 8)).unwrap();
        let result = store.save_result(&jpeg, "20240101_120000").unwrap();
        assert_eq!(result, dir.path().join("results/result_20240101_120000.jpg"));
        assert_eq!(fs::read(&result).unwrap(), jpeg);

        let upload = store
            .save_upload("../../etc/site.png", b"png", "20240101_120000")
            .unwrap();
        assert_eq!(upload, dir.path().join("uploads/upload_20240101_120000_site.png"));
    }

    #[test]
    fn same_timestamp_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results"), dir.path().join("uploads"));

        let first = store.save_result(b"first", "20240101_120000").unwrap();
        let second = store.save_result(b"second", "20240101_120000").unwrap();
        let third = store.save_result(b"third", "20240101_120000").unwrap();
        assert_eq!(second, dir.path().join("results/result_20240101_120000_1.jpg"));
        assert_eq!(third, dir.path().join("results/result_20240101_120000_2.jpg"));
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
        assert_eq!(fs::read(&third).unwrap(), b"third");

        store.save_upload("site.png", b"a", "20240101_120000").unwrap();
        let upload = store.save_upload("site.png", b"b", "20240101_120000").unwrap();
        assert_eq!(upload, dir.path().join("uploads/upload_20240101_120000_1_site.png"));
        assert_eq!(fs::read(&upload).unwrap(), b"b");
    }

    #[test]
    fn unwritable_directory_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();
        let store = ResultStore::new(blocker.join("results"), blocker.join("uploads"));
        assert!(matches!(
            store.save_result(b"x", "20240101_120000"),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn timestamp_format() {
        let ts = request_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
    }
}
