//! Profile images on disk.

use std::{
    io,
    path::{Path, PathBuf},
};

use image::ImageFormat;
use uuid::Uuid;

use crate::log_warn;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Identify the image format from the file's magic bytes.
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    pub fn file_name_for(user_id: i64, format: ImageFormat) -> String {
        let extension = format.extensions_str().first().copied().unwrap_or("img");
        format!("user_{user_id}_{}.{extension}", Uuid::new_v4())
    }

    /// Write `bytes` under a fresh name and return the stored path.
    pub async fn store(&self, user_id: i64, format: ImageFormat, bytes: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name_for(user_id, format));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Remove a stored image. A file that is already gone is not an error.
    pub async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => log_warn!("Failed to remove image {}: {err}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn recognises_image_bytes_only() {
        assert_eq!(MediaStore::detect_format(PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(MediaStore::detect_format(b"\xff\xd8\xff\xe0"), Some(ImageFormat::Jpeg));
        assert_eq!(MediaStore::detect_format(b"plain text"), None);
    }

    #[test]
    fn names_carry_user_and_extension() {
        let name = MediaStore::file_name_for(42, ImageFormat::Png);
        assert!(name.starts_with("user_42_"));
        assert!(name.ends_with(".png"));
        assert_ne!(name, MediaStore::file_name_for(42, ImageFormat::Png));
    }

    #[tokio::test]
    async fn store_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path().join("media"));

        let path = media.store(7, ImageFormat::Png, PNG_MAGIC).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC);

        media.remove(&path).await;
        assert!(!path.exists());
        media.remove(&path).await;
    }
}
