//! Local filesystem directory backend.

use tracing::{debug, warn};

use crate::error::DirectoryError;
use crate::picker::Picker;
use crate::ports::directory::{is_original, Directory, Image, ListFuture, RandomImageFuture};

/// Lists source images in a directory on the local filesystem.
///
/// Every call re-reads the directory.
#[derive(Debug, Default)]
pub struct LocalDirectory {
    picker: Picker,
}

impl LocalDirectory {
    /// Create a backend that selects with the process RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that selects with the given picker.
    #[must_use]
    pub fn with_picker(picker: Picker) -> Self {
        Self { picker }
    }
}

impl Directory for LocalDirectory {
    fn list<'a>(&'a self, location: &'a str) -> ListFuture<'a> {
        Box::pin(async move {
            let io_err = |source: std::io::Error| DirectoryError::Io {
                location: location.to_string(),
                source,
            };

            let mut entries = tokio::fs::read_dir(location).await.map_err(io_err)?;
            let mut images = Vec::new();
            while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
                let Ok(name) = entry.file_name().into_string() else {
                    warn!(location, "Skipping entry with non UTF-8 name");
                    continue;
                };
                if is_original(&name) {
                    images.push(Image::new(name));
                }
            }
            Ok(images)
        })
    }

    fn random_image<'a>(&'a self, location: &'a str) -> RandomImageFuture<'a> {
        Box::pin(async move {
            let images = self.list(location).await?;
            match self.picker.pick(&images) {
                Some(image) => {
                    debug!(location, name = %image.name, count = images.len(), "Selected image");
                    Ok(image.clone())
                }
                None => {
                    debug!(location, "No source images found");
                    Ok(Image::empty())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn list_filters_on_marker() {
        let dir = fixture(&["original-test-image.jpg", "test-image-500x300.jpg", "notes.txt"]);
        let location = dir.path().to_str().unwrap();

        let images = LocalDirectory::new().list(location).await.unwrap();
        assert_eq!(images, vec![Image::new("original-test-image.jpg")]);
    }

    #[tokio::test]
    async fn list_missing_directory_errors() {
        let err = LocalDirectory::new().list("./bogus").await.unwrap_err();
        match err {
            DirectoryError::Io { location, source } => {
                assert_eq!(location, "./bogus");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn random_image_returns_only_image() {
        let dir = fixture(&["original-test-image.jpg"]);
        let location = dir.path().to_str().unwrap();

        let image = LocalDirectory::new().random_image(location).await.unwrap();
        assert_eq!(image.name, "original-test-image.jpg");
    }

    #[tokio::test]
    async fn random_image_is_member_of_listing() {
        let dir = fixture(&["original-a.jpg", "original-b.jpg", "original-c.jpg", "b-10x10.jpg"]);
        let location = dir.path().to_str().unwrap();
        let backend = LocalDirectory::with_picker(Picker::seeded(3));

        let listing = backend.list(location).await.unwrap();
        for _ in 0..20 {
            let image = backend.random_image(location).await.unwrap();
            assert!(listing.contains(&image), "{} not in listing", image.name);
        }
    }

    #[tokio::test]
    async fn random_image_empty_directory_is_not_an_error() {
        let dir = fixture(&["resized-10x10.jpg"]);
        let location = dir.path().to_str().unwrap();

        let image = LocalDirectory::new().random_image(location).await.unwrap();
        assert!(image.is_empty());
    }

    #[tokio::test]
    async fn random_image_propagates_list_error() {
        let backend = LocalDirectory::new();
        let list_err = backend.list("./bogus").await.unwrap_err();
        let pick_err = backend.random_image("./bogus").await.unwrap_err();
        assert_eq!(list_err.to_string(), pick_err.to_string());
    }

    #[test]
    fn locate_joins_location() {
        let path = LocalDirectory::new().locate("static/images", &Image::new("original-a.jpg"));
        assert_eq!(path, std::path::PathBuf::from("static/images/original-a.jpg"));
    }
}
