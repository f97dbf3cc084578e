//! Directory port for listing and selecting source images.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

/// Marker substring that distinguishes source images from resized derivatives
/// stored alongside them.
pub const ORIGINAL_MARKER: &str = "original";

/// A candidate source image, identified by name within a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// File name or object key.
    pub name: String,
}

impl Image {
    /// Create an image reference with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The "no image" sentinel returned when a listing is empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the empty sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Whether a listing entry is a source image.
#[must_use]
pub fn is_original(name: &str) -> bool {
    name.contains(ORIGINAL_MARKER)
}

/// Boxed future type returned by [`Directory::list`].
pub type ListFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Image>, DirectoryError>> + Send + 'a>>;

/// Boxed future type returned by [`Directory::random_image`].
pub type RandomImageFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Image, DirectoryError>> + Send + 'a>>;

/// Lists source images at a location and picks one at random.
///
/// Implementations must only return images whose names contain
/// [`ORIGINAL_MARKER`]. Listings carry no ordering.
pub trait Directory: Send + Sync {
    /// List the source images at `location`.
    fn list<'a>(&'a self, location: &'a str) -> ListFuture<'a>;

    /// Pick one source image at `location` uniformly at random.
    ///
    /// An empty listing yields [`Image::empty`] rather than an error.
    fn random_image<'a>(&'a self, location: &'a str) -> RandomImageFuture<'a>;

    /// Local path from which a selected image can be opened.
    fn locate(&self, location: &str, image: &Image) -> PathBuf {
        Path::new(location).join(&image.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_filter() {
        assert!(is_original("original-test-image.jpg"));
        assert!(is_original("an-original.png"));
        assert!(!is_original("test-image-500x300.jpg"));
    }

    #[test]
    fn empty_sentinel() {
        assert!(Image::empty().is_empty());
        assert!(!Image::new("original.jpg").is_empty());
    }

    #[test]
    fn image_serialization() {
        let json = serde_json::to_string(&Image::new("original-a.jpg")).unwrap();
        assert_eq!(json, r#"{"name":"original-a.jpg"}"#);
    }
}
