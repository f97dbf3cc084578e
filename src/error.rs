//! Error types for directory backends and image placement.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`Directory`](crate::ports::Directory) backend.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A local directory could not be read.
    #[error("Failed to read directory {location}: {source}")]
    Io {
        /// The directory that was listed.
        location: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An object store bucket could not be listed.
    #[error("Failed to list bucket {bucket}: {reason}")]
    List {
        /// The bucket that was listed.
        bucket: String,
        /// What went wrong.
        reason: String,
    },

    /// The selected object could not be fetched from the object store.
    #[error("Failed to download {key} from bucket {bucket}: {reason}")]
    Download {
        /// The bucket holding the object.
        bucket: String,
        /// The object key.
        key: String,
        /// What went wrong.
        reason: String,
    },

    /// A downloaded object could not be written to the staging directory.
    #[error("Failed to stage object at {}: {source}", .path.display())]
    Staging {
        /// The staging path that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A replayed interaction recorded an error.
    #[error("Replayed error: {0}")]
    Replay(String),
}

/// Coarse classification of a [`PlaceError`], enough for an HTTP layer to
/// choose a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself was malformed.
    InvalidRequest,
    /// The storage backend could not be reached or listed.
    BackendUnavailable,
    /// The backend was reachable but held no source images.
    EmptySource,
    /// The selected source could not be read or decoded.
    Decode,
    /// The selected source has no resized name; nothing was written.
    Unsupported,
    /// The resized output could not be written.
    Persist,
    /// The image worker did not complete.
    Internal,
}

/// Errors that can occur while placing an image.
#[derive(Debug, Error)]
pub enum PlaceError {
    /// Width or height was zero or above
    /// [`MAX_DIMENSION`](crate::place::MAX_DIMENSION).
    #[error(
        "Invalid dimensions {width}x{height}: each side must be between 1 and {}",
        crate::place::MAX_DIMENSION
    )]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The directory backend failed to select a source image.
    #[error("Source selection failed: {0}")]
    Selection(#[from] DirectoryError),

    /// The backend listed no source images.
    #[error("No source images available in {location}")]
    EmptySource {
        /// The location that was listed.
        location: String,
    },

    /// The selected source could not be opened or decoded.
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        /// Path of the source image.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// The selected source has no `.jpg` name, so no resized name exists for it.
    #[error("Unsupported source image name: {name}")]
    Unsupported {
        /// The source image name.
        name: String,
    },

    /// The resized image could not be written.
    #[error("Failed to save {}: {source}", .path.display())]
    Persist {
        /// Output path.
        path: PathBuf,
        /// Underlying encode or write error.
        #[source]
        source: image::ImageError,
    },

    /// The blocking task that decodes, resizes and saves panicked or was
    /// cancelled.
    #[error("Image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl PlaceError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDimensions { .. } => ErrorKind::InvalidRequest,
            Self::Selection(_) => ErrorKind::BackendUnavailable,
            Self::EmptySource { .. } => ErrorKind::EmptySource,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Persist { .. } => ErrorKind::Persist,
            Self::Worker(_) => ErrorKind::Internal,
        }
    }
}

/// Errors raised while building a [`Place`](crate::Place) from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuration could not be loaded or was inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// A cassette could not be loaded.
    #[error("Cassette error: {0}")]
    Cassette(String),

    /// A setting required by the selected backend is missing.
    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_for_selection_and_empty() {
        let missing = PlaceError::Selection(DirectoryError::Io {
            location: "./bogus".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let empty = PlaceError::EmptySource { location: "./empty".into() };
        assert_eq!(missing.kind(), ErrorKind::BackendUnavailable);
        assert_eq!(empty.kind(), ErrorKind::EmptySource);
    }

    #[test]
    fn invalid_dimensions_is_a_client_error() {
        let err = PlaceError::InvalidDimensions { width: 0, height: 10 };
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("0x10"));
    }

    #[test]
    fn unsupported_has_its_own_kind() {
        let err = PlaceError::Unsupported { name: "original-a.png".into() };
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[tokio::test]
    async fn failed_worker_is_internal() {
        let join_err = tokio::spawn(async { panic!("worker died") }).await.unwrap_err();
        let err = PlaceError::from(join_err);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().starts_with("Image worker failed"));
    }

    #[test]
    fn list_and_download_messages_differ() {
        let list = DirectoryError::List { bucket: "b".into(), reason: "403".into() };
        let download =
            DirectoryError::Download { bucket: "b".into(), key: "k".into(), reason: "500".into() };
        assert!(list.to_string().starts_with("Failed to list bucket"));
        assert!(download.to_string().starts_with("Failed to download k"));
    }
}
