//! Source selection, resizing, and deterministic output naming.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use tracing::info;

use crate::error::PlaceError;
use crate::ports::Directory;

/// Extension marker the naming rule splits on.
const JPG: &str = ".jpg";

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 4096;

/// A resized image and where it was written.
#[derive(Debug)]
pub struct Placement {
    /// The resized image.
    pub image: DynamicImage,
    /// Output file path.
    pub path: PathBuf,
}

/// Places randomly selected source images at requested dimensions.
///
/// Immutable after construction; share it across requests behind an `Arc`.
pub struct Place {
    dir: Box<dyn Directory>,
    original_path: String,
    resized_path: PathBuf,
}

impl Place {
    /// Create a placer that selects from `original_path` through `dir` and
    /// writes derivatives under `resized_path`.
    pub fn new(
        dir: Box<dyn Directory>,
        original_path: impl Into<String>,
        resized_path: impl Into<PathBuf>,
    ) -> Self {
        Self { dir, original_path: original_path.into(), resized_path: resized_path.into() }
    }

    /// Location source images are listed from.
    #[must_use]
    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    /// Directory derivatives are written to.
    #[must_use]
    pub fn resized_path(&self) -> &Path {
        &self.resized_path
    }

    /// Select a random source image, resize it to exactly `width` x `height`,
    /// and save it under the resized path.
    ///
    /// # Errors
    ///
    /// Each failing step has its own [`PlaceError`] variant. Dimensions must
    /// lie in `1..=MAX_DIMENSION`. Decoding, resizing and writing run on the
    /// blocking pool; a worker that dies surfaces as [`PlaceError::Worker`].
    pub async fn get_image(&self, width: u32, height: u32) -> Result<Placement, PlaceError> {
        check_dimensions(width, height)?;

        let source = self.dir.random_image(&self.original_path).await?;
        if source.is_empty() {
            return Err(PlaceError::EmptySource { location: self.original_path.clone() });
        }
        let Some(path) = resized_name(&self.resized_path, &source.name, width, height) else {
            return Err(PlaceError::Unsupported { name: source.name });
        };

        let source_path = self.dir.locate(&self.original_path, &source);
        let output = path.clone();
        let image = tokio::task::spawn_blocking(move || {
            let resized = open(&source_path)?.resize_exact(width, height, FilterType::Lanczos3);
            save(&resized, &output)?;
            Ok::<_, PlaceError>(resized)
        })
        .await??;

        info!(source = %source.name, width, height, path = %path.display(), "Placed image");
        Ok(Placement { image, path })
    }
}

/// Reject sizes outside `1..=MAX_DIMENSION` on either side.
fn check_dimensions(width: u32, height: u32) -> Result<(), PlaceError> {
    let valid = 1..=MAX_DIMENSION;
    if valid.contains(&width) && valid.contains(&height) {
        Ok(())
    } else {
        Err(PlaceError::InvalidDimensions { width, height })
    }
}

/// Output path for a resized derivative.
///
/// A name containing `.jpg` becomes `{stem}-{width}x{height}{rest}` under
/// `resized_path`, where `stem` is everything before the first `.jpg`.
/// Returns `None` for any other name.
#[must_use]
pub fn resized_name(resized_path: &Path, name: &str, width: u32, height: u32) -> Option<PathBuf> {
    let idx = name.find(JPG)?;
    let (stem, rest) = name.split_at(idx);
    Some(resized_path.join(format!("{stem}-{width}x{height}{rest}")))
}

/// Like [`resized_name`], but hands back the name unchanged when it has no
/// `.jpg`.
#[must_use]
pub fn new_file_name(resized_path: &Path, name: &str, width: u32, height: u32) -> String {
    resized_name(resized_path, name, width, height)
        .map_or_else(|| name.to_string(), |p| p.to_string_lossy().into_owned())
}

fn open(path: &Path) -> Result<DynamicImage, PlaceError> {
    let decode_err =
        |source: image::ImageError| PlaceError::Decode { path: path.to_path_buf(), source };
    ImageReader::open(path)
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)
}

fn save(resized: &DynamicImage, path: &Path) -> Result<(), PlaceError> {
    let persist_err =
        |source: image::ImageError| PlaceError::Persist { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| persist_err(image::ImageError::IoError(e)))?;
    }
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .save_with_format(path, image::ImageFormat::Jpeg)
        .map_err(persist_err)
}
