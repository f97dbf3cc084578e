//! Placechicken - random placeholder images, resized on demand.
//!
//! A [`Place`] picks a random source image from a [`Directory`] backend
//! (local filesystem or S3-compatible object storage), resizes it to the
//! requested dimensions, and saves it under a deterministic name:
//!
//! ```no_run
//! use placechicken::{adapters::local::LocalDirectory, Place};
//!
//! # async fn run() -> Result<(), placechicken::PlaceError> {
//! let place = Place::new(Box::new(LocalDirectory::new()), "static/images/", "static/images/resized/");
//! let placement = place.get_image(500, 300).await?;
//! println!("{}", placement.path.display());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cassette;
pub mod config;
pub mod context;
pub mod error;
pub mod picker;
pub mod place;
pub mod ports;

pub use config::Config;
pub use context::ServiceContext;
pub use error::{DirectoryError, ErrorKind, PlaceError, SetupError};
pub use picker::Picker;
pub use place::{new_file_name, resized_name, Place, Placement};
pub use ports::{Directory, Image};
