//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the placer and a storage
//! system. Implementations live in `src/adapters/`.

pub mod directory;

pub use directory::{is_original, Directory, Image, ORIGINAL_MARKER};
