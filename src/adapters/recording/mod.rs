//! Recording adapters that capture interactions to cassettes.

pub mod directory;

pub use directory::RecordingDirectory;
