//! Adapter implementations for port traits.
//!
//! - `local`: Local filesystem directories
//! - `s3`: S3-compatible object storage
//! - `recording/`: Record interactions to cassettes
//! - `replaying/`: Replay interactions from cassettes

pub mod local;
pub mod recording;
pub mod replaying;
pub mod s3;
