//! Record/replay of directory interactions for deterministic tests.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
