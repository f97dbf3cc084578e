//! Replaying adapter for the `Directory` port.

use std::sync::{Arc, Mutex};

use super::replay_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::directory::{Directory, Image, ListFuture, RandomImageFuture};

/// Serves recorded listings and selections from a cassette.
///
/// Selected images are located relative to the requested location, so a
/// replayed selection opens real fixture files.
pub struct ReplayingDirectory {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingDirectory {
    /// Create a replaying directory backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl Directory for ReplayingDirectory {
    fn list<'a>(&'a self, _location: &'a str) -> ListFuture<'a> {
        let result = replay_result::<Vec<Image>>(&self.replayer, "directory", "list");
        Box::pin(async move { result })
    }

    fn random_image<'a>(&'a self, _location: &'a str) -> RandomImageFuture<'a> {
        let result = replay_result::<Image>(&self.replayer, "directory", "random_image");
        Box::pin(async move { result })
    }
}
