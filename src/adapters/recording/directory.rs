//! Recording adapter for the `Directory` port.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;
use crate::error::DirectoryError;
use crate::ports::directory::{Directory, Image, ListFuture, RandomImageFuture};

/// Records listings and selections while delegating to an inner backend.
pub struct RecordingDirectory {
    inner: Box<dyn Directory>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingDirectory {
    /// Wrap `inner`, recording every call into `recorder`.
    pub fn new(inner: Box<dyn Directory>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record<T: Serialize>(&self, method: &str, location: &str, result: &Result<T, DirectoryError>) {
        match self.recorder.lock() {
            Ok(mut recorder) => {
                recorder.record("directory", method, &json!({ "location": location }), result);
            }
            Err(_) => warn!(method, "Recorder lock poisoned; interaction not recorded"),
        }
    }
}

impl Directory for RecordingDirectory {
    fn list<'a>(&'a self, location: &'a str) -> ListFuture<'a> {
        Box::pin(async move {
            let result = self.inner.list(location).await;
            self.record("list", location, &result);
            result
        })
    }

    fn random_image<'a>(&'a self, location: &'a str) -> RandomImageFuture<'a> {
        Box::pin(async move {
            let result = self.inner.random_image(location).await;
            self.record("random_image", location, &result);
            result
        })
    }

    fn locate(&self, location: &str, image: &Image) -> PathBuf {
        self.inner.locate(location, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::LocalDirectory;

    #[tokio::test]
    async fn records_results_and_errors() {
        let images = tempfile::tempdir().unwrap();
        std::fs::write(images.path().join("original-a.jpg"), b"").unwrap();
        let location = images.path().to_str().unwrap();

        let out = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            out.path().join("directory.cassette.yaml"),
            "recording-test",
            "abc",
        )));
        let dir = RecordingDirectory::new(Box::new(LocalDirectory::new()), Arc::clone(&recorder));

        let image = dir.random_image(location).await.unwrap();
        assert_eq!(image.name, "original-a.jpg");
        assert!(dir.list("./bogus").await.is_err());
        assert_eq!(dir.locate(location, &image), images.path().join("original-a.jpg"));

        drop(dir);
        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        let path = recorder.finish().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("random_image"));
        assert!(content.contains("original-a.jpg"));
        assert!(content.contains("Err"));
    }
}
