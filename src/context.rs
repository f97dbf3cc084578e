//! Builds a configured [`Place`] for the host process.
//!
//! The host owns the returned context; nothing here is global.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::adapters::local::LocalDirectory;
use crate::adapters::recording::RecordingDirectory;
use crate::adapters::replaying::ReplayingDirectory;
use crate::adapters::s3::S3Directory;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::{Backend, Config};
use crate::error::SetupError;
use crate::picker::Picker;
use crate::place::Place;
use crate::ports::Directory;

/// A configured placer, ready to share across requests.
pub struct ServiceContext {
    /// The placer.
    pub place: Arc<Place>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the recorded cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the placer is still alive or the cassette cannot be
    /// written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording directory still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a context over the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the S3 backend has no bucket configured.
    pub fn live(config: &Config) -> Result<Self, SetupError> {
        let dir = directory(config)?;
        Ok(Self::with_directory(config, dir))
    }

    /// Create a context that records every directory call into a cassette
    /// under `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the live backend cannot be built.
    pub fn recording(
        config: &Config,
        output_dir: &Path,
    ) -> Result<(Self, RecordingSession), SetupError> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = output_dir.join(&timestamp).join("directory.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-directory"),
            get_commit_hash(),
        )));

        let dir = RecordingDirectory::new(directory(config)?, Arc::clone(&recorder));
        let ctx = Self::with_directory(config, Box::new(dir));
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a context that replays directory calls from a cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be loaded.
    pub fn replaying(config: &Config, cassette: &Path) -> Result<Self, SetupError> {
        let replayer = load_cassette(cassette).map_err(SetupError::Cassette)?;
        let dir = ReplayingDirectory::new(Arc::new(Mutex::new(replayer)));
        Ok(Self::with_directory(config, Box::new(dir)))
    }

    /// Pick live, recording, or replaying mode from `PLACECHICKEN_REPLAY`
    /// (cassette path) and `PLACECHICKEN_REC` (`true` or `1`).
    ///
    /// # Errors
    ///
    /// Returns an error if the selected mode cannot be set up.
    pub fn from_env(config: &Config) -> Result<(Self, Option<RecordingSession>), SetupError> {
        if let Ok(cassette) = std::env::var("PLACECHICKEN_REPLAY") {
            info!(cassette, "Replaying directory interactions");
            return Ok((Self::replaying(config, Path::new(&cassette))?, None));
        }
        if std::env::var("PLACECHICKEN_REC").is_ok_and(|v| v == "true" || v == "1") {
            info!("Recording directory interactions");
            let (ctx, session) = Self::recording(config, Path::new(".placechicken/cassettes"))?;
            return Ok((ctx, Some(session)));
        }
        Ok((Self::live(config)?, None))
    }

    fn with_directory(config: &Config, dir: Box<dyn Directory>) -> Self {
        let place = Place::new(dir, config.original_path(), config.resized_path());
        Self { place: Arc::new(place) }
    }
}

/// Build the configured backend.
fn directory(config: &Config) -> Result<Box<dyn Directory>, SetupError> {
    let picker = config.placer.seed.map_or_else(Picker::new, Picker::seeded);
    match config.placer.backend {
        Backend::Local => Ok(Box::new(LocalDirectory::with_picker(picker))),
        Backend::S3 => {
            if config.original_path().is_empty() {
                return Err(SetupError::MissingSetting("placer.original_path (bucket)"));
            }
            let mut s3 = S3Directory::new(config.region()).with_picker(picker);
            if let Some(endpoint) = &config.s3.endpoint {
                s3 = s3.with_endpoint(endpoint);
            }
            if let Some(staging) = &config.s3.staging_dir {
                s3 = s3.with_staging_dir(staging);
            }
            Ok(Box::new(s3))
        }
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
