//! Replaying adapters that serve recorded interactions from cassettes.

pub mod directory;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::DirectoryError;

pub use directory::ReplayingDirectory;

/// Take the next recorded result for `port`/`method` and decode it.
///
/// A recorded `{"Err": message}` becomes [`DirectoryError::Replay`], as does
/// an exhausted cassette or an output that does not decode as `T`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<T, DirectoryError> {
    let interaction = {
        let mut guard = replayer
            .lock()
            .map_err(|e| DirectoryError::Replay(format!("Replayer lock poisoned: {e}")))?;
        guard.next_interaction(port, method).map_err(DirectoryError::Replay)?
    };

    let output = interaction.output;
    if let Some(err) = output.get("Err") {
        let message = err.as_str().unwrap_or("replayed error").to_string();
        return Err(DirectoryError::Replay(message));
    }
    let value = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(value).map_err(|e| {
        DirectoryError::Replay(format!("Recorded {port}::{method} output does not decode: {e}"))
    })
}
