use crate::host::HostEngine;
use serde::{Deserialize, Serialize};

/// Progress persisted between sessions: `{ "level": <index> }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub level: u32,
}

impl SaveState {
    pub fn store(&self, host: &mut dyn HostEngine, key: &str) {
        match serde_json::to_string(self) {
            Ok(json) => host.storage_set(key, &json),
            Err(e) => log::warn!("Failed to encode save state: {e}"),
        }
    }

    /// The saved state, or `None` if nothing (or nothing readable) is stored.
    pub fn load(host: &dyn HostEngine, key: &str) -> Option<Self> {
        let raw = host.storage_get(key)?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Ignoring unreadable save state under '{}': {e}", key);
                None
            }
        }
    }
}
