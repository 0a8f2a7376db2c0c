use std::collections::BTreeMap;

use beatrush_model::Track;
use serde::{Deserialize, Serialize};

/// Key name to track index mapping, e.g. `{"D": 0, "F": 1, "J": 2, "K": 3}`.
///
/// Key names are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings(BTreeMap<String, usize>);

impl Default for KeyBindings {
    fn default() -> Self {
        Self(
            [("D", 0), ("F", 1), ("J", 2), ("K", 3)]
                .into_iter()
                .map(|(k, t)| (k.to_string(), t))
                .collect(),
        )
    }
}

impl KeyBindings {
    /// Track bound to `key`, `None` for unbound keys.
    pub fn track_for(&self, key: &str) -> Option<Track> {
        let index = *self.0.get(&key.trim().to_ascii_uppercase())?;
        Track::from_index(index)
    }

    pub fn bind(&mut self, key: &str, track: Track) {
        self.0.insert(key.trim().to_ascii_uppercase(), track.index());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalise key names and drop bindings to nonexistent tracks.
    pub fn validate(&mut self) {
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .filter(|(_, t)| Track::from_index(*t).is_some())
            .map(|(k, t)| (k.trim().to_ascii_uppercase(), t))
            .collect();
    }
}

/// Input settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ControlSetting {
    pub key_bindings: KeyBindings,
    /// Treat a press as ghost input while the nearest note is still earlier
    /// than the Bad window, instead of judging it as a Miss.
    pub ignore_early_presses: bool,
}
