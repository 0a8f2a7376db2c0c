use serde::{Deserialize, Serialize};

/// Song metadata block of a chart file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SongMetadata {
    pub song_name: String,
    pub song_author: String,
    /// Duration string with a unit suffix: "185000ms", "3.5s", "2m", "1h"
    pub song_length: String,
    pub song_image_path: String,
}

impl SongMetadata {
    /// Song length in milliseconds, `None` when missing or malformed.
    pub fn length_ms(&self) -> Option<f64> {
        parse_duration_ms(&self.song_length)
    }

    /// Song length formatted as `MM:SS`, `00:00` when unknown.
    pub fn length_display(&self) -> String {
        match self.length_ms() {
            Some(ms) => {
                let total_seconds = (ms / 1000.0) as u64;
                format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
            }
            None => "00:00".to_string(),
        }
    }
}

/// Parse a duration string of the form `<number><unit>` into milliseconds.
fn parse_duration_ms(s: &str) -> Option<f64> {
    let s = s.trim();
    // "ms" must be tried before "m" and "s"
    let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000.0)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000.0)
    } else {
        return None;
    };
    let value: f64 = number.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value * scale)
}
