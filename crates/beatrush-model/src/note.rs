use serde::{Deserialize, Serialize};

use crate::track::Track;

/// The type of a note.
///
/// `Tap` is instantaneous, `Hold` is durable and carries a duration. Both are
/// judged on their start timestamp only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Tap,
    Hold,
}

const NOTE_KIND_CODES: [(NoteKind, &str); 2] = [(NoteKind::Tap, "TAP"), (NoteKind::Hold, "HOLD")];

impl NoteKind {
    /// Serialization tag used in chart files.
    pub fn code(self) -> &'static str {
        match self {
            Self::Tap => NOTE_KIND_CODES[0].1,
            Self::Hold => NOTE_KIND_CODES[1].1,
        }
    }

    /// Parse a chart-file note type tag (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        NOTE_KIND_CODES
            .iter()
            .find(|(_, c)| c.eq_ignore_ascii_case(code))
            .map(|(kind, _)| *kind)
    }

    pub fn is_durable(self) -> bool {
        matches!(self, Self::Hold)
    }
}

/// A single timed input event in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub track: Track,
    /// Time at which the note's center meets the judgement line (ms)
    pub timestamp_ms: f64,
    /// Sustain length in ms (0 for Tap)
    pub duration_ms: f64,
}

impl Note {
    pub fn tap(track: Track, timestamp_ms: f64) -> Self {
        Self {
            kind: NoteKind::Tap,
            track,
            timestamp_ms,
            duration_ms: 0.0,
        }
    }

    pub fn hold(track: Track, timestamp_ms: f64, duration_ms: f64) -> Self {
        Self {
            kind: NoteKind::Hold,
            track,
            timestamp_ms,
            duration_ms,
        }
    }

    /// Time at which the note stops occupying its lane.
    pub fn end_time_ms(&self) -> f64 {
        self.timestamp_ms + self.duration_ms
    }
}
