use serde::{Deserialize, Serialize};

/// Number of playable tracks (lanes).
pub const TRACK_COUNT: usize = 4;

/// A playable lane, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Track {
    Left,
    MiddleLeft,
    MiddleRight,
    Right,
}

/// External encoding used by chart files and key bindings.
/// Order matches `Track::ALL`.
const TRACK_CODES: [(Track, &str); TRACK_COUNT] = [
    (Track::Left, "0"),
    (Track::MiddleLeft, "1"),
    (Track::MiddleRight, "2"),
    (Track::Right, "3"),
];

impl Track {
    pub const ALL: [Track; TRACK_COUNT] = [
        Track::Left,
        Track::MiddleLeft,
        Track::MiddleRight,
        Track::Right,
    ];

    /// 0-indexed lane position.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lane for a 0-indexed position. `None` for anything past the last lane.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Serialization tag used in chart files.
    pub fn code(self) -> &'static str {
        TRACK_CODES[self.index()].1
    }

    /// Parse a chart-file track tag.
    pub fn from_code(code: &str) -> Option<Self> {
        TRACK_CODES
            .iter()
            .find(|(_, c)| *c == code.trim())
            .map(|(track, _)| *track)
    }
}
