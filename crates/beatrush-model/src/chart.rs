use log::info;

use crate::note::Note;
use crate::song::SongMetadata;
use crate::track::{TRACK_COUNT, Track};

/// Immutable chart: every note of a song, partitioned by track.
///
/// Each track's sub-sequence is stable-sorted by timestamp, so notes sharing a
/// timestamp keep their source order.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    metadata: SongMetadata,
    tracks: [Vec<Note>; TRACK_COUNT],
}

impl Chart {
    /// Build a chart from an unsorted note list.
    ///
    /// Timestamps must be finite; the chart decoder rejects anything else.
    pub fn new(metadata: SongMetadata, notes: Vec<Note>) -> Self {
        let mut tracks: [Vec<Note>; TRACK_COUNT] = Default::default();
        for note in notes {
            debug_assert!(note.timestamp_ms.is_finite());
            tracks[note.track.index()].push(note);
        }
        for lane in &mut tracks {
            lane.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
        }

        let chart = Self { metadata, tracks };
        info!(
            "Chart '{}' loaded: {} notes {:?}",
            chart.metadata.song_name,
            chart.note_count(),
            Track::ALL.map(|t| chart.track(t).len())
        );
        chart
    }

    pub fn metadata(&self) -> &SongMetadata {
        &self.metadata
    }

    pub fn song_name(&self) -> &str {
        &self.metadata.song_name
    }

    /// Notes of one track, ordered by timestamp.
    pub fn track(&self, track: Track) -> &[Note] {
        &self.tracks[track.index()]
    }

    /// All notes, track by track.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.tracks.iter().flatten()
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.note_count() == 0
    }

    /// Latest end time over all notes, 0 for an empty chart.
    pub fn last_note_time_ms(&self) -> f64 {
        self.notes().map(Note::end_time_ms).fold(0.0, f64::max)
    }
}
