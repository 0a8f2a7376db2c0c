// JSON chart file decoder
//
// File layout:
// { "metadata": { "songName": ..., ... },
//   "note": [ { "noteType": "TAP", "trackType": "0", "timestamp": 1000.0, "duration": 0.0 } ] }

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::note::{Note, NoteKind};
use crate::song::SongMetadata;
use crate::track::Track;

/// Enum tag as written in a chart file. Track tags may appear as strings or bare integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum Code {
    Text(String),
    Number(u64),
}

impl Code {
    fn as_text(&self) -> String {
        match self {
            Code::Text(s) => s.clone(),
            Code::Number(n) => n.to_string(),
        }
    }
}

/// One raw note record, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord {
    note_type: Code,
    track_type: Code,
    timestamp: f64,
    #[serde(default)]
    duration: f64,
}

impl NoteRecord {
    fn from_note(note: &Note) -> Self {
        Self {
            note_type: Code::Text(note.kind.code().to_string()),
            track_type: Code::Text(note.track.code().to_string()),
            timestamp: note.timestamp_ms,
            duration: note.duration_ms,
        }
    }

    fn into_note(self) -> Result<Note> {
        let kind_code = self.note_type.as_text();
        let kind = NoteKind::from_code(&kind_code)
            .with_context(|| format!("unknown note type '{kind_code}'"))?;
        let track_code = self.track_type.as_text();
        let track = Track::from_code(&track_code)
            .with_context(|| format!("unknown track type '{track_code}'"))?;

        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            bail!("invalid timestamp {}", self.timestamp);
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            bail!("invalid duration {}", self.duration);
        }

        Ok(match kind {
            NoteKind::Tap => Note::tap(track, self.timestamp),
            NoteKind::Hold => {
                if self.duration == 0.0 {
                    bail!("hold note at {} ms has zero duration", self.timestamp);
                }
                Note::hold(track, self.timestamp, self.duration)
            }
        })
    }
}

/// Chart file as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFile {
    #[serde(default)]
    pub metadata: SongMetadata,
    #[serde(default, rename = "note")]
    notes: Vec<NoteRecord>,
}

impl ChartFile {
    /// Build a chart file from in-memory notes (used by tools and tests).
    pub fn from_notes(metadata: SongMetadata, notes: &[Note]) -> Self {
        Self {
            metadata,
            notes: notes.iter().map(NoteRecord::from_note).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every record and build the immutable chart.
    pub fn into_chart(self) -> Result<Chart> {
        let notes = self
            .notes
            .into_iter()
            .enumerate()
            .map(|(i, record)| record.into_note().with_context(|| format!("note #{i}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Chart::new(self.metadata, notes))
    }
}

#[derive(Deserialize)]
struct MetadataOnly {
    #[serde(default)]
    metadata: SongMetadata,
}

/// JSON chart decoder
pub struct ChartDecoder;

impl ChartDecoder {
    pub fn decode(path: &Path) -> Result<Chart> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read chart {}", path.display()))?;
        Self::decode_str(&content).with_context(|| format!("failed to decode chart {}", path.display()))
    }

    pub fn decode_str(content: &str) -> Result<Chart> {
        let file: ChartFile = serde_json::from_str(content)?;
        file.into_chart()
    }

    /// Read only the metadata block of a chart file.
    pub fn decode_metadata(path: &Path) -> Result<SongMetadata> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read chart {}", path.display()))?;
        let meta: MetadataOnly = serde_json::from_str(&content)
            .with_context(|| format!("failed to decode metadata of {}", path.display()))?;
        Ok(meta.metadata)
    }

    /// Read the metadata of every `*.json` chart in `dir`, sorted by song name.
    ///
    /// Files that fail to decode are logged and skipped.
    pub fn scan_metadata(dir: &Path) -> Result<Vec<SongMetadata>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to scan directory {}", dir.display()))?;

        let mut songs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::decode_metadata(&path) {
                Ok(meta) => songs.push(meta),
                Err(e) => warn!("Skipping chart {}: {e:#}", path.display()),
            }
        }
        songs.sort_by(|a, b| a.song_name.cmp(&b.song_name));
        Ok(songs)
    }
}
