// Chart data model: notes, tracks, per-track partitioned charts, JSON chart files

mod chart;
mod chart_decode;
mod note;
mod song;
mod track;

pub use chart::Chart;
pub use chart_decode::{ChartDecoder, ChartFile};
pub use note::{Note, NoteKind};
pub use song::SongMetadata;
pub use track::{TRACK_COUNT, Track};
