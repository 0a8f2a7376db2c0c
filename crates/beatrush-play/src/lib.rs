// Play state: track layout, per-track note runtime, playfield and game session

mod layout;
mod playfield;
mod session;
mod track_runtime;

pub use layout::TrackLayout;
pub use playfield::Playfield;
pub use session::{GameSession, SessionState};
pub use track_runtime::{LiveNote, TrackRuntime, TrackTiming, TrackUpdate};
