// Playback timing: time sources, the pausable playback clock, the audio
// transport seam and the delayed-start player that ties them together.

mod delayed_player;
mod playback_clock;
mod time_source;
mod transport;

pub use delayed_player::{DelayedPlayer, ListenerId, PlayerTick, TickListener};
pub use playback_clock::{ClockState, PlaybackClock};
pub use time_source::{ManualClock, SystemClock, TimeSource};
pub use transport::{AudioTransport, SilentTransport, TransportEvent, TransportStatus};
