use log::debug;

use crate::time_source::TimeSource;

/// Playback clock lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Pausable elapsed-time clock.
///
/// While running, elapsed time is `now - origin`. Pausing freezes the elapsed
/// value and resuming moves the origin forward by the paused span, so no
/// time is lost or gained across a pause.
#[derive(Debug, Clone)]
pub struct PlaybackClock<S: TimeSource> {
    source: S,
    state: ClockState,
    origin_ms: f64,
    /// Elapsed time captured on pause/stop
    frozen_ms: f64,
}

impl<S: TimeSource> PlaybackClock<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ClockState::Idle,
            origin_ms: 0.0,
            frozen_ms: 0.0,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Idle/Stopped -> Running with a fresh origin. Otherwise a no-op.
    pub fn start(&mut self) {
        match self.state {
            ClockState::Idle | ClockState::Stopped => {
                self.origin_ms = self.source.now_ms();
                self.frozen_ms = 0.0;
                self.state = ClockState::Running;
                debug!("Playback clock started at {:.3}", self.origin_ms);
            }
            ClockState::Running | ClockState::Paused => {}
        }
    }

    /// Running -> Paused. Otherwise a no-op.
    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.frozen_ms = self.running_elapsed();
            self.state = ClockState::Paused;
            debug!("Playback clock paused at {:.3}", self.frozen_ms);
        }
    }

    /// Paused -> Running, continuing from the frozen elapsed time.
    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.origin_ms = self.source.now_ms() - self.frozen_ms;
            self.state = ClockState::Running;
            debug!("Playback clock resumed at {:.3}", self.frozen_ms);
        }
    }

    /// Running/Paused -> Stopped. The last elapsed time stays readable.
    pub fn stop(&mut self) {
        match self.state {
            ClockState::Running => {
                self.frozen_ms = self.running_elapsed();
                self.state = ClockState::Stopped;
            }
            ClockState::Paused => self.state = ClockState::Stopped,
            ClockState::Idle | ClockState::Stopped => return,
        }
        debug!("Playback clock stopped at {:.3}", self.frozen_ms);
    }

    /// Any state -> Idle.
    pub fn reset(&mut self) {
        self.state = ClockState::Idle;
        self.origin_ms = 0.0;
        self.frozen_ms = 0.0;
        debug!("Playback clock reset");
    }

    /// Elapsed milliseconds since `start`, excluding paused spans.
    pub fn elapsed_ms(&self) -> f64 {
        match self.state {
            ClockState::Running => self.running_elapsed(),
            ClockState::Paused | ClockState::Stopped => self.frozen_ms,
            ClockState::Idle => 0.0,
        }
    }

    /// Elapsed time for this tick, `None` unless running.
    pub fn tick(&self) -> Option<f64> {
        self.is_running().then(|| self.running_elapsed())
    }

    fn running_elapsed(&self) -> f64 {
        (self.source.now_ms() - self.origin_ms).max(0.0)
    }
}
