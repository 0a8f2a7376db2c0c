use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond time source.
pub trait TimeSource {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests and headless runs.
///
/// Clones share the same underlying time, so one handle can be given to the
/// playback clock and another to the transport while the driver advances it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `ms`. Going backwards is ignored.
    pub fn set(&self, ms: f64) {
        if ms > self.0.get() {
            self.0.set(ms);
        }
    }

    pub fn advance(&self, delta_ms: f64) {
        if delta_ms > 0.0 {
            self.0.set(self.0.get() + delta_ms);
        }
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}
