use std::collections::VecDeque;

use crate::time_source::TimeSource;

/// Transport status as reported by the audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Ready,
    Playing,
    Paused,
    Stopped,
}

/// Notifications raised by the audio backend.
///
/// Events are queued by the backend and drained on the simulation thread via
/// [`AudioTransport::poll_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Paused,
    Stopped,
    EndOfMedia,
}

/// Audio playback backend.
///
/// Commands are fire-and-forget; completion and state changes are reported
/// through `poll_event`.
pub trait AudioTransport {
    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    /// Current playback position in milliseconds.
    fn position_ms(&self) -> f64;

    fn status(&self) -> TransportStatus;

    /// Volume ratio (0.0 - 1.0).
    fn set_volume(&mut self, volume: f64);

    /// Next pending event, if any.
    fn poll_event(&mut self) -> Option<TransportEvent>;
}

/// Transport that plays nothing but keeps position against a time source
/// and reports end of media after `length_ms`.
#[derive(Debug, Clone)]
pub struct SilentTransport<S: TimeSource> {
    source: S,
    length_ms: f64,
    status: TransportStatus,
    /// Position accumulated before the current play span
    base_ms: f64,
    /// Time-source reading when the current play span started
    play_started_ms: f64,
    volume: f64,
    events: VecDeque<TransportEvent>,
}

impl<S: TimeSource> SilentTransport<S> {
    pub fn new(source: S, length_ms: f64) -> Self {
        Self {
            source,
            length_ms: length_ms.max(0.0),
            status: TransportStatus::Ready,
            base_ms: 0.0,
            play_started_ms: 0.0,
            volume: 1.0,
            events: VecDeque::new(),
        }
    }

    pub fn length_ms(&self) -> f64 {
        self.length_ms
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    fn raw_position(&self) -> f64 {
        match self.status {
            TransportStatus::Playing => {
                self.base_ms + (self.source.now_ms() - self.play_started_ms).max(0.0)
            }
            _ => self.base_ms,
        }
    }
}

impl<S: TimeSource> AudioTransport for SilentTransport<S> {
    fn play(&mut self) {
        match self.status {
            TransportStatus::Playing => {}
            TransportStatus::Stopped => {
                self.base_ms = 0.0;
                self.play_started_ms = self.source.now_ms();
                self.status = TransportStatus::Playing;
            }
            TransportStatus::Ready | TransportStatus::Paused => {
                self.play_started_ms = self.source.now_ms();
                self.status = TransportStatus::Playing;
            }
        }
    }

    fn pause(&mut self) {
        if self.status == TransportStatus::Playing {
            self.base_ms = self.raw_position().min(self.length_ms);
            self.status = TransportStatus::Paused;
            self.events.push_back(TransportEvent::Paused);
        }
    }

    fn stop(&mut self) {
        if matches!(self.status, TransportStatus::Playing | TransportStatus::Paused) {
            self.base_ms = 0.0;
            self.status = TransportStatus::Stopped;
            self.events.push_back(TransportEvent::Stopped);
        }
    }

    fn position_ms(&self) -> f64 {
        self.raw_position().min(self.length_ms)
    }

    fn status(&self) -> TransportStatus {
        self.status
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        if self.status == TransportStatus::Playing && self.raw_position() >= self.length_ms {
            // Media end leaves the transport parked at the end until stopped
            self.base_ms = self.length_ms;
            self.status = TransportStatus::Paused;
            self.events.push_back(TransportEvent::EndOfMedia);
        }
        self.events.pop_front()
    }
}
