use log::{debug, info};

use crate::playback_clock::{ClockState, PlaybackClock};
use crate::time_source::TimeSource;
use crate::transport::{AudioTransport, TransportEvent, TransportStatus};

/// Receives chart-time ticks from a [`DelayedPlayer`].
pub trait TickListener {
    /// `chart_time_ms` is the clock's elapsed time minus the startup delay,
    /// so it is negative during the pre-roll.
    fn on_tick(&mut self, chart_time_ms: f64);
}

/// Handle returned by [`DelayedPlayer::add_end_of_media_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of one [`DelayedPlayer::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerTick {
    /// Clock not running, nothing delivered
    Idle,
    /// A tick was delivered at this chart time
    Ticked(f64),
    /// The transport reported end of media; the run has finished
    EndOfMedia,
}

type EndListener = Box<dyn FnMut()>;

/// Couples a [`PlaybackClock`] to an [`AudioTransport`] with a startup delay.
///
/// The clock starts immediately so visuals can pre-roll; the transport is
/// started once the clock reaches `delay_ms - correction_ms`, the correction
/// compensating for output latency. Ticks are delivered in chart time
/// (`elapsed - delay_ms`).
pub struct DelayedPlayer<S: TimeSource, A: AudioTransport> {
    clock: PlaybackClock<S>,
    transport: A,
    delay_ms: f64,
    correction_ms: f64,
    audio_started: bool,
    finished: bool,
    listeners: Vec<(ListenerId, EndListener)>,
    next_listener: u64,
}

impl<S: TimeSource, A: AudioTransport> DelayedPlayer<S, A> {
    pub fn new(source: S, transport: A, delay_ms: f64, correction_ms: f64) -> Self {
        Self {
            clock: PlaybackClock::new(source),
            transport,
            delay_ms: delay_ms.max(0.0),
            correction_ms: correction_ms.max(0.0),
            audio_started: false,
            finished: false,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn clock(&self) -> &PlaybackClock<S> {
        &self.clock
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn transport(&self) -> &A {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut A {
        &mut self.transport
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms.max(0.0);
    }

    pub fn correction_ms(&self) -> f64 {
        self.correction_ms
    }

    /// Clock time at which the transport is started.
    pub fn audio_start_ms(&self) -> f64 {
        (self.delay_ms - self.correction_ms).max(0.0)
    }

    pub fn is_audio_started(&self) -> bool {
        self.audio_started
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.transport.set_volume(volume);
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed_ms()
    }

    /// Current chart time, `None` unless the clock is running.
    pub fn chart_time_ms(&self) -> Option<f64> {
        self.clock.tick().map(|elapsed| elapsed - self.delay_ms)
    }

    /// Start a run from the top, discarding stale transport events.
    pub fn start(&mut self) {
        if self.transport.status() != TransportStatus::Ready {
            self.transport.stop();
        }
        while self.transport.poll_event().is_some() {}
        self.clock.reset();
        self.clock.start();
        self.audio_started = false;
        self.finished = false;
        debug!(
            "Player started, audio at {:.1} ms (delay {:.1}, correction {:.1})",
            self.audio_start_ms(),
            self.delay_ms,
            self.correction_ms
        );
    }

    pub fn pause(&mut self) {
        if self.clock.state() != ClockState::Running {
            return;
        }
        self.clock.pause();
        if self.audio_started {
            self.transport.pause();
        }
    }

    pub fn resume(&mut self) {
        if self.clock.state() != ClockState::Paused {
            return;
        }
        self.clock.resume();
        if self.audio_started {
            self.transport.play();
        }
    }

    pub fn stop(&mut self) {
        self.clock.stop();
        self.transport.stop();
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        self.audio_started = false;
    }

    /// Drain transport events, start audio when due and deliver one tick.
    ///
    /// Pause/stop events only apply while the transport still reports that
    /// status, so events echoing an already superseded command are dropped.
    pub fn tick(&mut self, listener: &mut dyn TickListener) -> PlayerTick {
        while let Some(event) = self.transport.poll_event() {
            let status = self.transport.status();
            match event {
                TransportEvent::EndOfMedia => {
                    self.finish();
                    return PlayerTick::EndOfMedia;
                }
                TransportEvent::Paused if status == TransportStatus::Paused => self.clock.pause(),
                TransportEvent::Stopped if status == TransportStatus::Stopped => self.reset(),
                TransportEvent::Paused | TransportEvent::Stopped => {
                    debug!("Ignoring stale transport event {event:?}");
                }
            }
        }

        let Some(elapsed) = self.clock.tick() else {
            return PlayerTick::Idle;
        };
        if !self.audio_started && elapsed >= self.audio_start_ms() {
            self.transport.play();
            self.audio_started = true;
            debug!("Audio started at clock {elapsed:.1} ms");
        }
        let chart_time = elapsed - self.delay_ms;
        listener.on_tick(chart_time);
        PlayerTick::Ticked(chart_time)
    }

    /// End of media: reset the clock, stop the transport and run the
    /// end-of-media listeners once, in registration order.
    ///
    /// Returns `false` if the run had already finished.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        self.reset();
        self.transport.stop();
        info!("End of media, notifying {} listener(s)", self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener();
        }
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn add_end_of_media_listener(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_end_of_media_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn clear_end_of_media_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn end_of_media_listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<S: TimeSource, A: AudioTransport> std::fmt::Debug for DelayedPlayer<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedPlayer")
            .field("state", &self.clock.state())
            .field("elapsed_ms", &self.clock.elapsed_ms())
            .field("delay_ms", &self.delay_ms)
            .field("correction_ms", &self.correction_ms)
            .field("audio_started", &self.audio_started)
            .field("finished", &self.finished)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::time_source::ManualClock;
    use crate::transport::SilentTransport;

    #[derive(Default)]
    struct Recorder(Vec<f64>);

    impl TickListener for Recorder {
        fn on_tick(&mut self, chart_time_ms: f64) {
            self.0.push(chart_time_ms);
        }
    }

    fn setup(delay: f64, length: f64) -> (ManualClock, DelayedPlayer<ManualClock, SilentTransport<ManualClock>>) {
        let time = ManualClock::new();
        let transport = SilentTransport::new(time.clone(), length);
        (time.clone(), DelayedPlayer::new(time, transport, delay, 300.0))
    }

    #[test]
    fn tick_before_start_is_idle() {
        let (time, mut player) = setup(1000.0, 5000.0);
        let mut rec = Recorder::default();
        time.advance(100.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::Idle);
        assert!(rec.0.is_empty());
        assert_eq!(player.chart_time_ms(), None);
    }

    #[test]
    fn audio_starts_at_corrected_delay() {
        let (time, mut player) = setup(1000.0, 5000.0);
        let mut rec = Recorder::default();
        player.start();

        time.advance(699.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::Ticked(-301.0));
        assert!(!player.is_audio_started());
        assert_eq!(player.transport().status(), TransportStatus::Ready);

        time.advance(1.0);
        player.tick(&mut rec);
        assert!(player.is_audio_started());
        assert_eq!(player.transport().status(), TransportStatus::Playing);
        assert_eq!(rec.0, vec![-301.0, -300.0]);
    }

    #[test]
    fn correction_larger_than_delay_starts_audio_immediately() {
        let (_, mut player) = setup(100.0, 5000.0);
        player.start();
        assert_eq!(player.audio_start_ms(), 0.0);
        player.tick(&mut Recorder::default());
        assert!(player.is_audio_started());
    }

    #[test]
    fn pause_pauses_transport_once_audio_started() {
        let (time, mut player) = setup(0.0, 5000.0);
        let mut rec = Recorder::default();
        player.start();
        player.tick(&mut rec);
        time.advance(100.0);
        player.pause();
        assert_eq!(player.transport().status(), TransportStatus::Paused);
        time.advance(500.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::Idle);
        player.resume();
        time.advance(10.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::Ticked(110.0));
        assert_eq!(player.transport().position_ms(), 110.0);
    }

    #[test]
    fn stale_pause_event_after_resume_is_ignored() {
        let (time, mut player) = setup(0.0, 5000.0);
        let mut rec = Recorder::default();
        player.start();
        player.tick(&mut rec);
        player.pause();
        player.resume();
        time.advance(20.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::Ticked(20.0));
        assert_eq!(player.state(), ClockState::Running);
    }

    #[test]
    fn transport_stopped_event_resets_clock() {
        let (time, mut player) = setup(0.0, 5000.0);
        let mut rec = Recorder::default();
        player.start();
        player.tick(&mut rec);
        time.advance(10.0);
        player.transport_mut().stop();
        assert_eq!(player.tick(&mut rec), PlayerTick::Idle);
        assert_eq!(player.state(), ClockState::Idle);
    }

    #[test]
    fn end_of_media_runs_listeners_once_in_order() {
        let (time, mut player) = setup(0.0, 1000.0);
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second"] {
            let order = Rc::clone(&order);
            player.add_end_of_media_listener(move || order.borrow_mut().push(name));
        }
        let mut rec = Recorder::default();
        player.start();
        player.tick(&mut rec);
        time.advance(1000.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::EndOfMedia);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(player.state(), ClockState::Idle);
        assert_eq!(player.transport().status(), TransportStatus::Stopped);

        // The stop issued by the end sequence must not fire anything again
        assert_eq!(player.tick(&mut rec), PlayerTick::Idle);
        assert!(!player.finish());
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn restart_after_end_clears_stale_events() {
        let (time, mut player) = setup(0.0, 100.0);
        let mut rec = Recorder::default();
        player.start();
        player.tick(&mut rec);
        time.advance(100.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::EndOfMedia);

        player.start();
        assert!(!player.is_finished());
        time.advance(10.0);
        assert_eq!(player.tick(&mut rec), PlayerTick::Ticked(10.0));
    }

    #[test]
    fn listeners_can_be_removed() {
        let (_, mut player) = setup(0.0, 100.0);
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        let id = player.add_end_of_media_listener(move || *counter.borrow_mut() += 1);
        player.add_end_of_media_listener(|| {});
        assert!(player.remove_end_of_media_listener(id));
        assert!(!player.remove_end_of_media_listener(id));
        assert_eq!(player.end_of_media_listener_count(), 1);
        player.clear_end_of_media_listeners();
        player.start();
        player.finish();
        assert_eq!(*fired.borrow(), 0);
    }
}
