use beatrush_config::GameSetting;
use beatrush_model::Chart;
use beatrush_rule::{JudgementTier, ScoreAccumulator};
use beatrush_timing::{AudioTransport, ClockState, DelayedPlayer, ListenerId, PlayerTick, TimeSource};
use log::{debug, info};

use crate::layout::TrackLayout;
use crate::playfield::Playfield;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not started yet
    Ready,
    Playing,
    Paused,
    /// Stopped by the player before the song ended
    Stopped,
    /// The song played to its end; terminal until the next `start`
    Ended,
}

/// One play of a chart: clock, transport, tracks and score.
///
/// All methods are meant to be called from a single simulation thread,
/// ticks and input interleaved on one timeline.
pub struct GameSession<S: TimeSource, A: AudioTransport> {
    setting: GameSetting,
    layout: TrackLayout,
    player: DelayedPlayer<S, A>,
    playfield: Playfield,
    chart: Option<Chart>,
    state: SessionState,
}

impl<S: TimeSource, A: AudioTransport> GameSession<S, A> {
    pub fn new(setting: GameSetting, source: S, transport: A) -> Self {
        let layout = TrackLayout::from_setting(&setting);
        let mut player = DelayedPlayer::new(
            source,
            transport,
            layout.spawn_lead_ms,
            setting.timing.delay_correction_ms,
        );
        player.set_volume(setting.audio.song_volume_ratio);
        let playfield = Playfield::new(setting.score, layout.timing(), setting.judgment_window);
        Self {
            setting,
            layout,
            player,
            playfield,
            chart: None,
            state: SessionState::Ready,
        }
    }

    /// Load a chart. A chart with the same song name as the loaded one is
    /// kept as is, so a replay does not rebuild the tracks.
    ///
    /// Returns whether the tracks were reloaded.
    pub fn select_chart(&mut self, chart: Chart) -> bool {
        if self
            .chart
            .as_ref()
            .is_some_and(|current| current.song_name() == chart.song_name())
        {
            debug!("Chart '{}' already loaded", chart.song_name());
            return false;
        }
        self.playfield.load(
            &chart,
            self.layout.timing(),
            self.setting.judgment_window,
            self.setting.control.ignore_early_presses,
        );
        self.chart = Some(chart);
        self.state = SessionState::Ready;
        true
    }

    /// Reset score and tracks and start the clock. Also used for replays.
    pub fn start(&mut self) {
        self.playfield.reset();
        self.player.start();
        self.state = SessionState::Playing;
        info!(
            "Session started: '{}', pre-roll {:.1} ms",
            self.chart.as_ref().map_or("", Chart::song_name),
            self.layout.spawn_lead_ms
        );
    }

    /// Advance every track to chart time `elapsed_ms`.
    pub fn on_tick(&mut self, elapsed_ms: f64) {
        if self.state == SessionState::Playing {
            self.playfield.update(elapsed_ms);
        }
    }

    /// Judge a press on `track_id` at chart time `now_ms`.
    ///
    /// Unknown tracks and presses outside a running session return `None`.
    pub fn on_input(&mut self, track_id: usize, now_ms: f64) -> Option<JudgementTier> {
        if self.state != SessionState::Playing {
            return None;
        }
        self.playfield.on_input(track_id, now_ms)
    }

    /// Press on `track_id` at the current clock reading.
    pub fn press(&mut self, track_id: usize) -> Option<JudgementTier> {
        let now = self.player.chart_time_ms()?;
        self.on_input(track_id, now)
    }

    /// Press a key by name, resolved through the key bindings.
    pub fn press_key(&mut self, key: &str) -> Option<JudgementTier> {
        let track = self.setting.control.key_bindings.track_for(key)?;
        self.press(track.index())
    }

    /// One scheduler frame: poll the transport, advance the clock and
    /// update the tracks.
    pub fn frame(&mut self) -> PlayerTick {
        if self.state != SessionState::Playing {
            return PlayerTick::Idle;
        }
        let tick = self.player.tick(&mut self.playfield);
        if tick == PlayerTick::EndOfMedia {
            self.end();
            return tick;
        }
        // Follow a pause or stop the transport reported on its own
        match self.player.state() {
            ClockState::Paused => {
                self.state = SessionState::Paused;
                info!("Session paused by the audio transport");
            }
            ClockState::Idle | ClockState::Stopped => {
                self.state = SessionState::Stopped;
                info!("Session stopped by the audio transport");
            }
            ClockState::Running => {}
        }
        tick
    }

    /// Natural end of playback. End hooks fire once per run.
    pub fn on_end_of_media(&mut self) {
        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            self.player.finish();
            self.end();
        }
    }

    fn end(&mut self) {
        self.state = SessionState::Ended;
        info!("Session ended: {}", self.playfield.score().snapshot());
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.player.pause();
            self.state = SessionState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.player.resume();
            self.state = SessionState::Playing;
        }
    }

    /// Abort the run without firing end hooks.
    pub fn stop(&mut self) {
        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            self.player.stop();
            self.state = SessionState::Stopped;
            info!("Session stopped");
        }
    }

    /// Register a hook run at end of media, in registration order.
    pub fn register_end_hook(&mut self, hook: impl FnMut() + 'static) -> ListenerId {
        self.player.add_end_of_media_listener(hook)
    }

    pub fn remove_end_hook(&mut self, id: ListenerId) -> bool {
        self.player.remove_end_of_media_listener(id)
    }

    pub fn clear_end_hooks(&mut self) {
        self.player.clear_end_of_media_listeners();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn setting(&self) -> &GameSetting {
        &self.setting
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn score(&self) -> &ScoreAccumulator {
        self.playfield.score()
    }

    /// Mutable score access, for registering observers.
    pub fn score_mut(&mut self) -> &mut ScoreAccumulator {
        self.playfield.score_mut()
    }

    pub fn player(&self) -> &DelayedPlayer<S, A> {
        &self.player
    }

    /// Every note has been spawned and resolved.
    pub fn is_chart_cleared(&self) -> bool {
        self.playfield.is_cleared()
    }
}

impl<S: TimeSource, A: AudioTransport> std::fmt::Debug for GameSession<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("chart", &self.chart.as_ref().map(Chart::song_name))
            .field("player", &self.player)
            .field("playfield", &self.playfield)
            .finish()
    }
}
