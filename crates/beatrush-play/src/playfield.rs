use beatrush_model::{Chart, Track};
use beatrush_rule::{JudgeWindowTable, JudgementTier, ScoreAccumulator, ScoreRule};
use beatrush_timing::TickListener;

use crate::track_runtime::{TrackRuntime, TrackTiming, TrackUpdate};

/// All track runtimes plus the score they write to.
#[derive(Debug)]
pub struct Playfield {
    tracks: Vec<TrackRuntime>,
    score: ScoreAccumulator,
    last_tick_ms: Option<f64>,
}

impl Playfield {
    /// Empty playfield: every track exists but holds no notes.
    pub fn new(rule: ScoreRule, timing: TrackTiming, windows: JudgeWindowTable) -> Self {
        Self {
            tracks: Track::ALL
                .iter()
                .map(|&t| TrackRuntime::new(t, Vec::new(), timing, windows))
                .collect(),
            score: ScoreAccumulator::new(rule),
            last_tick_ms: None,
        }
    }

    /// Replace every track runtime with the notes of `chart`.
    pub fn load(
        &mut self,
        chart: &Chart,
        timing: TrackTiming,
        windows: JudgeWindowTable,
        ignore_early_presses: bool,
    ) {
        self.tracks = Track::ALL
            .iter()
            .map(|&t| {
                TrackRuntime::new(t, chart.track(t).to_vec(), timing, windows)
                    .with_early_press_gate(ignore_early_presses)
            })
            .collect();
        self.last_tick_ms = None;
    }

    /// Zero the score and rewind every track.
    pub fn reset(&mut self) {
        self.score.reset();
        for track in &mut self.tracks {
            track.reset();
        }
        self.last_tick_ms = None;
    }

    /// Advance every track to chart time `elapsed_ms`.
    pub fn update(&mut self, elapsed_ms: f64) -> TrackUpdate {
        let mut total = TrackUpdate::default();
        for track in &mut self.tracks {
            let update = track.update(elapsed_ms, &mut self.score);
            total.spawned += update.spawned;
            total.missed += update.missed;
        }
        self.last_tick_ms = Some(elapsed_ms);
        total
    }

    /// Route a press to a track. Unknown track ids are ignored.
    pub fn on_input(&mut self, track_id: usize, now_ms: f64) -> Option<JudgementTier> {
        let track = self.tracks.get_mut(track_id)?;
        track.resolve_hit(now_ms, &mut self.score)
    }

    pub fn track(&self, track: Track) -> &TrackRuntime {
        &self.tracks[track.index()]
    }

    pub fn tracks(&self) -> &[TrackRuntime] {
        &self.tracks
    }

    pub fn score(&self) -> &ScoreAccumulator {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut ScoreAccumulator {
        &mut self.score
    }

    /// Chart time of the most recent update.
    pub fn last_tick_ms(&self) -> Option<f64> {
        self.last_tick_ms
    }

    pub fn live_note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.live_notes().len()).sum()
    }

    pub fn is_cleared(&self) -> bool {
        self.tracks.iter().all(TrackRuntime::is_cleared)
    }
}

impl TickListener for Playfield {
    fn on_tick(&mut self, chart_time_ms: f64) {
        self.update(chart_time_ms);
    }
}
