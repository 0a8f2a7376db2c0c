use beatrush_model::{Note, Track};
use beatrush_rule::{JudgeWindowTable, JudgementTier, ScoreAccumulator};
use log::trace;

/// Per-track timing constants derived from the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackTiming {
    /// How long before its timestamp a note is spawned
    pub spawn_lead_ms: f64,
    /// How long after its timestamp an unresolved note is missed
    pub auto_miss_after_ms: f64,
}

/// A spawned, not yet resolved note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveNote {
    pub note: Note,
    /// Chart time of the tick that spawned it
    pub spawned_at_ms: f64,
}

impl LiveNote {
    pub fn timestamp_ms(&self) -> f64 {
        self.note.timestamp_ms
    }
}

/// Notes spawned and missed by one [`TrackRuntime::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackUpdate {
    pub spawned: usize,
    pub missed: usize,
}

/// Runtime state of a single track: spawn cursor and live notes.
///
/// Hold notes are judged on their head exactly like taps.
#[derive(Debug, Clone)]
pub struct TrackRuntime {
    track: Track,
    notes: Vec<Note>,
    /// Next note to spawn
    cursor: usize,
    /// Ordered by timestamp
    live: Vec<LiveNote>,
    timing: TrackTiming,
    windows: JudgeWindowTable,
    ignore_early_presses: bool,
}

impl TrackRuntime {
    /// `notes` must be sorted by timestamp.
    pub fn new(track: Track, notes: Vec<Note>, timing: TrackTiming, windows: JudgeWindowTable) -> Self {
        debug_assert!(notes.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
        Self {
            track,
            notes,
            cursor: 0,
            live: Vec::new(),
            timing,
            windows,
            ignore_early_presses: false,
        }
    }

    /// Ignore presses whose nearest note is still before the Bad window.
    pub fn with_early_press_gate(mut self, enabled: bool) -> Self {
        self.ignore_early_presses = enabled;
        self
    }

    pub fn track(&self) -> Track {
        self.track
    }

    pub fn timing(&self) -> TrackTiming {
        self.timing
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn live_notes(&self) -> &[LiveNote] {
        &self.live
    }

    /// Every note has been spawned.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.notes.len()
    }

    /// Every note has been spawned and resolved.
    pub fn is_cleared(&self) -> bool {
        self.is_finished() && self.live.is_empty()
    }

    /// Spawn due notes, then miss the ones that fell past the auto-miss time.
    pub fn update(&mut self, elapsed_ms: f64, score: &mut ScoreAccumulator) -> TrackUpdate {
        let mut result = TrackUpdate::default();

        while let Some(note) = self.notes.get(self.cursor) {
            if note.timestamp_ms - self.timing.spawn_lead_ms > elapsed_ms {
                break;
            }
            self.live.push(LiveNote {
                note: *note,
                spawned_at_ms: elapsed_ms,
            });
            self.cursor += 1;
            result.spawned += 1;
        }

        let auto_miss_after = self.timing.auto_miss_after_ms;
        let windows = &self.windows;
        let track = self.track;
        self.live.retain(|live| {
            // Same sum a caller forms for the deadline, so the boundary tick stays live
            if elapsed_ms <= live.timestamp_ms() + auto_miss_after {
                return true;
            }
            let tier = windows.classify(f64::INFINITY);
            trace!("{track:?}: auto {tier} for note at {:.1}", live.timestamp_ms());
            score.add_judgement(tier);
            result.missed += 1;
            false
        });

        result
    }

    /// Judge a press at `now_ms` against the nearest live note.
    ///
    /// Ties go to the earlier note. Returns `None` for ghost input, leaving
    /// the score untouched.
    pub fn resolve_hit(&mut self, now_ms: f64, score: &mut ScoreAccumulator) -> Option<JudgementTier> {
        let index = self.nearest_live(now_ms)?;
        let offset_ms = now_ms - self.live[index].timestamp_ms();
        if self.ignore_early_presses && offset_ms < self.windows.earliest_ms() {
            trace!("{:?}: early press {offset_ms:.1} ms ignored", self.track);
            return None;
        }

        let tier = self.windows.classify(offset_ms);
        let live = self.live.remove(index);
        trace!(
            "{:?}: {tier} ({offset_ms:+.1} ms) for note at {:.1}",
            self.track,
            live.timestamp_ms()
        );
        score.add_judgement(tier);
        Some(tier)
    }

    /// Rewind for a replay.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.live.clear();
    }

    fn nearest_live(&self, now_ms: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, live) in self.live.iter().enumerate() {
            let distance = (live.timestamp_ms() - now_ms).abs();
            // Strict comparison keeps the earliest of equally distant notes
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }
}
