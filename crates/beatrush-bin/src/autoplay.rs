// Scripted player: presses every note near its timestamp

use anyhow::{Result, bail};
use beatrush_model::Chart;
use beatrush_play::{GameSession, SessionState};
use beatrush_rule::ScoreSnapshot;
use beatrush_timing::{AudioTransport, ManualClock, PlayerTick, TimeSource};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound on simulated frames, about 3 hours at 100 fps.
const MAX_FRAMES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    chart_time_ms: f64,
    track_id: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoplayOptions {
    /// Presses are offset by a uniform value in `[-jitter_ms, jitter_ms]`
    pub jitter_ms: f64,
    /// Probability of leaving a note unpressed
    pub miss_rate: f64,
    pub seed: u64,
}

/// Precomputed press schedule for one chart.
#[derive(Debug, Clone)]
pub struct Autoplayer {
    presses: Vec<Press>,
    next: usize,
}

impl Autoplayer {
    pub fn new(chart: &Chart, options: &AutoplayOptions) -> Result<Self> {
        let jitter = options.jitter_ms.abs();
        // The sampled range spans 2 * jitter
        if !(2.0 * jitter).is_finite() {
            bail!("invalid jitter {} ms", options.jitter_ms);
        }
        let miss_rate = options.miss_rate;
        if !(0.0..=1.0).contains(&miss_rate) {
            bail!("miss rate {miss_rate} is outside 0.0 - 1.0");
        }
        let mut rng = StdRng::seed_from_u64(options.seed);

        let mut notes: Vec<_> = chart.notes().collect();
        notes.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));

        let mut presses = Vec::with_capacity(notes.len());
        for note in notes {
            if rng.gen_bool(miss_rate) {
                continue;
            }
            let offset = if jitter > 0.0 {
                rng.gen_range(-jitter..=jitter)
            } else {
                0.0
            };
            presses.push(Press {
                chart_time_ms: note.timestamp_ms + offset,
                track_id: note.track.index(),
            });
        }
        presses.sort_by(|a, b| a.chart_time_ms.total_cmp(&b.chart_time_ms));

        Ok(Self { presses, next: 0 })
    }

    pub fn press_count(&self) -> usize {
        self.presses.len()
    }

    /// Play one full run, advancing `clock` by `frame_ms` per frame.
    pub fn run<A: AudioTransport>(
        &mut self,
        session: &mut GameSession<ManualClock, A>,
        clock: &ManualClock,
        frame_ms: f64,
    ) -> Result<ScoreSnapshot> {
        if !(frame_ms.is_finite() && frame_ms > 0.0) {
            bail!("invalid frame time {frame_ms} ms");
        }
        self.next = 0;
        session.start();

        for _ in 0..MAX_FRAMES {
            clock.advance(frame_ms);
            match session.frame() {
                PlayerTick::Ticked(now) => self.press_due(session, now),
                PlayerTick::EndOfMedia => {
                    debug!("Autoplay finished at {:.1} ms", clock.now_ms());
                    return Ok(session.score().snapshot());
                }
                PlayerTick::Idle => {
                    if session.state() != SessionState::Playing {
                        bail!("session left play unexpectedly ({:?})", session.state());
                    }
                }
            }
        }
        bail!("song did not end within {MAX_FRAMES} frames")
    }

    fn press_due<A: AudioTransport>(&mut self, session: &mut GameSession<ManualClock, A>, now: f64) {
        while let Some(press) = self.presses.get(self.next) {
            if press.chart_time_ms > now {
                break;
            }
            session.on_input(press.track_id, press.chart_time_ms);
            self.next += 1;
        }
    }
}
