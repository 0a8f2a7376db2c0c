use std::cell::{Cell, RefCell};
use std::rc::Rc;

use beatrush_config::GameSetting;
use beatrush_model::{Chart, ChartDecoder, Note, SongMetadata, Track};
use beatrush_play::{GameSession, SessionState};
use beatrush_rule::{JudgementTier, ScoreSnapshot};
use beatrush_timing::{ManualClock, PlayerTick, SilentTransport};

type Session = GameSession<ManualClock, SilentTransport<ManualClock>>;

const SINGLE_TAP: &str = r#"{
    "metadata": { "songName": "single", "songAuthor": "test", "songLength": "3s" },
    "note": [ { "noteType": "TAP", "trackType": "0", "timestamp": 1000.0 } ]
}"#;

fn new_session(length_ms: f64) -> (ManualClock, Session) {
    let time = ManualClock::new();
    let transport = SilentTransport::new(time.clone(), length_ms);
    (time.clone(), GameSession::new(GameSetting::default(), time, transport))
}

fn dense_chart() -> Chart {
    let notes = (0..200)
        .map(|i| {
            let track = Track::ALL[i % 4];
            let t = 500.0 + 125.0 * i as f64;
            if i % 7 == 0 {
                Note::hold(track, t, 250.0)
            } else {
                Note::tap(track, t)
            }
        })
        .collect();
    Chart::new(
        SongMetadata {
            song_name: "dense".to_string(),
            ..Default::default()
        },
        notes,
    )
}

/// Drive a full run frame by frame, pressing every note `offset_ms` late
/// except the ones `skip` rejects.
fn autoplay(
    session: &mut Session,
    time: &ManualClock,
    offset_ms: f64,
    skip: impl Fn(usize) -> bool,
) -> ScoreSnapshot {
    let mut presses: Vec<(f64, usize)> = session
        .chart()
        .map(|chart| chart.notes().map(|n| (n.timestamp_ms + offset_ms, n.track.index())).collect())
        .unwrap_or_default();
    presses.sort_by(|a, b| a.0.total_cmp(&b.0));

    session.start();
    let mut next = 0;
    for _ in 0..100_000 {
        time.advance(5.0);
        match session.frame() {
            PlayerTick::EndOfMedia => break,
            PlayerTick::Ticked(now) => {
                while next < presses.len() && presses[next].0 <= now {
                    if !skip(next) {
                        session.on_input(presses[next].1, presses[next].0);
                    }
                    next += 1;
                }
            }
            PlayerTick::Idle => {}
        }
    }
    session.score().snapshot()
}

#[test]
fn single_note_end_to_end() {
    let chart = ChartDecoder::decode_str(SINGLE_TAP).unwrap();
    let (_, mut session) = new_session(3000.0);
    let ended = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ended);
    session.register_end_hook(move || counter.set(counter.get() + 1));

    session.select_chart(chart);
    session.start();
    for elapsed in (0..=1000).step_by(10) {
        session.on_tick(f64::from(elapsed));
    }
    assert_eq!(session.on_input(0, 1000.0), Some(JudgementTier::Perfect));
    for elapsed in (1010..=3000).step_by(10) {
        session.on_tick(f64::from(elapsed));
    }

    let score = session.score();
    assert_eq!(score.count(JudgementTier::Perfect), 1);
    assert_eq!(score.total_score(), 100);
    assert_eq!(score.combo(), 1);
    assert!(session.is_chart_cleared());

    session.on_end_of_media();
    session.on_end_of_media();
    assert_eq!(ended.get(), 1);
    assert_eq!(session.state(), SessionState::Ended);
}

#[test]
fn untouched_note_is_missed_once() {
    let chart = ChartDecoder::decode_str(SINGLE_TAP).unwrap();
    let (_, mut session) = new_session(3000.0);
    session.select_chart(chart);
    session.start();
    let auto_miss = session.layout().auto_miss_after_ms;

    session.on_tick(1000.0 + auto_miss);
    assert_eq!(session.score().count(JudgementTier::Miss), 0);
    session.on_tick(1000.0 + auto_miss + 1.0);
    session.on_tick(5000.0);
    assert_eq!(session.score().count(JudgementTier::Miss), 1);
    assert_eq!(session.on_input(0, 5000.0), None);
}

#[test]
fn frame_driven_autoplay_is_all_perfect() {
    let (time, mut session) = new_session(30_000.0);
    session.select_chart(dense_chart());
    let result = autoplay(&mut session, &time, 0.0, |_| false);

    assert_eq!(result.perfect, 200);
    assert_eq!(result.miss, 0);
    assert_eq!(result.max_combo, 200);
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(session.state(), SessionState::Ended);
    assert!(session.is_chart_cleared());
}

#[test]
fn skipped_notes_are_missed_by_the_sweep() {
    let (time, mut session) = new_session(30_000.0);
    session.select_chart(dense_chart());
    let result = autoplay(&mut session, &time, 100.0, |i| i % 10 == 9);

    assert_eq!(result.miss, 20);
    assert_eq!(result.great, 180);
    assert_eq!(result.perfect + result.great + result.good + result.bad + result.miss, 200);
    // The press 225 ms after a skipped note lands before that note's miss
    assert_eq!(result.max_combo, 10);
}

#[test]
fn replay_matches_first_run() {
    let (time, mut session) = new_session(30_000.0);
    let observed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&observed);
    session.score_mut().subscribe(move |s| sink.borrow_mut().push(s.total_score));

    assert!(session.select_chart(dense_chart()));
    let first = autoplay(&mut session, &time, 30.0, |i| i % 13 == 0);
    let first_events = observed.borrow().len();

    // Same song again keeps the loaded chart and replays from scratch
    assert!(!session.select_chart(dense_chart()));
    let second = autoplay(&mut session, &time, 30.0, |i| i % 13 == 0);

    assert_eq!(first, second);
    // reset + one notification per resolved note, for both runs
    assert_eq!(first_events, 1 + 200);
    assert_eq!(observed.borrow().len(), 2 * (1 + 200));
}

#[test]
fn early_press_gate_from_settings() {
    let mut setting = GameSetting::default();
    setting.control.ignore_early_presses = true;
    let time = ManualClock::new();
    let transport = SilentTransport::new(time.clone(), 10_000.0);
    let mut session = GameSession::new(setting, time, transport);

    session.select_chart(ChartDecoder::decode_str(SINGLE_TAP).unwrap());
    session.start();
    session.on_tick(0.0);
    assert_eq!(session.on_input(0, 100.0), None);
    assert_eq!(session.on_input(0, 990.0), Some(JudgementTier::Perfect));
}
