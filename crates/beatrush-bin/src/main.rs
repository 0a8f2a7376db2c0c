// beatrush — headless runner.
//
// Plays a chart with a scripted player on a simulated clock and prints the
// final score as JSON.

mod autoplay;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use beatrush_config::GameSetting;
use beatrush_model::{ChartDecoder, SongMetadata};
use beatrush_play::{GameSession, TrackLayout};
use beatrush_rule::ScoreSnapshot;
use beatrush_timing::{ManualClock, SilentTransport};
use clap::Parser;
use log::info;
use serde::Serialize;

use autoplay::{AutoplayOptions, Autoplayer};

#[derive(Parser, Debug)]
#[command(name = "beatrush", about = "Headless falling-note chart runner")]
struct Args {
    /// Chart JSON file to play.
    #[arg(long, required_unless_present = "list")]
    chart: Option<PathBuf>,

    /// Settings JSON file.
    #[arg(long, env = "BEATRUSH_CONFIG")]
    config: Option<PathBuf>,

    /// Uniform press timing jitter in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    jitter_ms: f64,

    /// Probability of leaving a note unpressed (0.0 - 1.0).
    #[arg(long, default_value_t = 0.0)]
    miss_rate: f64,

    /// Random seed for jitter and misses.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulation frame rate, overrides the settings file.
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Print the metadata of every chart in a directory and exit.
    #[arg(long)]
    list: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    song: &'a SongMetadata,
    cleared: bool,
    result: ScoreSnapshot,
}

fn load_setting(args: &Args) -> Result<GameSetting> {
    let mut setting = match &args.config {
        Some(path) => GameSetting::read(path)?,
        None => GameSetting::default(),
    };
    if let Some(rate) = args.frame_rate {
        setting.timing.frame_per_s = rate;
        setting.validate();
    }
    Ok(setting)
}

fn list_charts(dir: &Path) -> Result<()> {
    for metadata in ChartDecoder::scan_metadata(dir)? {
        println!(
            "{}\t{}\t{}",
            metadata.song_name,
            metadata.song_author,
            metadata.length_display()
        );
    }
    Ok(())
}

fn play_chart(path: &Path, args: &Args) -> Result<()> {
    let setting = load_setting(args)?;
    let chart = ChartDecoder::decode(path)?;
    if chart.is_empty() {
        bail!("chart {} has no notes", path.display());
    }

    // Keep the song running until the last note has been resolved
    let layout = TrackLayout::from_setting(&setting);
    let tail_ms = chart.last_note_time_ms() + layout.auto_miss_after_ms + 1000.0;
    let length_ms = chart.metadata().length_ms().unwrap_or(0.0).max(tail_ms);
    let frame_ms = setting.timing.frame_time_ms();

    let clock = ManualClock::new();
    let transport = SilentTransport::new(clock.clone(), length_ms);
    let mut session = GameSession::new(setting, clock.clone(), transport);
    session.register_end_hook(|| info!("End of song"));
    session.select_chart(chart.clone());

    let options = AutoplayOptions {
        jitter_ms: args.jitter_ms,
        miss_rate: args.miss_rate,
        seed: args.seed,
    };
    let mut autoplayer = Autoplayer::new(&chart, &options)?;
    info!(
        "Playing '{}' ({} notes, {} presses, {length_ms:.0} ms)",
        chart.song_name(),
        chart.note_count(),
        autoplayer.press_count()
    );
    let result = autoplayer.run(&mut session, &clock, frame_ms)?;

    let report = RunReport {
        song: chart.metadata(),
        cleared: session.is_chart_cleared(),
        result,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize result")?
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Some(dir) = &args.list {
        return list_charts(dir);
    }
    match &args.chart {
        Some(path) => play_chart(path, &args),
        None => bail!("no chart given"),
    }
}
