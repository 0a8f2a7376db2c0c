use std::path::Path;

use anyhow::{Context, Result};
use beatrush_rule::{JudgeWindowTable, ScoreRule};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::key_bindings::ControlSetting;

/// Clamp a float, replacing non-finite values with `fallback`.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Frame and audio latency timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct TimingSetting {
    pub frame_per_s: f64,
    /// Audio output latency compensation: audio is started this many ms
    /// before the pre-roll ends.
    pub delay_correction_ms: f64,
}

impl Default for TimingSetting {
    fn default() -> Self {
        Self {
            frame_per_s: 100.0,
            delay_correction_ms: 300.0,
        }
    }
}

impl TimingSetting {
    pub fn frame_time_ms(&self) -> f64 {
        1000.0 / self.frame_per_s
    }
}

/// Note fall speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ObjectMotionSetting {
    pub fall_down_y_per_s: f64,
}

impl Default for ObjectMotionSetting {
    fn default() -> Self {
        Self {
            fall_down_y_per_s: 600.0,
        }
    }
}

impl ObjectMotionSetting {
    pub fn fall_down_y_per_ms(&self) -> f64 {
        self.fall_down_y_per_s / 1000.0
    }

    pub fn fall_down_y_per_frame(&self, timing: &TimingSetting) -> f64 {
        self.fall_down_y_per_s / timing.frame_per_s
    }
}

/// Song volume ratio (0.0 - 1.0), applied to the transport on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AudioSetting {
    pub song_volume_ratio: f64,
}

impl Default for AudioSetting {
    fn default() -> Self {
        Self {
            song_volume_ratio: 0.1,
        }
    }
}

/// Track viewport and the margins around it, in track-local Y units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct LayoutSetting {
    /// Top of the visible track
    pub top_y: f64,
    /// Bottom of the visible track
    pub bottom_y: f64,
    /// Space above `top_y` where notes are spawned
    pub before_top_y: f64,
    /// Space below `bottom_y` before notes are despawned
    pub after_bottom_y: f64,
    /// Distance of the judgement line above `bottom_y`
    pub before_bottom_y: f64,
}

impl Default for LayoutSetting {
    fn default() -> Self {
        Self {
            top_y: 0.0,
            bottom_y: 1080.0,
            before_top_y: 500.0,
            after_bottom_y: 100.0,
            before_bottom_y: 100.0,
        }
    }
}

/// Complete game settings (settings.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct GameSetting {
    pub timing: TimingSetting,
    pub object_motion: ObjectMotionSetting,
    pub audio: AudioSetting,
    pub judgment_window: JudgeWindowTable,
    pub score: ScoreRule,
    pub layout: LayoutSetting,
    pub control: ControlSetting,
}

impl GameSetting {
    /// Clamp every value into a usable range.
    pub fn validate(&mut self) {
        let timing = TimingSetting::default();
        self.timing.frame_per_s = clamp_or(self.timing.frame_per_s, 1.0, 1000.0, timing.frame_per_s);
        self.timing.delay_correction_ms =
            clamp_or(self.timing.delay_correction_ms, 0.0, 2000.0, timing.delay_correction_ms);

        let motion = ObjectMotionSetting::default();
        self.object_motion.fall_down_y_per_s = clamp_or(
            self.object_motion.fall_down_y_per_s,
            1.0,
            100_000.0,
            motion.fall_down_y_per_s,
        );

        let audio = AudioSetting::default();
        self.audio.song_volume_ratio = clamp_or(self.audio.song_volume_ratio, 0.0, 1.0, audio.song_volume_ratio);

        if !self.judgment_window.is_nested() {
            warn!("Judgement windows are not nested, falling back to defaults");
            self.judgment_window = JudgeWindowTable::default();
        }

        self.score.combo_bonus_interval = self.score.combo_bonus_interval.max(1);

        let layout = LayoutSetting::default();
        if !(self.layout.top_y.is_finite()
            && self.layout.bottom_y.is_finite()
            && self.layout.bottom_y > self.layout.top_y)
        {
            self.layout.top_y = layout.top_y;
            self.layout.bottom_y = layout.bottom_y;
        }
        self.layout.before_top_y = clamp_or(self.layout.before_top_y, 0.0, 100_000.0, layout.before_top_y);
        self.layout.after_bottom_y =
            clamp_or(self.layout.after_bottom_y, 0.0, 100_000.0, layout.after_bottom_y);
        let height = self.layout.bottom_y - self.layout.top_y;
        self.layout.before_bottom_y =
            clamp_or(self.layout.before_bottom_y, 0.0, height, layout.before_bottom_y.min(height));

        self.control.key_bindings.validate();
    }

    /// Read settings from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        let mut setting: GameSetting = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse settings {}", path.display()))?;
        setting.validate();
        Ok(setting)
    }

    /// Write settings to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings {}", path.display()))?;
        Ok(())
    }
}
