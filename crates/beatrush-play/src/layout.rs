use beatrush_config::GameSetting;

use crate::track_runtime::TrackTiming;

/// Vertical geometry of one track and the note timings derived from it.
///
/// Notes spawn at `start_y` above the visible area, cross the judgement line
/// at their timestamp and leave at `end_y` below it. Positions are converted
/// to times with the configured fall speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    pub top_y: f64,
    pub bottom_y: f64,
    pub start_y: f64,
    pub end_y: f64,
    pub judgement_line_y: f64,
    /// Where a note enters the earliest (Bad) window
    pub scoring_window_start_y: f64,
    pub fall_per_ms: f64,
    pub frame_per_s: f64,
    /// Time from spawn to the judgement line
    pub spawn_lead_ms: f64,
    /// Time from the judgement line to leaving the track
    pub despawn_after_ms: f64,
    /// Time past the judgement line after which a note is missed
    pub auto_miss_after_ms: f64,
}

impl TrackLayout {
    pub fn new(top_y: f64, bottom_y: f64, setting: &GameSetting) -> Self {
        let margins = &setting.layout;
        let fall_per_ms = setting.object_motion.fall_down_y_per_ms();
        let window = &setting.judgment_window;

        let start_y = top_y - margins.before_top_y;
        let end_y = bottom_y + margins.after_bottom_y;
        let judgement_line_y = bottom_y - margins.before_bottom_y;
        let despawn_after_ms = (end_y - judgement_line_y) / fall_per_ms;

        Self {
            top_y,
            bottom_y,
            start_y,
            end_y,
            judgement_line_y,
            scoring_window_start_y: judgement_line_y + fall_per_ms * window.earliest_ms(),
            fall_per_ms,
            frame_per_s: setting.timing.frame_per_s,
            spawn_lead_ms: (judgement_line_y - start_y) / fall_per_ms,
            despawn_after_ms,
            auto_miss_after_ms: despawn_after_ms.max(window.latest_ms()),
        }
    }

    /// Layout for the configured viewport.
    pub fn from_setting(setting: &GameSetting) -> Self {
        Self::new(setting.layout.top_y, setting.layout.bottom_y, setting)
    }

    pub fn timing(&self) -> TrackTiming {
        TrackTiming {
            spawn_lead_ms: self.spawn_lead_ms,
            auto_miss_after_ms: self.auto_miss_after_ms,
        }
    }

    /// Frames a note takes to fall from `start_y` to `end_y`.
    pub fn fall_frames(&self) -> f64 {
        (self.end_y - self.start_y) / (self.fall_per_ms * 1000.0 / self.frame_per_s)
    }

    /// Y of a note with `timestamp_ms` at chart time `now_ms`.
    ///
    /// Display helper for renderers; judgement never reads positions.
    pub fn note_y(&self, timestamp_ms: f64, now_ms: f64) -> f64 {
        self.judgement_line_y - (timestamp_ms - now_ms) * self.fall_per_ms
    }

    /// Whether a note at `y` is inside the visible track. Display helper.
    pub fn is_visible(&self, y: f64) -> bool {
        (self.top_y..=self.bottom_y).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_layout() {
        let layout = TrackLayout::from_setting(&GameSetting::default());
        assert_eq!(layout.start_y, -500.0);
        assert_eq!(layout.end_y, 1180.0);
        assert_eq!(layout.judgement_line_y, 980.0);
        assert!(approx(layout.fall_per_ms, 0.6));
        assert!(approx(layout.spawn_lead_ms, 1480.0 / 0.6));
        assert!(approx(layout.despawn_after_ms, 200.0 / 0.6));
        // 333 ms of fall past the line outlasts the 300 ms late window
        assert!(approx(layout.auto_miss_after_ms, layout.despawn_after_ms));
        assert!(approx(layout.scoring_window_start_y, 980.0 - 480.0));
        assert!(approx(layout.fall_frames(), 1680.0 / 6.0));
    }

    #[test]
    fn auto_miss_never_cuts_the_late_window() {
        let mut setting = GameSetting::default();
        setting.layout.after_bottom_y = 0.0;
        let layout = TrackLayout::from_setting(&setting);
        assert!(approx(layout.despawn_after_ms, 100.0 / 0.6));
        assert_eq!(layout.auto_miss_after_ms, 300.0);
    }

    #[test]
    fn note_y_reaches_judgement_line_at_timestamp() {
        let layout = TrackLayout::from_setting(&GameSetting::default());
        assert!(approx(layout.note_y(1000.0, 1000.0), layout.judgement_line_y));
        assert!(approx(layout.note_y(1000.0, 1000.0 - layout.spawn_lead_ms), layout.start_y));
        assert!(layout.is_visible(layout.note_y(1000.0, 500.0)));
        assert!(!layout.is_visible(layout.start_y));
    }
}
