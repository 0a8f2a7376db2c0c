use serde::{Deserialize, Serialize};

use crate::judgement::JudgementTier;

/// A judge window `[min_ms, max_ms]` on the signed timing offset.
///
/// Offset is `actual - expected`: negative is early, positive is late.
/// Bounds are inclusive and independent, so early and late tolerance may differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeWindow {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl JudgeWindow {
    pub const fn new(min_ms: f64, max_ms: f64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn contains(&self, offset_ms: f64) -> bool {
        offset_ms >= self.min_ms && offset_ms <= self.max_ms
    }

    /// Whether `self` lies entirely inside `outer`.
    fn within(&self, outer: &JudgeWindow) -> bool {
        self.min_ms >= outer.min_ms && self.max_ms <= outer.max_ms
    }
}

/// Judge windows for every windowed tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindowTable {
    pub perfect: JudgeWindow,
    pub great: JudgeWindow,
    pub good: JudgeWindow,
    pub bad: JudgeWindow,
}

impl Default for JudgeWindowTable {
    fn default() -> Self {
        Self {
            perfect: JudgeWindow::new(-70.0, 70.0),
            great: JudgeWindow::new(-200.0, 150.0),
            good: JudgeWindow::new(-400.0, 200.0),
            bad: JudgeWindow::new(-800.0, 300.0),
        }
    }
}

impl JudgeWindowTable {
    /// Window of a tier; `None` for Miss.
    pub fn window(&self, tier: JudgementTier) -> Option<&JudgeWindow> {
        match tier {
            JudgementTier::Perfect => Some(&self.perfect),
            JudgementTier::Great => Some(&self.great),
            JudgementTier::Good => Some(&self.good),
            JudgementTier::Bad => Some(&self.bad),
            JudgementTier::Miss => None,
        }
    }

    /// Classify a timing offset.
    ///
    /// Windows are scanned tightest first and the first match wins, so nested
    /// windows with different early/late widths resolve deterministically.
    /// Anything outside every window (including NaN) is a Miss.
    pub fn classify(&self, offset_ms: f64) -> JudgementTier {
        JudgementTier::WINDOWED
            .into_iter()
            .find(|&tier| self.window(tier).is_some_and(|w| w.contains(offset_ms)))
            .unwrap_or(JudgementTier::Miss)
    }

    /// Earliest offset that still scores (Bad window early bound).
    pub fn earliest_ms(&self) -> f64 {
        self.bad.min_ms
    }

    /// Latest offset that still scores (Bad window late bound).
    pub fn latest_ms(&self) -> f64 {
        self.bad.max_ms
    }

    /// Whether every window is well-formed and sits inside the next wider one.
    pub fn is_nested(&self) -> bool {
        let windows = [self.perfect, self.great, self.good, self.bad];
        windows
            .iter()
            .all(|w| w.min_ms.is_finite() && w.max_ms.is_finite() && w.min_ms <= w.max_ms)
            && windows.windows(2).all(|pair| pair[0].within(&pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_windows() {
        let t = JudgeWindowTable::default();
        assert_eq!(t.classify(0.0), JudgementTier::Perfect);
        assert_eq!(t.classify(70.0), JudgementTier::Perfect);
        assert_eq!(t.classify(-70.0), JudgementTier::Perfect);
        assert_eq!(t.classify(70.1), JudgementTier::Great);
        assert_eq!(t.classify(-200.0), JudgementTier::Great);
        assert_eq!(t.classify(150.0), JudgementTier::Great);
        assert_eq!(t.classify(150.5), JudgementTier::Good);
        assert_eq!(t.classify(-400.0), JudgementTier::Good);
        assert_eq!(t.classify(200.0), JudgementTier::Good);
        assert_eq!(t.classify(-800.0), JudgementTier::Bad);
        assert_eq!(t.classify(300.0), JudgementTier::Bad);
        assert_eq!(t.classify(300.01), JudgementTier::Miss);
        assert_eq!(t.classify(-800.01), JudgementTier::Miss);
    }

    #[test]
    fn asymmetric_late_side_is_narrower() {
        let t = JudgeWindowTable::default();
        // 180 ms early is still Great, 180 ms late is already Good
        assert_eq!(t.classify(-180.0), JudgementTier::Great);
        assert_eq!(t.classify(180.0), JudgementTier::Good);
    }

    #[test]
    fn non_finite_offsets_are_miss() {
        let t = JudgeWindowTable::default();
        assert_eq!(t.classify(f64::INFINITY), JudgementTier::Miss);
        assert_eq!(t.classify(f64::NEG_INFINITY), JudgementTier::Miss);
        assert_eq!(t.classify(f64::NAN), JudgementTier::Miss);
    }

    #[test]
    fn tightest_first_wins_for_overlapping_windows() {
        // Great overlaps Perfect on the late side; the tighter tier must win.
        let t = JudgeWindowTable {
            perfect: JudgeWindow::new(-10.0, 50.0),
            great: JudgeWindow::new(-30.0, 40.0),
            ..Default::default()
        };
        assert_eq!(t.classify(45.0), JudgementTier::Perfect);
        assert_eq!(t.classify(-20.0), JudgementTier::Great);
        assert!(!t.is_nested());
    }

    #[test]
    fn default_table_is_nested() {
        assert!(JudgeWindowTable::default().is_nested());
        assert_eq!(JudgeWindowTable::default().earliest_ms(), -800.0);
        assert_eq!(JudgeWindowTable::default().latest_ms(), 300.0);
    }

    #[test]
    fn inverted_window_is_not_nested() {
        let t = JudgeWindowTable {
            good: JudgeWindow::new(100.0, -100.0),
            ..Default::default()
        };
        assert!(!t.is_nested());
    }

    #[test]
    fn deserializes_partial_table() {
        let t: JudgeWindowTable =
            serde_json::from_str(r#"{"perfect":{"minMs":-50.0,"maxMs":40.0}}"#).unwrap();
        assert_eq!(t.perfect, JudgeWindow::new(-50.0, 40.0));
        assert_eq!(t.bad, JudgeWindowTable::default().bad);
    }

    proptest! {
        #[test]
        fn classify_is_deterministic_and_consistent(offset in -2000.0f64..2000.0) {
            let t = JudgeWindowTable::default();
            let tier = t.classify(offset);
            prop_assert_eq!(tier, t.classify(offset));
            match t.window(tier) {
                Some(w) => prop_assert!(w.contains(offset)),
                None => prop_assert!(!t.bad.contains(offset)),
            }
            // No tighter window contains the offset
            for tighter in JudgementTier::WINDOWED.iter().filter(|&&x| x < tier) {
                prop_assert!(!t.window(*tighter).unwrap().contains(offset));
            }
        }
    }
}
