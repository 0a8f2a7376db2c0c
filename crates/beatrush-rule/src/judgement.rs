use serde::{Deserialize, Serialize};

/// Discrete outcome of judging one input against one note.
///
/// Variants are ordered by window width, Perfect being the narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JudgementTier {
    Perfect,
    Great,
    Good,
    Bad,
    Miss,
}

impl JudgementTier {
    pub const ALL: [JudgementTier; 5] = [
        JudgementTier::Perfect,
        JudgementTier::Great,
        JudgementTier::Good,
        JudgementTier::Bad,
        JudgementTier::Miss,
    ];

    /// Tiers that have a timing window, tightest first. Miss is whatever falls outside.
    pub const WINDOWED: [JudgementTier; 4] = [
        JudgementTier::Perfect,
        JudgementTier::Great,
        JudgementTier::Good,
        JudgementTier::Bad,
    ];

    /// Base score awarded before combo bonus.
    pub fn base_score(self) -> u32 {
        match self {
            Self::Perfect => 100,
            Self::Great => 70,
            Self::Good => 30,
            Self::Bad => 10,
            Self::Miss => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Great => "Great",
            Self::Good => "Good",
            Self::Bad => "Bad",
            Self::Miss => "Miss",
        }
    }

    pub fn is_combo_break(self) -> bool {
        matches!(self, Self::Bad | Self::Miss)
    }

    /// Position in `ALL`, used for per-tier counters.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for JudgementTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_scores() {
        let scores: Vec<u32> = JudgementTier::ALL.iter().map(|t| t.base_score()).collect();
        assert_eq!(scores, vec![100, 70, 30, 10, 0]);
    }

    #[test]
    fn combo_breaks_only_on_bad_and_miss() {
        assert!(!JudgementTier::Perfect.is_combo_break());
        assert!(!JudgementTier::Great.is_combo_break());
        assert!(!JudgementTier::Good.is_combo_break());
        assert!(JudgementTier::Bad.is_combo_break());
        assert!(JudgementTier::Miss.is_combo_break());
    }

    #[test]
    fn ordered_tightest_first() {
        assert!(JudgementTier::Perfect < JudgementTier::Great);
        assert!(JudgementTier::Bad < JudgementTier::Miss);
        for (i, tier) in JudgementTier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(JudgementTier::Great.to_string(), "Great");
    }
}
