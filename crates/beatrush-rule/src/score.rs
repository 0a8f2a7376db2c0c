use log::trace;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;
use crate::judgement::JudgementTier;

/// Combo bonus rule: every `combo_bonus_interval` consecutive hits add one
/// bonus point per judgement, capped at `combo_bonus_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoreRule {
    pub combo_bonus_interval: u32,
    pub combo_bonus_max: u32,
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self {
            combo_bonus_interval: 10,
            combo_bonus_max: 30,
        }
    }
}

impl ScoreRule {
    /// Bonus for a judgement made while holding `combo`.
    pub fn combo_bonus(&self, combo: u32) -> u32 {
        (combo / self.combo_bonus_interval.max(1)).min(self.combo_bonus_max)
    }
}

/// Point-in-time copy of the accumulator, for display and result screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub total_score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
    pub accuracy: f64,
    pub grade: Grade,
}

impl std::fmt::Display for ScoreSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Score{{total={}, combo={}, maxCombo={}, perfect={}, great={}, good={}, bad={}, miss={}, accuracy={:.2}%, grade={}}}",
            self.total_score,
            self.combo,
            self.max_combo,
            self.perfect,
            self.great,
            self.good,
            self.bad,
            self.miss,
            self.accuracy,
            self.grade
        )
    }
}

/// Handle returned by [`ScoreAccumulator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&ScoreSnapshot)>;

/// Run score state: total score, combo, max combo and per-tier counts.
///
/// `add_judgement` is the only mutation besides `reset`. Subscribers are
/// notified after each of them with the resulting snapshot.
pub struct ScoreAccumulator {
    rule: ScoreRule,
    total_score: u64,
    combo: u32,
    max_combo: u32,
    /// Indexed by `JudgementTier::index()`
    counts: [u32; 5],
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
}

impl ScoreAccumulator {
    pub fn new(rule: ScoreRule) -> Self {
        Self {
            rule,
            total_score: 0,
            combo: 0,
            max_combo: 0,
            counts: [0; 5],
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    pub fn rule(&self) -> &ScoreRule {
        &self.rule
    }

    /// Score one judgement.
    ///
    /// The combo bonus is computed from the combo *before* this judgement.
    pub fn add_judgement(&mut self, tier: JudgementTier) {
        let awarded = tier.base_score() + self.rule.combo_bonus(self.combo);
        self.total_score += u64::from(awarded);

        if tier.is_combo_break() {
            self.combo = 0;
        } else {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        }
        self.counts[tier.index()] += 1;

        trace!("{tier}: +{awarded} (total {}, combo {})", self.total_score, self.combo);
        self.notify();
    }

    /// Zero every counter. Subscribers are kept.
    pub fn reset(&mut self) {
        self.total_score = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.counts = [0; 5];
        self.notify();
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn count(&self, tier: JudgementTier) -> u32 {
        self.counts[tier.index()]
    }

    /// Number of resolved notes (all five tiers).
    pub fn total_hits(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Weighted accuracy in percent. 100.0 before any note is resolved.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_hits();
        if total == 0 {
            return 100.0;
        }
        let weighted: u64 = JudgementTier::ALL
            .iter()
            .map(|t| u64::from(self.count(*t)) * u64::from(t.base_score()))
            .sum();
        weighted as f64 / (f64::from(total) * 100.0) * 100.0
    }

    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy())
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            total_score: self.total_score,
            combo: self.combo,
            max_combo: self.max_combo,
            perfect: self.count(JudgementTier::Perfect),
            great: self.count(JudgementTier::Great),
            good: self.count(JudgementTier::Good),
            bad: self.count(JudgementTier::Bad),
            miss: self.count(JudgementTier::Miss),
            accuracy: self.accuracy(),
            grade: self.grade(),
        }
    }

    /// Register a change observer. It is not called on registration.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ScoreSnapshot) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
    }
}

impl Default for ScoreAccumulator {
    fn default() -> Self {
        Self::new(ScoreRule::default())
    }
}

impl std::fmt::Debug for ScoreAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreAccumulator")
            .field("rule", &self.rule)
            .field("total_score", &self.total_score)
            .field("combo", &self.combo)
            .field("max_combo", &self.max_combo)
            .field("counts", &self.counts)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
