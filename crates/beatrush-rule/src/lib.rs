// Judge windows, judgement tiers, score accumulation and grading

mod grade;
mod judge_window;
mod judgement;
mod score;

pub use grade::Grade;
pub use judge_window::{JudgeWindow, JudgeWindowTable};
pub use judgement::JudgementTier;
pub use score::{ScoreAccumulator, ScoreRule, ScoreSnapshot, SubscriberId};
