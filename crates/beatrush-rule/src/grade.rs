use serde::{Deserialize, Serialize};

/// Letter grade derived from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Grade for an accuracy percentage (0-100).
    /// S >= 95, A >= 90, B >= 80, C >= 70, otherwise D.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 95.0 {
            Self::S
        } else if accuracy >= 90.0 {
            Self::A
        } else if accuracy >= 80.0 {
            Self::B
        } else if accuracy >= 70.0 {
            Self::C
        } else {
            Self::D
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(Grade::from_accuracy(100.0), Grade::S);
        assert_eq!(Grade::from_accuracy(95.0), Grade::S);
        assert_eq!(Grade::from_accuracy(94.99), Grade::A);
        assert_eq!(Grade::from_accuracy(90.0), Grade::A);
        assert_eq!(Grade::from_accuracy(80.0), Grade::B);
        assert_eq!(Grade::from_accuracy(70.0), Grade::C);
        assert_eq!(Grade::from_accuracy(69.99), Grade::D);
        assert_eq!(Grade::from_accuracy(0.0), Grade::D);
    }

    #[test]
    fn display() {
        assert_eq!(Grade::S.to_string(), "S");
        assert_eq!(Grade::D.as_str(), "D");
    }
}
