use std::fmt;

use serde::{Deserialize, Serialize};

/// Fraction of target at or above which a node is at risk rather than behind.
pub const AT_RISK_RATIO: f64 = 0.9;

/// Progress of a node's value against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    OnTrack,
    AtRisk,
    Behind,
}

impl Status {
    /// `value >= target` is on track, `value >= 0.9 * target` at risk,
    /// anything lower is behind.
    pub fn classify(value: f64, target: f64) -> Self {
        if value >= target {
            Status::OnTrack
        } else if value >= AT_RISK_RATIO * target {
            Status::AtRisk
        } else {
            Status::Behind
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::OnTrack => "on track",
            Status::AtRisk => "at risk",
            Status::Behind => "behind",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(Status::classify(100.0, 100.0), Status::OnTrack);
        assert_eq!(Status::classify(120.0, 100.0), Status::OnTrack);
        assert_eq!(Status::classify(90.0, 100.0), Status::AtRisk);
        assert_eq!(Status::classify(99.9, 100.0), Status::AtRisk);
        assert_eq!(Status::classify(89.9, 100.0), Status::Behind);
    }

    #[test]
    fn test_zero_target() {
        assert_eq!(Status::classify(0.0, 0.0), Status::OnTrack);
        assert_eq!(Status::classify(-1.0, 0.0), Status::Behind);
    }

    #[test]
    fn test_negative_target_applies_same_rule() {
        assert_eq!(Status::classify(-95.0, -100.0), Status::OnTrack);
        assert_eq!(Status::classify(-105.0, -100.0), Status::Behind);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Status::AtRisk).unwrap(), "\"at_risk\"");
    }
}
