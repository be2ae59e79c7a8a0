use std::fmt;

use serde::{Deserialize, Serialize};

use crate::violation::ViolationKind;

/// Session-level severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSeverity {
    #[default]
    Low,
    High,
}

impl fmt::Display for VerdictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictSeverity::Low => f.write_str("low"),
            VerdictSeverity::High => f.write_str("high"),
        }
    }
}

/// A violation kind whose count reached its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictAlert {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub count: u64,
    pub threshold: u64,
    pub message: String,
}

/// Pass/fail outcome derived from counts and thresholds.
///
/// Never stored; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub alerts: Vec<VerdictAlert>,
    pub severity: VerdictSeverity,
    pub pass: bool,
}

impl Verdict {
    /// `pass` is derived from `alerts`.
    pub fn new(alerts: Vec<VerdictAlert>, severity: VerdictSeverity) -> Self {
        let pass = alerts.is_empty();
        Self {
            alerts,
            severity,
            pass,
        }
    }

    pub fn alert(&self, kind: ViolationKind) -> Option<&VerdictAlert> {
        self.alerts.iter().find(|a| a.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_alerts_pass() {
        let verdict = Verdict::new(Vec::new(), VerdictSeverity::Low);
        assert!(verdict.pass);
        assert_eq!(verdict.severity, VerdictSeverity::Low);
        assert!(verdict.alerts.is_empty());
    }

    #[test]
    fn wire_shape() {
        let verdict = Verdict::new(
            vec![VerdictAlert {
                kind: ViolationKind::MultipleFaces,
                count: 1,
                threshold: 1,
                message: "Multiple Faces threshold exceeded".into(),
            }],
            VerdictSeverity::High,
        );
        assert!(!verdict.pass);

        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(value["severity"], "high");
        assert_eq!(value["pass"], false);
        assert_eq!(value["alerts"][0]["type"], "multiple_faces");
        assert_eq!(value["alerts"][0]["threshold"], 1);
    }
}
