//! Verdict Policy: the threshold table and the severity-escalation rule.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use proctor_types::{
    ProctorError, ProctorResult, Verdict, VerdictAlert, VerdictSeverity, ViolationCounters,
    ViolationKind,
};
use serde::{Deserialize, Serialize};

use crate::messages;

/// Minimum count per violation kind that triggers an alert.
///
/// Every kind always has a threshold of at least one. Deserialization fills
/// missing kinds with their defaults and rejects unknown kinds and zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<ViolationKind, u64>",
    into = "BTreeMap<ViolationKind, u64>"
)]
pub struct ThresholdTable {
    thresholds: BTreeMap<ViolationKind, u64>,
}

impl ThresholdTable {
    pub fn default_threshold(kind: ViolationKind) -> u64 {
        match kind {
            ViolationKind::NoFace => 3,
            ViolationKind::MultipleFaces => 1,
            ViolationKind::LookingAway => 10,
            ViolationKind::TabSwitches => 5,
        }
    }

    pub fn get(&self, kind: ViolationKind) -> u64 {
        self.thresholds
            .get(&kind)
            .copied()
            .unwrap_or_else(|| Self::default_threshold(kind))
    }

    /// Threshold for a raw counter name, `None` if the name is not a kind.
    pub fn lookup(&self, name: &str) -> Option<(ViolationKind, u64)> {
        let kind = name.parse::<ViolationKind>().ok()?;
        Some((kind, self.get(kind)))
    }

    pub fn validate(&self) -> ProctorResult<()> {
        for (kind, threshold) in &self.thresholds {
            check_threshold(*kind, *threshold)?;
        }
        Ok(())
    }
}

fn check_threshold(kind: ViolationKind, threshold: u64) -> ProctorResult<()> {
    if threshold == 0 {
        return Err(ProctorError::Config(format!(
            "threshold for {kind} must be >= 1, got 0"
        )));
    }
    Ok(())
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            thresholds: ViolationKind::ALL
                .into_iter()
                .map(|kind| (kind, Self::default_threshold(kind)))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<ViolationKind, u64>> for ThresholdTable {
    type Error = ProctorError;

    fn try_from(overrides: BTreeMap<ViolationKind, u64>) -> Result<Self, Self::Error> {
        let mut table = ThresholdTable::default();
        table.thresholds.extend(overrides);
        table.validate()?;
        Ok(table)
    }
}

impl From<ThresholdTable> for BTreeMap<ViolationKind, u64> {
    fn from(table: ThresholdTable) -> Self {
        table.thresholds
    }
}

/// What evaluation does with a reported counter name that is not a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKindPolicy {
    /// Treat the name as having an unreachable threshold: it never fires.
    #[default]
    Ignore,
    /// Fail the evaluation with `InvalidViolationKind`.
    Reject,
}

/// Maps the alerts of a verdict to a session severity.
pub trait EscalationPolicy: Send + Sync + fmt::Debug {
    fn escalate(&self, alerts: &[VerdictAlert]) -> VerdictSeverity;
}

/// `High` as soon as any threshold alert fired.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryEscalation;

impl EscalationPolicy for BinaryEscalation {
    fn escalate(&self, alerts: &[VerdictAlert]) -> VerdictSeverity {
        if alerts.is_empty() {
            VerdictSeverity::Low
        } else {
            VerdictSeverity::High
        }
    }
}

/// Thresholds plus escalation; renders verdicts from counts.
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    thresholds: ThresholdTable,
    unknown_kinds: UnknownKindPolicy,
    escalation: Arc<dyn EscalationPolicy>,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self::new(ThresholdTable::default())
    }
}

impl VerdictPolicy {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            unknown_kinds: UnknownKindPolicy::default(),
            escalation: Arc::new(BinaryEscalation),
        }
    }

    pub fn with_unknown_kinds(mut self, policy: UnknownKindPolicy) -> Self {
        self.unknown_kinds = policy;
        self
    }

    pub fn with_escalation(mut self, escalation: Arc<dyn EscalationPolicy>) -> Self {
        self.escalation = escalation;
        self
    }

    /// Render a verdict from named counts, in the order given.
    pub fn verdict<'a, I>(&self, counts: I) -> ProctorResult<Verdict>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut alerts = Vec::new();
        for (name, count) in counts {
            let Some((kind, threshold)) = self.thresholds.lookup(name) else {
                match self.unknown_kinds {
                    UnknownKindPolicy::Ignore => continue,
                    UnknownKindPolicy::Reject => {
                        return Err(ProctorError::InvalidViolationKind(name.to_string()))
                    }
                }
            };
            if let Some(alert) = threshold_alert(kind, count, threshold) {
                alerts.push(alert);
            }
        }
        Ok(self.finish(alerts))
    }

    /// Render a verdict from a session's counters.
    pub fn verdict_for_counters(&self, counters: &ViolationCounters) -> Verdict {
        let alerts = counters
            .iter()
            .filter_map(|(kind, count)| threshold_alert(kind, count, self.thresholds.get(kind)))
            .collect();
        self.finish(alerts)
    }

    fn finish(&self, alerts: Vec<VerdictAlert>) -> Verdict {
        let severity = self.escalation.escalate(&alerts);
        Verdict::new(alerts, severity)
    }
}

fn threshold_alert(kind: ViolationKind, count: u64, threshold: u64) -> Option<VerdictAlert> {
    (count >= threshold).then(|| VerdictAlert {
        kind,
        count,
        threshold,
        message: messages::threshold_exceeded(kind.as_str()),
    })
}
