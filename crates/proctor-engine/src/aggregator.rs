//! Violation Aggregator: frame feedback on the fast path, verdicts on the slow
//! path.
//!
//! [`ViolationAggregator::record_frame`] classifies a frame, counts its
//! violations against the session and returns the frame's alerts at once,
//! without threshold logic. [`ViolationAggregator::evaluate`] applies the
//! [`VerdictPolicy`] to either a session's counters or counts reported by
//! the client.

use std::sync::Arc;
use std::time::Duration;

use proctor_types::{
    FrameAnalysis, PerceptualSignal, ProctorError, ProctorResult, RawCounts, SessionId, Verdict,
    ViolationKind,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::classifier::FrameClassifier;
use crate::config::{CountSource, ProctorConfig};
use crate::policy::VerdictPolicy;
use crate::store::SessionStore;

/// What a verdict is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationInput {
    /// Current counters of a live session.
    Session(SessionId),
    /// Counts supplied by the caller; nothing is stored.
    Raw(RawCounts),
}

impl From<SessionId> for EvaluationInput {
    fn from(id: SessionId) -> Self {
        EvaluationInput::Session(id)
    }
}

impl From<RawCounts> for EvaluationInput {
    fn from(counts: RawCounts) -> Self {
        EvaluationInput::Raw(counts)
    }
}

/// A "check violations" request as received from the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCheck {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub violations: RawCounts,
}

pub struct ViolationAggregator {
    classifier: FrameClassifier,
    policy: VerdictPolicy,
    count_source: CountSource,
    sweep_interval: Duration,
    store: Arc<SessionStore>,
}

impl ViolationAggregator {
    pub fn new(config: &ProctorConfig, store: Arc<SessionStore>) -> Self {
        Self {
            classifier: FrameClassifier::new(config.rotation),
            policy: config.verdict_policy(),
            count_source: config.count_source,
            sweep_interval: config.sweep_interval(),
            store,
        }
    }

    /// Aggregator over a fresh store using the configured TTL.
    pub fn from_config(config: &ProctorConfig) -> Self {
        Self::new(config, Arc::new(SessionStore::new(config.session_ttl())))
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Start evicting abandoned sessions at the configured sweep interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_sweeper(&self) -> ProctorResult<JoinHandle<()>> {
        self.store.spawn_sweeper(self.sweep_interval)
    }

    /// Classify a frame without touching any session.
    pub fn analyze(&self, signal: &PerceptualSignal) -> ProctorResult<FrameAnalysis> {
        signal.validate()?;
        Ok(self.classifier.analyze(signal))
    }

    /// Classify a frame and count its violations against the session.
    ///
    /// Head-rotation alerts are returned but not counted.
    #[instrument(skip(self, session_id, signal), fields(session_id = %session_id))]
    pub fn record_frame(
        &self,
        session_id: &SessionId,
        signal: &PerceptualSignal,
    ) -> ProctorResult<FrameAnalysis> {
        let analysis = self.analyze(signal)?;
        let kinds = analysis.alerts.iter().filter_map(|a| a.kind.violation_kind());
        let counters = self.store.record_observation(session_id, kinds);

        debug!(
            session_id = %session_id,
            alerts = analysis.alerts.len(),
            violations = counters.total(),
            "Frame recorded"
        );
        Ok(analysis)
    }

    /// Count one tab switch observed server-side.
    pub fn record_tab_switch(&self, session_id: &SessionId) -> u64 {
        self.store
            .increment(session_id, ViolationKind::TabSwitches, 1)
    }

    /// Render a verdict from a session's counters or from raw counts.
    #[instrument(skip(self, input))]
    pub fn evaluate(&self, input: impl Into<EvaluationInput>) -> ProctorResult<Verdict> {
        let verdict = match input.into() {
            EvaluationInput::Session(id) => {
                let counters = self.store.snapshot(&id)?;
                let verdict = self.policy.verdict_for_counters(&counters);
                if !verdict.pass {
                    warn!(
                        session_id = %id,
                        severity = %verdict.severity,
                        alerts = verdict.alerts.len(),
                        "Session failed integrity check"
                    );
                }
                verdict
            }
            EvaluationInput::Raw(counts) => {
                let verdict = self.policy.verdict(counts.iter()).inspect_err(|e| {
                    warn!(error = %e, "Rejected reported violation counts");
                })?;
                if !verdict.pass {
                    debug!(
                        severity = %verdict.severity,
                        alerts = verdict.alerts.len(),
                        "Reported counts exceed thresholds"
                    );
                }
                verdict
            }
        };
        Ok(verdict)
    }

    /// The boundary "check violations" operation.
    ///
    /// With [`CountSource::ClientReported`] the reported counts are evaluated
    /// as-is. With [`CountSource::ServerAuthoritative`] a session id is
    /// required, the reported tab-switch total is folded into the session and
    /// every other reported count is ignored.
    pub fn check_violations(&self, check: ViolationCheck) -> ProctorResult<Verdict> {
        match self.count_source {
            CountSource::ClientReported => self.evaluate(check.violations),
            CountSource::ServerAuthoritative => {
                let session_id = check.session_id.ok_or_else(|| {
                    ProctorError::InvalidInput(
                        "session_id is required when counts are server-authoritative".to_string(),
                    )
                })?;
                if let Some(total) = check.violations.get(ViolationKind::TabSwitches.as_str()) {
                    self.store
                        .raise_to(&session_id, ViolationKind::TabSwitches, total)?;
                }
                let ignored = check
                    .violations
                    .iter()
                    .filter(|(name, _)| *name != ViolationKind::TabSwitches.as_str())
                    .count();
                if ignored > 0 {
                    debug!(session_id = %session_id, ignored, "Ignoring client-reported counts");
                }
                self.evaluate(session_id)
            }
        }
    }

    /// Close a session and return its final verdict.
    #[instrument(skip(self, session_id), fields(session_id = %session_id))]
    pub fn finish_session(&self, session_id: &SessionId) -> ProctorResult<Verdict> {
        let counters = self.store.close(session_id)?;
        Ok(self.policy.verdict_for_counters(&counters))
    }
}
