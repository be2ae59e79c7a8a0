//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. Loading validates; an invalid file is rejected as a whole.

use std::time::Duration;

use proctor_types::{ProctorError, ProctorResult};
use serde::{Deserialize, Serialize};

use crate::classifier::RotationLimits;
use crate::policy::{ThresholdTable, UnknownKindPolicy, VerdictPolicy};

/// Where the counts behind a "check violations" request come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSource {
    /// Evaluate the counts the client reports.
    #[default]
    ClientReported,
    /// Evaluate server-side session counters. Only the client's tab-switch
    /// total is folded in, since the server cannot observe it.
    ServerAuthoritative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctorConfig {
    #[serde(default)]
    pub thresholds: ThresholdTable,

    /// Idle time after which a session is evicted.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Period of the background eviction sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default)]
    pub rotation: RotationLimits,

    #[serde(default)]
    pub unknown_kinds: UnknownKindPolicy,

    #[serde(default)]
    pub count_source: CountSource,
}

impl Default for ProctorConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            session_ttl_secs: default_session_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            rotation: RotationLimits::default(),
            unknown_kinds: UnknownKindPolicy::default(),
            count_source: CountSource::default(),
        }
    }
}

const fn default_session_ttl_secs() -> u64 {
    60 * 60
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

impl ProctorConfig {
    pub fn validate(&self) -> ProctorResult<()> {
        self.thresholds.validate()?;
        if self.session_ttl_secs == 0 {
            return Err(ProctorError::Config(
                "session_ttl_secs must be > 0".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ProctorError::Config(
                "sweep_interval_secs must be > 0".to_string(),
            ));
        }
        for (name, limit) in [
            ("max_yaw_deg", self.rotation.max_yaw_deg),
            ("max_pitch_deg", self.rotation.max_pitch_deg),
        ] {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ProctorError::Config(format!(
                    "rotation.{name} must be a positive number, got {limit}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ProctorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProctorError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn verdict_policy(&self) -> VerdictPolicy {
        VerdictPolicy::new(self.thresholds.clone()).with_unknown_kinds(self.unknown_kinds)
    }
}
