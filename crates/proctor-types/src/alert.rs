//! Frame-level alerts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signal::{GazeDirection, HeadPose, PerceptualSignal};
use crate::violation::ViolationKind;

/// What a single frame was flagged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NoFace,
    MultipleFaces,
    LookingAway,
    HeadRotation,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::NoFace => "no_face",
            AlertKind::MultipleFaces => "multiple_faces",
            AlertKind::LookingAway => "looking_away",
            AlertKind::HeadRotation => "head_rotation",
        }
    }

    /// Counter fed by this alert, if any.
    ///
    /// Head rotation is informational and has no counter.
    pub fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            AlertKind::NoFace => Some(ViolationKind::NoFace),
            AlertKind::MultipleFaces => Some(ViolationKind::MultipleFaces),
            AlertKind::LookingAway => Some(ViolationKind::LookingAway),
            AlertKind::HeadRotation => None,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed alert raised by one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        message: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            occurred_at,
        }
    }
}

/// Console form, e.g. `[HIGH] No face detected`.
impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.severity.as_str().to_uppercase(),
            self.message
        )
    }
}

/// Result of analyzing one frame: the signal plus the alerts it raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub timestamp: DateTime<Utc>,
    pub face_count: u32,
    pub gaze_direction: GazeDirection,
    pub head_pose: HeadPose,
    pub alerts: Vec<AlertEvent>,
}

impl FrameAnalysis {
    pub fn new(signal: &PerceptualSignal, alerts: Vec<AlertEvent>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            face_count: signal.face_count,
            gaze_direction: signal.gaze,
            head_pose: signal.head_pose,
            alerts,
        }
    }
}
