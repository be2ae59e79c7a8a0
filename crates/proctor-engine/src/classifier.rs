//! Frame Classifier: one perceptual signal in, zero to three alerts out.
//!
//! Rule groups are independent of each other:
//!
//! 1. face presence: `no_face` (no face) or `multiple_faces` (more than one),
//!    never both
//! 2. gaze: `looking_away` for any off-screen direction
//! 3. head pose: `head_rotation` when yaw or pitch exceeds its limit
//!
//! Classification is pure: no shared state and no I/O.

use chrono::{DateTime, Utc};
use proctor_types::{
    AlertEvent, AlertKind, AlertSeverity, FrameAnalysis, HeadPose, PerceptualSignal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::messages;

/// Head-pose limits beyond which movement is flagged.
///
/// Both limits are exclusive: an angle exactly on the limit is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationLimits {
    #[serde(default = "default_max_yaw_deg")]
    pub max_yaw_deg: f64,
    #[serde(default = "default_max_pitch_deg")]
    pub max_pitch_deg: f64,
}

impl Default for RotationLimits {
    fn default() -> Self {
        Self {
            max_yaw_deg: default_max_yaw_deg(),
            max_pitch_deg: default_max_pitch_deg(),
        }
    }
}

const fn default_max_yaw_deg() -> f64 {
    45.0
}

const fn default_max_pitch_deg() -> f64 {
    30.0
}

impl RotationLimits {
    pub fn exceeded_by(&self, pose: &HeadPose) -> bool {
        pose.yaw.abs() > self.max_yaw_deg || pose.pitch.abs() > self.max_pitch_deg
    }
}

/// Turns a frame's perceptual signal into typed alerts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClassifier {
    limits: RotationLimits,
}

impl FrameClassifier {
    pub fn new(limits: RotationLimits) -> Self {
        Self { limits }
    }

    /// Classify a frame, stamping alerts with the current time.
    pub fn classify(&self, signal: &PerceptualSignal) -> Vec<AlertEvent> {
        self.classify_at(signal, Utc::now())
    }

    /// Classify a frame with an explicit timestamp.
    pub fn classify_at(&self, signal: &PerceptualSignal, at: DateTime<Utc>) -> Vec<AlertEvent> {
        let mut alerts = Vec::with_capacity(3);

        if signal.face_count == 0 {
            alerts.push(AlertEvent::new(
                AlertKind::NoFace,
                AlertSeverity::High,
                messages::no_face(),
                at,
            ));
        } else if signal.face_count > 1 {
            alerts.push(AlertEvent::new(
                AlertKind::MultipleFaces,
                AlertSeverity::High,
                messages::multiple_faces(signal.face_count),
                at,
            ));
        }

        if signal.gaze.is_away() {
            alerts.push(AlertEvent::new(
                AlertKind::LookingAway,
                AlertSeverity::Medium,
                messages::looking(signal.gaze),
                at,
            ));
        }

        if self.limits.exceeded_by(&signal.head_pose) {
            alerts.push(AlertEvent::new(
                AlertKind::HeadRotation,
                AlertSeverity::Medium,
                messages::head_rotation(),
                at,
            ));
        }

        if !alerts.is_empty() {
            debug!(
                face_count = signal.face_count,
                gaze = %signal.gaze,
                alerts = alerts.len(),
                "Frame raised alerts"
            );
        }

        alerts
    }

    /// Classify a frame and bundle the result with the signal.
    pub fn analyze(&self, signal: &PerceptualSignal) -> FrameAnalysis {
        self.analyze_at(signal, Utc::now())
    }

    pub fn analyze_at(&self, signal: &PerceptualSignal, at: DateTime<Utc>) -> FrameAnalysis {
        FrameAnalysis::new(signal, self.classify_at(signal, at), at)
    }
}
