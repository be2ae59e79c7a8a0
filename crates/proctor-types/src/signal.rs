//! Per-frame perceptual signal.
//!
//! Produced by the external face/landmark collaborator; the core consumes it
//! as-is and never looks at pixels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProctorError, ProctorResult};

/// Coarse gaze classification for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeDirection {
    Center,
    Left,
    Right,
    Up,
    Down,
    Away,
    /// No face was located in the frame.
    NoFace,
}

impl GazeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeDirection::Center => "center",
            GazeDirection::Left => "left",
            GazeDirection::Right => "right",
            GazeDirection::Up => "up",
            GazeDirection::Down => "down",
            GazeDirection::Away => "away",
            GazeDirection::NoFace => "no_face",
        }
    }

    /// Whether the candidate is looking somewhere other than the screen.
    ///
    /// `NoFace` is not "away": a missing face is reported on its own.
    pub fn is_away(&self) -> bool {
        matches!(
            self,
            GazeDirection::Left
                | GazeDirection::Right
                | GazeDirection::Up
                | GazeDirection::Down
                | GazeDirection::Away
        )
    }
}

impl fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Up-down tilt.
    pub pitch: f64,
    /// Left-right rotation.
    pub yaw: f64,
    /// Sideways tilt.
    pub roll: f64,
}

impl HeadPose {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Structured output of face/landmark detection for one frame.
///
/// Invariant: `face_count == 0` iff `gaze == GazeDirection::NoFace`, and all
/// pose angles are finite. Values built through [`PerceptualSignal::new`]
/// uphold it; deserialized values must go through
/// [`PerceptualSignal::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptualSignal {
    pub face_count: u32,
    #[serde(rename = "gaze_direction", alias = "gaze")]
    pub gaze: GazeDirection,
    #[serde(default)]
    pub head_pose: HeadPose,
}

impl PerceptualSignal {
    pub fn new(face_count: u32, gaze: GazeDirection, head_pose: HeadPose) -> ProctorResult<Self> {
        let signal = Self {
            face_count,
            gaze,
            head_pose,
        };
        signal.validate()?;
        Ok(signal)
    }

    /// Signal for a frame in which no face was located.
    pub fn no_face() -> Self {
        Self {
            face_count: 0,
            gaze: GazeDirection::NoFace,
            head_pose: HeadPose::default(),
        }
    }

    pub fn validate(&self) -> ProctorResult<()> {
        if self.face_count == 0 && self.gaze != GazeDirection::NoFace {
            return Err(ProctorError::InvalidInput(format!(
                "face_count is 0 but gaze is {}",
                self.gaze
            )));
        }
        if self.face_count > 0 && self.gaze == GazeDirection::NoFace {
            return Err(ProctorError::InvalidInput(format!(
                "gaze is no_face but face_count is {}",
                self.face_count
            )));
        }
        if !self.head_pose.is_finite() {
            return Err(ProctorError::InvalidInput(
                "head pose angles must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaze_away_classes() {
        for gaze in [
            GazeDirection::Left,
            GazeDirection::Right,
            GazeDirection::Up,
            GazeDirection::Down,
            GazeDirection::Away,
        ] {
            assert!(gaze.is_away(), "{gaze} should count as away");
        }
        assert!(!GazeDirection::Center.is_away());
        assert!(!GazeDirection::NoFace.is_away());
    }

    #[test]
    fn no_face_consistency_is_enforced() {
        assert!(PerceptualSignal::new(0, GazeDirection::NoFace, HeadPose::default()).is_ok());
        assert!(PerceptualSignal::new(0, GazeDirection::Center, HeadPose::default()).is_err());
        assert!(PerceptualSignal::new(2, GazeDirection::NoFace, HeadPose::default()).is_err());
        assert!(PerceptualSignal::new(2, GazeDirection::Left, HeadPose::default()).is_ok());
    }

    #[test]
    fn non_finite_pose_is_rejected() {
        let pose = HeadPose::new(f64::NAN, 0.0, 0.0);
        let err = PerceptualSignal::new(1, GazeDirection::Center, pose).unwrap_err();
        assert!(matches!(err, ProctorError::InvalidInput(_)));
    }

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"{
            "face_count": 1,
            "gaze_direction": "left",
            "head_pose": {"pitch": 1.5, "yaw": -20.25, "roll": 0.0}
        }"#;
        let signal: PerceptualSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.gaze, GazeDirection::Left);
        assert_eq!(signal.head_pose.yaw, -20.25);
        assert!(signal.validate().is_ok());

        let short = r#"{"face_count": 0, "gaze": "no_face"}"#;
        let signal: PerceptualSignal = serde_json::from_str(short).unwrap();
        assert_eq!(signal, PerceptualSignal::no_face());
    }

    #[test]
    fn unknown_gaze_fails_to_parse() {
        let json = r#"{"face_count": 1, "gaze_direction": "sideways"}"#;
        assert!(serde_json::from_str::<PerceptualSignal>(json).is_err());
    }
}
