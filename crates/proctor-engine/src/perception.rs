//! Landmark-to-signal derivation.
//!
//! The face/landmark model is an external collaborator. These functions pin
//! down how its landmarks become a gaze class and head-pose angles, so the
//! classifier's input has a single documented meaning.

use proctor_types::{GazeDirection, HeadPose, PerceptualSignal};
use serde::{Deserialize, Serialize};

/// Nose offset from the eye center, in normalized frame units, beyond which
/// the gaze is no longer considered centered.
pub const GAZE_THRESHOLD: f64 = 0.03;

/// A landmark in normalized frame coordinates (`0.0..=1.0` on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The landmarks the derivation needs from the primary face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: Point,
    pub right_eye: Point,
    pub nose: Point,
}

impl FaceLandmarks {
    pub fn eye_center(&self) -> Point {
        Point::new(
            (self.left_eye.x + self.right_eye.x) / 2.0,
            (self.left_eye.y + self.right_eye.y) / 2.0,
        )
    }
}

/// Classify gaze from the nose position relative to the eye center.
pub fn derive_gaze(landmarks: Option<&FaceLandmarks>) -> GazeDirection {
    let Some(landmarks) = landmarks else {
        return GazeDirection::NoFace;
    };

    let center = landmarks.eye_center();
    let x_diff = landmarks.nose.x - center.x;
    let y_diff = landmarks.nose.y - center.y;

    if x_diff.abs() < GAZE_THRESHOLD && y_diff.abs() < GAZE_THRESHOLD {
        GazeDirection::Center
    } else if x_diff > GAZE_THRESHOLD {
        GazeDirection::Right
    } else if x_diff < -GAZE_THRESHOLD {
        GazeDirection::Left
    } else if y_diff > GAZE_THRESHOLD {
        GazeDirection::Down
    } else if y_diff < -GAZE_THRESHOLD {
        GazeDirection::Up
    } else {
        // Only reachable when an offset sits exactly on the threshold.
        GazeDirection::Away
    }
}

/// Approximate head pose from nose and eye positions.
pub fn derive_head_pose(landmarks: Option<&FaceLandmarks>) -> HeadPose {
    let Some(landmarks) = landmarks else {
        return HeadPose::default();
    };

    HeadPose {
        pitch: round2((landmarks.nose.y - 0.5) * 180.0),
        yaw: round2((landmarks.nose.x - 0.5) * 180.0),
        roll: round2((landmarks.right_eye.y - landmarks.left_eye.y) * 180.0),
    }
}

/// Build a consistent signal from a detector face count and the primary
/// face's landmarks.
///
/// The detector and the landmark model can disagree; landmarks win. A located
/// face raises a zero count to one, and missing landmarks force the count to
/// zero.
pub fn signal_from_landmarks(face_count: u32, landmarks: Option<&FaceLandmarks>) -> PerceptualSignal {
    match landmarks {
        Some(_) => PerceptualSignal {
            face_count: face_count.max(1),
            gaze: derive_gaze(landmarks),
            head_pose: derive_head_pose(landmarks),
        },
        None => PerceptualSignal::no_face(),
    }
}

/// Two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(nose: Point) -> FaceLandmarks {
        FaceLandmarks {
            left_eye: Point::new(0.45, 0.4),
            right_eye: Point::new(0.55, 0.4),
            nose,
        }
    }

    #[test]
    fn gaze_directions() {
        assert_eq!(derive_gaze(Some(&face(Point::new(0.5, 0.41)))), GazeDirection::Center);
        assert_eq!(derive_gaze(Some(&face(Point::new(0.6, 0.4)))), GazeDirection::Right);
        assert_eq!(derive_gaze(Some(&face(Point::new(0.4, 0.4)))), GazeDirection::Left);
        assert_eq!(derive_gaze(Some(&face(Point::new(0.5, 0.5)))), GazeDirection::Down);
        assert_eq!(derive_gaze(Some(&face(Point::new(0.5, 0.3)))), GazeDirection::Up);
        assert_eq!(derive_gaze(None), GazeDirection::NoFace);
    }

    #[test]
    fn horizontal_offset_wins_over_vertical() {
        assert_eq!(derive_gaze(Some(&face(Point::new(0.6, 0.6)))), GazeDirection::Right);
    }

    #[test]
    fn offset_on_the_threshold_is_away() {
        let landmarks = FaceLandmarks {
            left_eye: Point::new(0.0, 0.0),
            right_eye: Point::new(0.0, 0.0),
            nose: Point::new(GAZE_THRESHOLD, 0.0),
        };
        assert_eq!(derive_gaze(Some(&landmarks)), GazeDirection::Away);
    }

    #[test]
    fn head_pose_is_rounded() {
        let landmarks = FaceLandmarks {
            left_eye: Point::new(0.45, 0.40),
            right_eye: Point::new(0.55, 0.41),
            nose: Point::new(0.75, 0.3333),
        };
        let pose = derive_head_pose(Some(&landmarks));
        assert_eq!(pose.yaw, 45.0);
        assert_eq!(pose.pitch, -30.01);
        assert_eq!(pose.roll, 1.8);
        assert_eq!(derive_head_pose(None), HeadPose::default());
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn signals_are_consistent() {
        let landmarks = face(Point::new(0.5, 0.41));
        let signal = signal_from_landmarks(0, Some(&landmarks));
        assert_eq!(signal.face_count, 1);
        assert!(signal.validate().is_ok());

        let signal = signal_from_landmarks(2, None);
        assert_eq!(signal, PerceptualSignal::no_face());

        let signal = signal_from_landmarks(3, Some(&landmarks));
        assert_eq!(signal.face_count, 3);
        assert_eq!(signal.gaze, GazeDirection::Center);
    }
}
