//! # proctor-types
//!
//! Shared value types for interview proctoring: the per-frame perceptual
//! signal handed over by the face/landmark collaborator, the alerts a single
//! frame can raise, the per-session violation counters, and the verdict
//! rendered from those counters.
//!
//! ## Key Concepts
//!
//! - **PerceptualSignal**: face count, gaze class and head pose for one frame
//! - **AlertEvent**: a typed, timestamped alert raised by one frame
//! - **ViolationKind**: the four countable categories subject to thresholds
//! - **Verdict**: pass/fail, severity and the threshold alerts that fired
//!
//! The types carry no policy. Classification, counting and threshold
//! evaluation live in `proctor-engine`.

#![deny(unsafe_code)]

pub mod alert;
pub mod error;
pub mod session;
pub mod signal;
pub mod verdict;
pub mod violation;

pub use alert::{AlertEvent, AlertKind, AlertSeverity, FrameAnalysis};
pub use error::{ProctorError, ProctorResult};
pub use session::SessionId;
pub use signal::{GazeDirection, HeadPose, PerceptualSignal};
pub use verdict::{Verdict, VerdictAlert, VerdictSeverity};
pub use violation::{RawCounts, ViolationCounters, ViolationKind};
