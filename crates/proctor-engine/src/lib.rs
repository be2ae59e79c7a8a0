//! # proctor-engine
//!
//! Behavior classification and session violation aggregation for automated
//! interview proctoring.
//!
//! ## Components
//!
//! - **FrameClassifier**: pure rules turning one [`PerceptualSignal`] into
//!   zero to three alerts
//! - **SessionStore**: concurrency-safe per-session counters with TTL
//!   eviction and a periodic sweeper
//! - **ViolationAggregator**: records frames against sessions and renders
//!   verdicts from session counters or client-reported counts
//! - **VerdictPolicy**: threshold table plus a pluggable escalation rule
//! - **perception**: how landmarks become gaze classes and head-pose angles
//!
//! ## Example
//!
//! ```rust
//! use proctor_engine::{ProctorConfig, ViolationAggregator};
//! use proctor_types::{PerceptualSignal, SessionId};
//!
//! let aggregator = ViolationAggregator::from_config(&ProctorConfig::default());
//! let session = SessionId::new("interview-1").unwrap();
//!
//! let analysis = aggregator
//!     .record_frame(&session, &PerceptualSignal::no_face())
//!     .unwrap();
//! assert_eq!(analysis.alerts[0].message, "No face detected");
//!
//! let verdict = aggregator.evaluate(session).unwrap();
//! assert!(verdict.pass);
//! ```
//!
//! [`PerceptualSignal`]: proctor_types::PerceptualSignal

#![deny(unsafe_code)]

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod messages;
pub mod perception;
pub mod policy;
pub mod store;

pub use aggregator::{EvaluationInput, ViolationAggregator, ViolationCheck};
pub use classifier::{FrameClassifier, RotationLimits};
pub use config::{CountSource, ProctorConfig};
pub use perception::{
    derive_gaze, derive_head_pose, signal_from_landmarks, FaceLandmarks, Point, GAZE_THRESHOLD,
};
pub use policy::{
    BinaryEscalation, EscalationPolicy, ThresholdTable, UnknownKindPolicy, VerdictPolicy,
};
pub use store::{Session, SessionStore, DEFAULT_SESSION_TTL};
