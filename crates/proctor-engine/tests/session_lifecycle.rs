//! End-to-end session behavior: concurrent recording, eviction, sweeping and
//! verdicts over the full aggregator.

use std::sync::Arc;
use std::time::Duration;

use proctor_engine::{
    signal_from_landmarks, FaceLandmarks, Point, ProctorConfig, SessionStore, ViolationAggregator,
    ViolationCheck,
};
use proctor_types::{
    GazeDirection, HeadPose, PerceptualSignal, RawCounts, SessionId, VerdictSeverity,
    ViolationKind,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn id(s: &str) -> SessionId {
    SessionId::new(s).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_on_one_session_are_not_lost() {
    init_tracing();
    let store = Arc::new(SessionStore::default());
    let sid = id("shared");

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let store = Arc::clone(&store);
        let sid = sid.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..10 {
                store.increment(&sid, ViolationKind::NoFace, 1);
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.snapshot(&sid).unwrap().no_face, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sessions_do_not_share_counters() {
    init_tracing();
    let aggregator = Arc::new(ViolationAggregator::from_config(&ProctorConfig::default()));

    let mut tasks = Vec::new();
    for n in 0..8u32 {
        let aggregator = Arc::clone(&aggregator);
        tasks.push(tokio::spawn(async move {
            let sid = SessionId::new(format!("candidate-{n}")).unwrap();
            for _ in 0..=n {
                aggregator
                    .record_frame(&sid, &PerceptualSignal::no_face())
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for n in 0..8u32 {
        let sid = SessionId::new(format!("candidate-{n}")).unwrap();
        let counters = aggregator.store().snapshot(&sid).unwrap();
        assert_eq!(counters.no_face, u64::from(n) + 1);

        let verdict = aggregator.evaluate(sid).unwrap();
        assert_eq!(verdict.pass, n < 2, "candidate-{n}");
    }
}

#[tokio::test(start_paused = true)]
async fn sweeper_evicts_abandoned_sessions() {
    init_tracing();
    let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let handle = store.spawn_sweeper(Duration::from_secs(10)).unwrap();

    store.increment(&id("abandoned"), ViolationKind::LookingAway, 4);
    tokio::time::sleep(Duration::from_secs(30)).await;
    store.get_or_create(&id("active"));

    tokio::time::sleep(Duration::from_secs(45)).await;
    assert_eq!(store.len(), 1);
    assert!(store.contains(&id("active")));

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn configured_sweeper_bounds_abandoned_sessions() {
    init_tracing();
    let config =
        ProctorConfig::from_json(r#"{"session_ttl_secs": 60, "sweep_interval_secs": 1}"#).unwrap();
    let aggregator = ViolationAggregator::from_config(&config);
    let handle = aggregator.spawn_sweeper().unwrap();

    for n in 0..1000 {
        let sid = SessionId::new(format!("abandoned-{n}")).unwrap();
        aggregator
            .record_frame(&sid, &PerceptualSignal::no_face())
            .unwrap();
    }
    assert_eq!(aggregator.store().len(), 1000);

    tokio::time::sleep(Duration::from_secs(62)).await;
    assert!(aggregator.store().is_empty());

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn sweeper_stops_when_store_is_dropped() {
    let store = Arc::new(SessionStore::new(Duration::from_secs(5)));
    let handle = store.spawn_sweeper(Duration::from_secs(1)).unwrap();

    drop(store);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(handle.is_finished());
}

#[test]
fn close_then_reopen_starts_from_zero() {
    let aggregator = ViolationAggregator::from_config(&ProctorConfig::default());
    let sid = id("retake");

    let crowded = PerceptualSignal::new(2, GazeDirection::Center, HeadPose::default()).unwrap();
    aggregator.record_frame(&sid, &crowded).unwrap();
    assert!(!aggregator.evaluate(sid.clone()).unwrap().pass);

    aggregator.store().close(&sid).unwrap();
    let reopened = aggregator.store().get_or_create(&sid);
    assert!(reopened.counters.is_zero());
    assert!(aggregator.evaluate(sid).unwrap().pass);
}

#[test]
fn landmarks_flow_through_to_a_verdict() {
    let aggregator = ViolationAggregator::from_config(&ProctorConfig::default());
    let sid = id("landmarks");

    // Nose well to the right of the eye center: gaze right, yaw 27 degrees.
    let glancing = FaceLandmarks {
        left_eye: Point::new(0.55, 0.40),
        right_eye: Point::new(0.65, 0.40),
        nose: Point::new(0.65, 0.45),
    };
    let signal = signal_from_landmarks(1, Some(&glancing));
    assert_eq!(signal.gaze, GazeDirection::Right);

    for _ in 0..10 {
        let analysis = aggregator.record_frame(&sid, &signal).unwrap();
        assert_eq!(analysis.alerts.len(), 1);
        assert_eq!(analysis.alerts[0].message, "Looking right");
    }

    let verdict = aggregator.evaluate(sid).unwrap();
    assert_eq!(verdict.severity, VerdictSeverity::High);
    let alert = verdict.alert(ViolationKind::LookingAway).unwrap();
    assert_eq!(alert.message, "Looking Away threshold exceeded");
    assert_eq!((alert.count, alert.threshold), (10, 10));
}

#[test]
fn check_violations_scenarios() {
    let aggregator = ViolationAggregator::from_config(&ProctorConfig::default());

    let empty = aggregator.check_violations(ViolationCheck::default()).unwrap();
    assert!(empty.pass);
    assert_eq!(empty.severity, VerdictSeverity::Low);
    assert!(empty.alerts.is_empty());

    let crowded = aggregator
        .check_violations(ViolationCheck {
            session_id: None,
            violations: RawCounts::new().with("multiple_faces", 1),
        })
        .unwrap();
    assert!(!crowded.pass);
    assert_eq!(crowded.severity, VerdictSeverity::High);
    assert_eq!(crowded.alerts[0].message, "Multiple Faces threshold exceeded");

    let json = serde_json::to_value(&crowded).unwrap();
    assert_eq!(json["alerts"][0]["type"], "multiple_faces");
    assert_eq!(json["alerts"][0]["count"], 1);
    assert_eq!(json["severity"], "high");
    assert_eq!(json["pass"], false);
}

#[test]
fn strict_configuration_rejects_unknown_reported_kinds() {
    let config = ProctorConfig::from_json(r#"{"unknown_kinds": "reject"}"#).unwrap();
    let aggregator = ViolationAggregator::from_config(&config);

    let err = aggregator
        .evaluate(RawCounts::new().with("copy_paste", 3))
        .unwrap_err();
    assert!(err.is_client_error());
}
