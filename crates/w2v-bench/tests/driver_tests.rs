use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};
use w2v_bench::{multi_request, run, single_request, PhaseKind};
use w2v_client::mock::RecordingService;
use w2v_client::{VectorService, Words};
use w2v_common::config::{BenchConfig, Phases};
use w2v_common::{Result, VectorError};

/// Fails once `ok_calls` calls have succeeded.
struct FlakyService {
    ok_calls: usize,
    seen: AtomicUsize,
}

impl VectorService for FlakyService {
    async fn get_vector(&self, _words: &Words) -> Result<Value> {
        let n = self.seen.fetch_add(1, Ordering::SeqCst);
        if n < self.ok_calls { Ok(json!({})) } else { Err(VectorError::Transport("connection refused".into())) }
    }
}

#[tokio::test]
async fn multi_phase_sends_one_word_per_call() {
    let service = RecordingService::default();
    let report = multi_request(&service, "hello", 3).await.unwrap();
    assert_eq!(report.kind, PhaseKind::Multi);
    assert_eq!(report.calls, 3);
    assert_eq!(service.calls(), vec![vec!["hello".to_string()]; 3]);
}

#[tokio::test]
async fn single_phase_sends_one_batch() {
    let service = RecordingService::default();
    let report = single_request(&service, "hello", 3).await.unwrap();
    assert_eq!(report.calls, 1);
    assert_eq!(report.entries, 3);
    assert_eq!(service.calls(), vec![vec!["hello".to_string(); 3]]);
}

#[tokio::test]
async fn zero_sized_phases_rejected_without_calls() {
    let service = RecordingService::default();
    assert!(matches!(multi_request(&service, "hello", 0).await, Err(VectorError::InvalidConfig(_))));
    assert!(matches!(single_request(&service, "hello", 0).await, Err(VectorError::InvalidInput(_))));
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn run_honours_phase_selection() {
    let service = RecordingService::default();
    let config = BenchConfig { word: "hi".into(), loops: 2, entries: 5, phases: Phases::Single };
    let summary = run(&service, &config).await.unwrap();
    assert_eq!(summary.phases.len(), 1);
    assert!(summary.phase(PhaseKind::Multi).is_none());
    assert_eq!(service.calls(), vec![vec!["hi".to_string(); 5]]);
}

#[tokio::test]
async fn first_error_aborts_run() {
    let service = FlakyService { ok_calls: 2, seen: AtomicUsize::new(0) };
    let config = BenchConfig { loops: 5, entries: 5, ..BenchConfig::default() };
    let err = run(&service, &config).await.unwrap_err();
    assert!(matches!(err, VectorError::Transport(_)));
    // two successes, then the failing third call; the single phase never runs
    assert_eq!(service.seen.load(Ordering::SeqCst), 3);
}
