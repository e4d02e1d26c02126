use std::time::Instant;

use tracing::info;
use w2v_client::{VectorService, Words};
use w2v_common::config::BenchConfig;
use w2v_common::{Result, VectorError};

use crate::report::{BenchSummary, PhaseKind, PhaseReport};

/// `loops` sequential calls carrying one word each.
pub async fn multi_request<S: VectorService>(service: &S, word: &str, loops: usize) -> Result<PhaseReport> {
    if loops == 0 {
        return Err(VectorError::InvalidConfig("loops must be at least 1".into()));
    }
    let words = Words::single(word);
    info!(target: "bench", loops, "multi request phase");

    let start = Instant::now();
    for _ in 0..loops {
        service.get_vector(&words).await?;
    }
    let elapsed = start.elapsed();

    Ok(PhaseReport { kind: PhaseKind::Multi, calls: loops, entries: loops, elapsed })
}

/// One call carrying `entries` copies of `word`.
pub async fn single_request<S: VectorService>(service: &S, word: &str, entries: usize) -> Result<PhaseReport> {
    let words = Words::repeated(word, entries)?;
    info!(target: "bench", entries, "single request phase");

    let start = Instant::now();
    service.get_vector(&words).await?;
    let elapsed = start.elapsed();

    Ok(PhaseReport { kind: PhaseKind::Single, calls: 1, entries, elapsed })
}

/// Runs the configured phases in order, multi first. Stops at the first error.
pub async fn run<S: VectorService>(service: &S, config: &BenchConfig) -> Result<BenchSummary> {
    config.validate()?;
    let mut summary = BenchSummary::default();
    if config.phases.runs_multi() {
        summary.phases.push(multi_request(service, &config.word, config.loops).await?);
    }
    if config.phases.runs_single() {
        summary.phases.push(single_request(service, &config.word, config.entries).await?);
    }
    Ok(summary)
}
