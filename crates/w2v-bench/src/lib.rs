//! Latency benchmark: many single-word requests vs. one batched request

pub mod driver;
pub mod report;

pub use driver::{multi_request, run, single_request};
pub use report::{BenchSummary, PhaseKind, PhaseReport};
