use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

use super::aggregator::{AggregateRequest, AggregationOutcome, FetchTokens};

/// One aggregation run handed to a worker task.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Monotonic per engine; higher wins
    pub generation: u64,
    pub symbol: String,
    pub request: AggregateRequest,
    pub config: AnalysisConfig,
    pub tokens: FetchTokens,
}

/// The result returned by the worker
#[derive(Debug, Clone)]
pub struct RunResult {
    pub generation: u64,
    pub symbol: String,
    pub duration_ms: u128,

    // Success: the new front buffer
    pub result: Result<Arc<AggregationOutcome>, AnalysisError>,
}
