use std::sync::Arc;
use std::time::Instant;

use crate::error::AnalysisError;

use super::aggregator::{AggregationOutcome, FetchTokens};

/// A run that has been dispatched but not yet applied.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub generation: u64,
    pub tokens: FetchTokens,
}

/// Represents the state of a single symbol in the engine.
#[derive(Debug, Clone, Default)]
pub struct SymbolState {
    /// THE FRONT BUFFER.
    /// Readers clone the Arc; a finished run replaces the pointer wholesale.
    pub outcome: Option<Arc<AggregationOutcome>>,

    /// Generation that produced `outcome`
    pub generation: u64,
    pub last_update_time: Option<Instant>,

    /// Run currently crunching this symbol, if any
    pub in_flight: Option<InFlight>,

    /// Last error (if any)
    pub last_error: Option<AnalysisError>,
}

impl SymbolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_calculating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when `generation` is the run this state is waiting for.
    pub fn awaits(&self, generation: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|run| run.generation == generation)
    }

    /// The swap. Promotes a finished run to the front buffer.
    pub fn update_buffer(&mut self, generation: u64, outcome: Arc<AggregationOutcome>) {
        self.outcome = Some(outcome);
        self.generation = generation;
        self.in_flight = None;
        self.last_update_time = Some(Instant::now());
        self.last_error = None;
    }

    /// A failed run keeps the previous front buffer.
    pub fn record_failure(&mut self, error: AnalysisError) {
        self.in_flight = None;
        self.last_error = Some(error);
    }
}
