use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

use crate::config::{AnalysisConfig, PRINT_REFRESH_EVENTS};
use crate::data::MarketDataProvider;
use crate::domain::Timeframe;
use crate::error::AnalysisError;

use super::aggregator::{AggregateRequest, AggregationOutcome, FetchTokens};
use super::messages::{RunRequest, RunResult};
use super::state::{InFlight, SymbolState};
use super::worker;

/// Side-effecting refresh layer over the pure aggregator.
///
/// Every `refresh` supersedes the symbol's previous run: its fetches are
/// cancelled and its result, should it still arrive, is discarded.
pub struct SignalEngine {
    /// Registry of all symbols seen so far
    pub symbols: HashMap<String, SymbolState>,

    provider: Arc<dyn MarketDataProvider>,

    /// Worker communication
    result_tx: UnboundedSender<RunResult>,
    result_rx: UnboundedReceiver<RunResult>,

    next_generation: u64,

    /// The live configuration state
    pub current_config: AnalysisConfig,
}

impl SignalEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: AnalysisConfig) -> Self {
        let (result_tx, result_rx) = unbounded_channel();
        Self {
            symbols: HashMap::new(),
            provider,
            result_tx,
            result_rx,
            next_generation: 0,
            current_config: config,
        }
    }

    /// Starts a new run for `symbol` and returns its generation.
    /// Must be called from within a tokio runtime.
    pub fn refresh(&mut self, symbol: &str, request: AggregateRequest) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        let symbol = symbol.to_uppercase();

        let timeframes = request.resolve_timeframes(&self.current_config.aggregator);
        let tokens = FetchTokens::new(CancellationToken::new(), &timeframes);

        let state = self.symbols.entry(symbol.clone()).or_default();
        if let Some(previous) = state.in_flight.replace(InFlight {
            generation,
            tokens: tokens.clone(),
        }) {
            previous.tokens.cancel_all();
            if PRINT_REFRESH_EVENTS {
                log::info!(
                    "[{}] run {} superseded by run {}",
                    symbol,
                    previous.generation,
                    generation
                );
            }
        }
        if PRINT_REFRESH_EVENTS {
            log::info!("[{}] run {} started", symbol, generation);
        }

        worker::spawn_run(
            self.provider.clone(),
            RunRequest {
                generation,
                symbol,
                request,
                config: self.current_config.clone(),
                tokens,
            },
            self.result_tx.clone(),
        );
        generation
    }

    /// Applies every finished run without blocking.
    /// Returns TRUE while any symbol still has a run in flight.
    pub fn update(&mut self) -> bool {
        while let Ok(result) = self.result_rx.try_recv() {
            self.handle_run_result(result);
        }
        self.has_active_runs()
    }

    /// Waits until no symbol has a run in flight.
    pub async fn settle(&mut self) {
        while self.has_active_runs() {
            match self.result_rx.recv().await {
                Some(result) => self.handle_run_result(result),
                None => break,
            }
        }
    }

    /// Accessor for readers
    pub fn get_outcome(&self, symbol: &str) -> Option<Arc<AggregationOutcome>> {
        self.symbols
            .get(&symbol.to_uppercase())
            .and_then(|state| state.outcome.clone())
    }

    /// `(is_calculating, last_error)`
    pub fn get_status(&self, symbol: &str) -> (bool, Option<AnalysisError>) {
        match self.symbols.get(&symbol.to_uppercase()) {
            Some(state) => (state.is_calculating(), state.last_error.clone()),
            None => (false, None),
        }
    }

    /// Cancels one timeframe of the symbol's in-flight run. The run still
    /// completes, reporting that timeframe as a partial failure.
    pub fn cancel_timeframe(&self, symbol: &str, timeframe: Timeframe) -> bool {
        self.symbols
            .get(&symbol.to_uppercase())
            .and_then(|state| state.in_flight.as_ref())
            .is_some_and(|run| run.tokens.cancel(timeframe))
    }

    /// Cancels the symbol's in-flight run entirely.
    pub fn cancel(&self, symbol: &str) -> bool {
        match self
            .symbols
            .get(&symbol.to_uppercase())
            .and_then(|state| state.in_flight.as_ref())
        {
            Some(run) => {
                run.tokens.cancel_all();
                true
            }
            None => false,
        }
    }

    /// Takes effect from the next `refresh`.
    pub fn update_config(&mut self, new_config: AnalysisConfig) {
        self.current_config = new_config;
    }

    // --- INTERNAL LOGIC ---

    fn has_active_runs(&self) -> bool {
        self.symbols.values().any(|s| s.is_calculating())
    }

    fn handle_run_result(&mut self, result: RunResult) {
        let Some(state) = self.symbols.get_mut(&result.symbol) else {
            return;
        };
        if !state.awaits(result.generation) {
            if PRINT_REFRESH_EVENTS {
                log::info!(
                    "[{}] discarding stale run {}",
                    result.symbol,
                    result.generation
                );
            }
            return;
        }
        match result.result {
            Ok(outcome) => {
                if PRINT_REFRESH_EVENTS {
                    log::info!(
                        "[{}] run {} applied in {}ms",
                        result.symbol,
                        result.generation,
                        result.duration_ms
                    );
                }
                state.update_buffer(result.generation, outcome);
            }
            Err(e) => {
                log::error!("Run {} failed for {}: {}", result.generation, result.symbol, e);
                state.record_failure(e);
            }
        }
    }
}
