use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::data::MarketDataProvider;

use super::aggregator::aggregate_with_tokens;
use super::messages::{RunRequest, RunResult};

/// Runs one aggregation on the tokio runtime and reports back on `tx`.
pub fn spawn_run(
    provider: Arc<dyn MarketDataProvider>,
    req: RunRequest,
    tx: UnboundedSender<RunResult>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        let result = aggregate_with_tokens(
            provider.as_ref(),
            &req.symbol,
            &req.request,
            &req.config,
            &req.tokens,
        )
        .await
        .map(Arc::new);

        // Receiver gone means the engine was dropped; nothing left to do.
        let _ = tx.send(RunResult {
            generation: req.generation,
            symbol: req.symbol,
            duration_ms: start.elapsed().as_millis(),
            result,
        });
    })
}
