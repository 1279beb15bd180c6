pub mod aggregator;
pub mod core;
pub mod messages;
pub mod state;
pub mod worker;

// Re-export key components
pub use aggregator::{AggregateRequest, AggregationOutcome, FetchTokens, aggregate, assess};
pub use core::SignalEngine;
pub use state::SymbolState;
