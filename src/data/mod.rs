// External collaborators: bar and trend-assessment sources
pub mod in_memory;
pub mod json_file;
pub mod provider;

// Re-export commonly used types
pub use in_memory::InMemoryProvider;
pub use json_file::JsonFileProvider;
pub use provider::{MarketDataProvider, ProviderChain};
