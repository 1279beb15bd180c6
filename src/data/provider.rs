use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::domain::{Bar, Timeframe};
use crate::models::TrendAssessment;

/// External source of bars and (optionally) pre-computed trend assessments.
///
/// Retry and backoff belong to implementations, never to the aggregator.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars ascending by time. An empty vector is a valid, signal-free answer.
    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>>;

    /// `Ok(None)` means "no oracle, classify locally".
    async fn fetch_trend_assessment(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Option<TrendAssessment>> {
        Ok(None)
    }

    /// A unique identifier for this implementation, for logs.
    fn signature(&self) -> &'static str;
}

/// Tries each provider in turn and returns the first success.
pub struct ProviderChain {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn MarketDataProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl MarketDataProvider for ProviderChain {
    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>> {
        for provider in &self.providers {
            match provider.fetch_bars(symbol, timeframe).await {
                Ok(bars) => return Ok(bars),
                Err(e) => {
                    log::info!(
                        "{} could not supply {} {}: {:#}",
                        provider.signature(),
                        symbol,
                        timeframe,
                        e
                    );
                    // Continue to the next provider
                }
            }
        }
        Err(anyhow!(
            "All providers failed to supply {} {}",
            symbol,
            timeframe
        ))
    }

    async fn fetch_trend_assessment(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<TrendAssessment>> {
        for provider in &self.providers {
            if let Some(assessment) = provider.fetch_trend_assessment(symbol, timeframe).await? {
                return Ok(Some(assessment));
            }
        }
        Ok(None)
    }

    fn signature(&self) -> &'static str {
        "Provider Chain"
    }
}
