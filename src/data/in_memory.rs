use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use crate::domain::{Bar, Timeframe, validate_series};
use crate::models::TrendAssessment;

use super::provider::MarketDataProvider;

type Key = (String, Timeframe);

/// Provider backed by maps held in memory. For embedding and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    bars: HashMap<Key, Vec<Bar>>,
    assessments: HashMap<Key, TrendAssessment>,
    failures: HashMap<Key, String>,
    delays: HashMap<Timeframe, Duration>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bars(&mut self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) {
        self.bars.insert((symbol.to_uppercase(), timeframe), bars);
    }

    pub fn insert_assessment(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        assessment: TrendAssessment,
    ) {
        self.assessments
            .insert((symbol.to_uppercase(), timeframe), assessment);
    }

    /// Makes every fetch for this symbol/timeframe fail with `reason`.
    pub fn insert_failure(&mut self, symbol: &str, timeframe: Timeframe, reason: &str) {
        self.failures
            .insert((symbol.to_uppercase(), timeframe), reason.to_string());
    }

    /// Simulated latency for one timeframe's bar fetch.
    pub fn set_delay(&mut self, timeframe: Timeframe, delay: Duration) {
        self.delays.insert(timeframe, delay);
    }

    fn key(symbol: &str, timeframe: Timeframe) -> Key {
        (symbol.to_uppercase(), timeframe)
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>> {
        if let Some(delay) = self.delays.get(&timeframe) {
            tokio::time::sleep(*delay).await;
        }
        let key = Self::key(symbol, timeframe);
        if let Some(reason) = self.failures.get(&key) {
            bail!("{}", reason);
        }
        let bars = self
            .bars
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("No bars loaded for {} {}", symbol, timeframe))?;
        validate_series(&bars)?;
        Ok(bars)
    }

    async fn fetch_trend_assessment(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<TrendAssessment>> {
        Ok(self
            .assessments
            .get(&Self::key(symbol, timeframe))
            .copied())
    }

    fn signature(&self) -> &'static str {
        "In Memory"
    }
}
