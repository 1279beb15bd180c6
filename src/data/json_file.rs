use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::{Bar, Timeframe, validate_series};
use crate::models::TrendAssessment;
use crate::utils::time_utils::epoch_ms_to_utc;

use super::provider::MarketDataProvider;

/// Reads `{dir}/{SYMBOL}_{timeframe}.json` (an array of bars) and the optional
/// oracle file `{dir}/{SYMBOL}_{timeframe}.trend.json`.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    pub directory: PathBuf,
}

impl JsonFileProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn bars_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.directory
            .join(format!("{}_{}.json", symbol.to_uppercase(), timeframe))
    }

    pub fn trend_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.directory
            .join(format!("{}_{}.trend.json", symbol.to_uppercase(), timeframe))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>> {
        let path = self.bars_path(symbol, timeframe);
        let bars: Vec<Bar> = read_json(&path).await?;
        validate_series(&bars).with_context(|| format!("Invalid series in {}", path.display()))?;
        if let Some(last) = bars.last() {
            log::debug!(
                "Loaded {} bars from {} (last {})",
                bars.len(),
                path.display(),
                epoch_ms_to_utc(last.time)
            );
        }
        Ok(bars)
    }

    async fn fetch_trend_assessment(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<TrendAssessment>> {
        let path = self.trend_path(symbol, timeframe);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        read_json(&path).await.map(Some)
    }

    fn signature(&self) -> &'static str {
        "Local JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::test_support::rising_bars;
    use crate::models::TrendDirection;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trend-sniper-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn reads_bars_and_optional_assessment() {
        let dir = scratch_dir("json-ok");
        let provider = JsonFileProvider::new(&dir);
        let bars = rising_bars(4, 10.0, 1.0);
        std::fs::write(
            provider.bars_path("btcusdt", Timeframe::D1),
            serde_json::to_string(&bars).unwrap(),
        )
        .unwrap();

        assert_eq!(provider.fetch_bars("BTCUSDT", Timeframe::D1).await.unwrap(), bars);
        assert_eq!(
            provider.fetch_trend_assessment("BTCUSDT", Timeframe::D1).await.unwrap(),
            None
        );

        std::fs::write(
            provider.trend_path("BTCUSDT", Timeframe::D1),
            r#"{"direction":"UP","confidence":75,"swingHigh":120.0,"swingLow":100.0}"#,
        )
        .unwrap();
        let assessment = provider
            .fetch_trend_assessment("BTCUSDT", Timeframe::D1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assessment.direction, TrendDirection::Up);
        assert_eq!(assessment.confidence, 75);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_or_garbled_files_are_errors() {
        let dir = scratch_dir("json-bad");
        let provider = JsonFileProvider::new(&dir);
        assert!(provider.fetch_bars("BTCUSDT", Timeframe::H1).await.is_err());

        std::fs::write(provider.bars_path("BTCUSDT", Timeframe::H1), "[{\"time\": 1}").unwrap();
        let err = provider.fetch_bars("BTCUSDT", Timeframe::H1).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
