//! Daily price history from the Yahoo Finance chart API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::UnboundedCache;
use crate::error::StockError;
use crate::models::{StockBar, StockSeries};

/// Companies offered in the selector, in display order.
pub const COMPANIES: &[(&str, &str)] = &[
    ("Apple", "AAPL"),
    ("Microsoft", "MSFT"),
    ("NVIDIA", "NVDA"),
    ("Amazon", "AMZN"),
    ("Alphabet (GOOGL)", "GOOGL"),
    ("Alphabet (GOOG)", "GOOG"),
    ("Meta Platforms", "META"),
    ("Berkshire Hathaway", "BRK-B"),
    ("Tesla", "TSLA"),
    ("Eli Lilly", "LLY"),
    ("Broadcom", "AVGO"),
];

/// Look up a company by display name, falling back to the first entry.
pub fn company_or_default(name: Option<&str>) -> (&'static str, &'static str) {
    name.and_then(|n| COMPANIES.iter().find(|(c, _)| *c == n))
        .copied()
        .unwrap_or(COMPANIES[0])
}

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn history(&self, ticker: &str, period: &str) -> Result<StockSeries, StockError>;
}

#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

impl YahooFinanceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StockError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (dashboard)")
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn history(&self, ticker: &str, period: &str) -> Result<StockSeries, StockError> {
        debug!("Requesting {} history for {}", period, ticker);
        let response = self
            .client
            .get(self.chart_url(ticker))
            .query(&[("range", period), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<ChartResponse>(&body) {
            Ok(parsed) => parse_chart(parsed),
            // gateway errors come back as HTML
            Err(_) if !status.is_success() => Err(StockError::Status(status.as_u16())),
            Err(e) => Err(StockError::Malformed(e.to_string())),
        }
    }
}

fn parse_chart(response: ChartResponse) -> Result<StockSeries, StockError> {
    if let Some(err) = response.chart.error {
        return Err(StockError::Provider(format!("{}: {}", err.code, err.description)));
    }
    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| StockError::Malformed("empty chart result".to_string()))?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = DateTime::<Utc>::from_timestamp(*ts, 0)?.date_naive();
            Some(StockBar {
                date,
                open: quote.open.get(i).copied().flatten()?,
                high: quote.high.get(i).copied().flatten()?,
                low: quote.low.get(i).copied().flatten()?,
                close: quote.close.get(i).copied().flatten()?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect::<Vec<_>>();

    Ok(StockSeries::from_vec(bars))
}

/// Result of a fetch: possibly empty data plus the warning to show.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub series: Arc<StockSeries>,
    pub warning: Option<String>,
}

/// Caching front of a provider. Errors stop here and become an empty series.
pub struct StockFetcher {
    provider: Arc<dyn PriceHistoryProvider>,
    cache: UnboundedCache<(String, String), Arc<StockSeries>>,
}

impl StockFetcher {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>) -> Self {
        Self {
            provider,
            cache: UnboundedCache::new(),
        }
    }

    pub async fn fetch(&self, ticker: &str, period: &str) -> FetchOutcome {
        let key = (ticker.to_string(), period.to_string());
        if let Some(series) = self.cache.get(&key) {
            debug!("Cache hit for {} ({})", ticker, period);
            return FetchOutcome {
                series,
                warning: None,
            };
        }

        match self.provider.history(ticker, period).await {
            Ok(series) => {
                info!("Fetched {} bars for {} ({})", series.len(), ticker, period);
                let series = Arc::new(series);
                self.cache.insert(key, series.clone());
                FetchOutcome {
                    series,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Failed to fetch stock data for '{}': {}", ticker, e);
                FetchOutcome {
                    series: Arc::new(StockSeries::new()),
                    warning: Some(format!("Failed to fetch stock data for '{}': {}", ticker, e)),
                }
            }
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
