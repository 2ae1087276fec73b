use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_core::{Candle, PriceSeries, Ticker};

use crate::config::ServerConfig;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("market data service answered {0}")]
    Status(u16),
    #[error("market data service error: {0}")]
    Upstream(String),
    #[error("invalid market data url {0:?}")]
    BadUrl(String),
}

/// Quote fields the report needs; anything Yahoo leaves out stays `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSummary {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub post_market_price: Option<f64>,
    pub volume: Option<u64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

impl QuoteSummary {
    /// Live price, else the previous close. The flag is true when falling back.
    pub fn effective_price(&self) -> Option<(f64, bool)> {
        match (self.regular_market_price, self.previous_close) {
            (Some(p), _) => Some((p, false)),
            (None, Some(c)) => Some((c, true)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    pub quote: QuoteSummary,
    pub series: PriceSeries,
}

#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn snapshot(&self, ticker: &Ticker) -> Result<MarketSnapshot, MarketError>;
}

/// Yahoo Finance chart API: quote meta plus daily bars over the configured range.
pub struct YahooMarket {
    client: reqwest::Client,
    base_url: reqwest::Url,
    range: String,
}

impl YahooMarket {
    pub fn new(base_url: &str, range: &str, timeout: Duration) -> Result<Self, MarketError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|_| MarketError::BadUrl(base_url.to_string()))?;
        Ok(Self {
            client,
            base_url,
            range: range.to_string(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, MarketError> {
        Self::new(
            &config.yahoo_api_url,
            &config.history_range,
            config.upstream_timeout,
        )
    }

    /// The ticker goes in as one percent-encoded path segment.
    fn chart_url(&self, ticker: &Ticker) -> Result<reqwest::Url, MarketError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketError::BadUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker.as_str()]);
        url.set_fragment(None);
        url.query_pairs_mut()
            .clear()
            .append_pair("range", &self.range)
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait]
impl MarketSource for YahooMarket {
    async fn snapshot(&self, ticker: &Ticker) -> Result<MarketSnapshot, MarketError> {
        let url = self.chart_url(ticker)?;
        tracing::debug!(%url, "fetching chart");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        // Unknown symbols come back as 404 with an error body.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(MarketSnapshot::default());
        }
        if !status.is_success() {
            return Err(MarketError::Status(status.as_u16()));
        }
        let parsed: YahooResponse = response.json().await?;
        snapshot_from_chart(parsed)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct YahooResponse {
    chart: Option<YahooChart>,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    full_exchange_name: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    post_market_price: Option<f64>,
    regular_market_volume: Option<u64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<Quote>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

impl Quote {
    fn value_at(series: &Option<Vec<Option<f64>>>, idx: usize) -> Option<f64> {
        series.as_ref().and_then(|v| v.get(idx)).and_then(|v| *v)
    }

    fn volume_at(&self, idx: usize) -> Option<u64> {
        self.volume
            .as_ref()
            .and_then(|v| v.get(idx))
            .and_then(|v| *v)
    }

    fn candle_at(&self, idx: usize, ts: i64) -> Option<Candle> {
        let open = Self::value_at(&self.open, idx)?;
        let high = Self::value_at(&self.high, idx)?;
        let low = Self::value_at(&self.low, idx)?;
        let close = Self::value_at(&self.close, idx)?;
        let dt = DateTime::<Utc>::from_timestamp(ts, 0)?;
        Some(Candle {
            date: dt.date_naive().format("%Y-%m-%d").to_string(),
            open: round_two(open),
            high: round_two(high),
            low: round_two(low),
            close: round_two(close),
            volume: self.volume_at(idx).unwrap_or(0) as f64,
        })
    }
}

pub(crate) fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn snapshot_from_chart(parsed: YahooResponse) -> Result<MarketSnapshot, MarketError> {
    let Some(chart) = parsed.chart else {
        return Err(MarketError::Upstream("response has no chart".into()));
    };
    if let Some(err) = chart.error {
        if err.code.as_deref() == Some("Not Found") {
            return Ok(MarketSnapshot::default());
        }
        let detail = err
            .description
            .or(err.code)
            .unwrap_or_else(|| "unknown error".into());
        return Err(MarketError::Upstream(detail));
    }
    let Some(result) = chart.result.and_then(|mut r| r.pop()) else {
        return Ok(MarketSnapshot::default());
    };

    let meta = result.meta.unwrap_or_default();
    let quote = QuoteSummary {
        name: meta.long_name.or(meta.short_name),
        currency: meta.currency,
        exchange: meta.full_exchange_name,
        regular_market_price: meta.regular_market_price,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
        post_market_price: meta.post_market_price,
        volume: meta.regular_market_volume,
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let bars = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut q| q.pop())
        .unwrap_or_default();

    let mut series = PriceSeries {
        volume: Some(Vec::with_capacity(timestamps.len())),
        ..Default::default()
    };
    for (idx, ts) in timestamps.iter().enumerate() {
        if let Some(candle) = bars.candle_at(idx, *ts) {
            series.push(&candle);
        }
    }

    Ok(MarketSnapshot { quote, series })
}
