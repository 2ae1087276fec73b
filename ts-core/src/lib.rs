use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod catalog;

pub use catalog::{suggest, TickerSuggestion, TICKER_CATALOG};

/// Ticker symbol as submitted by the user: trimmed and uppercased, never empty.
///
/// No exchange or format checks happen here; `RELIANCE.NS` and `BRK-B` are
/// accepted as typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalize raw field text. Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("price series has no points")]
    Empty,
    #[error("column `{column}` has {len} points, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        len: usize,
        expected: usize,
    },
}

/// One daily bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: String, // YYYY-MM-DD
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Close at or above open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Parallel OHLC(V) columns, the `plot_data` payload of an analysis response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub open: Vec<f64>,
    #[serde(default)]
    pub high: Vec<f64>,
    #[serde(default)]
    pub low: Vec<f64>,
    #[serde(default)]
    pub close: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Vec<f64>>,
}

impl PriceSeries {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut series = PriceSeries {
            volume: Some(Vec::with_capacity(candles.len())),
            ..Default::default()
        };
        for c in candles {
            series.push(c);
        }
        series
    }

    pub fn push(&mut self, candle: &Candle) {
        self.dates.push(candle.date.clone());
        self.open.push(candle.open);
        self.high.push(candle.high);
        self.low.push(candle.low);
        self.close.push(candle.close);
        if let Some(volume) = self.volume.as_mut() {
            volume.push(candle.volume);
        }
    }

    /// Number of date points.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Check that every column matches the date column. Returns the shared length.
    pub fn validate(&self) -> Result<usize, SeriesError> {
        let expected = self.dates.len();
        if expected == 0 {
            return Err(SeriesError::Empty);
        }
        let columns: [(&'static str, usize); 4] = [
            ("open", self.open.len()),
            ("high", self.high.len()),
            ("low", self.low.len()),
            ("close", self.close.len()),
        ];
        for (column, len) in columns {
            if len != expected {
                return Err(SeriesError::LengthMismatch {
                    column,
                    len,
                    expected,
                });
            }
        }
        if let Some(volume) = &self.volume {
            if volume.len() != expected {
                return Err(SeriesError::LengthMismatch {
                    column: "volume",
                    len: volume.len(),
                    expected,
                });
            }
        }
        Ok(expected)
    }

    /// Row view of the columns. Missing volume reads as zero.
    pub fn candles(&self) -> Result<Vec<Candle>, SeriesError> {
        let len = self.validate()?;
        Ok((0..len)
            .map(|i| Candle {
                date: self.dates[i].clone(),
                open: self.open[i],
                high: self.high[i],
                low: self.low[i],
                close: self.close[i],
                volume: self
                    .volume
                    .as_ref()
                    .and_then(|v| v.get(i).copied())
                    .unwrap_or(0.0),
            })
            .collect())
    }

    /// Lowest low and highest high, ignoring non-finite values.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut min_p = f64::MAX;
        let mut max_p = f64::MIN;
        for p in self.low.iter().chain(self.high.iter()) {
            if p.is_finite() {
                min_p = min_p.min(*p);
                max_p = max_p.max(*p);
            }
        }
        if min_p > max_p {
            None
        } else {
            Some((min_p, max_p))
        }
    }
}

/// Body of `POST /analyze`.
///
/// The server always answers with either `error` set, or `result` and
/// `disclaimer` set (plus `plot_data` when history was found).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_data: Option<PriceSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_json: Option<serde_json::Value>,
}

impl AnalysisResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Application-level error, if any. An empty string counts as no error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Series worth charting: present and with at least one date.
    pub fn chart_series(&self) -> Option<&PriceSeries> {
        self.plot_data.as_ref().filter(|s| !s.is_empty())
    }
}
