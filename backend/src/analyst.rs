use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use ts_core::Ticker;

use crate::config::ServerConfig;
use crate::market::{round_two, MarketSnapshot};
use crate::report::{AnalystRatings, Narrative, Recommendation, StockReport};

#[derive(Debug, thiserror::Error)]
pub enum AnalystError {
    #[error("report request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("report service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("report service returned no content")]
    EmptyReply,
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write(&self, ticker: &Ticker, market: &MarketSnapshot)
        -> Result<Narrative, AnalystError>;
}

/// Chat-completions client that asks the model for a report in the JSON layout.
pub struct OpenAiWriter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

const SYSTEM_PROMPT: &str = "You are a stock research analyst. Answer only with a JSON object in the requested layout. Do not add keys and do not add text outside the JSON.";

impl OpenAiWriter {
    pub fn new(
        api_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AnalystError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &ServerConfig) -> Result<Option<Self>, AnalystError> {
        config
            .openai_api_key
            .as_deref()
            .map(|key| {
                Self::new(
                    &config.openai_api_url,
                    key,
                    &config.openai_model,
                    config.upstream_timeout,
                )
            })
            .transpose()
    }
}

#[async_trait]
impl ReportWriter for OpenAiWriter {
    async fn write(
        &self,
        ticker: &Ticker,
        market: &MarketSnapshot,
    ) -> Result<Narrative, AnalystError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: build_prompt(ticker, market),
                },
            ],
            temperature: 0.0,
        };
        let url = format!("{}/chat/completions", self.api_url);
        tracing::debug!(%ticker, model = %self.model, "requesting report");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalystError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        let parsed: ChatResponse = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .find_map(|c| c.message)
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AnalystError::EmptyReply)?;
        Ok(Narrative::from_model_output(&content))
    }
}

fn money(value: Option<f64>) -> String {
    value.map(|v| format!("${v:.2}")).unwrap_or_default()
}

fn week_range(market: &MarketSnapshot) -> String {
    match (market.quote.fifty_two_week_low, market.quote.fifty_two_week_high) {
        (Some(lo), Some(hi)) => format!("${lo:.2} - ${hi:.2}"),
        _ => String::new(),
    }
}

/// Prompt with the report layout; known market figures are pre-filled.
pub fn build_prompt(ticker: &Ticker, market: &MarketSnapshot) -> String {
    let quote = &market.quote;
    let price_note = match quote.effective_price() {
        Some((_, true)) => "Real-time price is missing; the price given is the last close. Say so in the report.",
        _ => "",
    };
    let template = json!({
        "Company Overview": {
            "Market Cap": "",
            "Sector": "",
            "Industry": "",
            "Key Financials": {
                "Revenue (TTM)": "",
                "Net Income (TTM)": "",
                "EPS (TTM)": ""
            }
        },
        "Stock Performance": {
            "Current Price": money(quote.effective_price().map(|(p, _)| p)),
            "52-Week Range": week_range(market),
            "Volume (Avg.)": quote.volume.map(|v| v.to_string()).unwrap_or_default(),
            "Market Cap": ""
        },
        "Recent News": [
            { "Headline": "", "Summary": "", "Source": "", "Source Link": "" },
            { "Headline": "", "Summary": "", "Source": "", "Source Link": "" },
            { "Headline": "", "Summary": "", "Source": "", "Source Link": "" }
        ],
        "Analyst Ratings": {
            "Analyst Consensus": "",
            "Average Price Target": ""
        },
        "Technical Trend Analysis": {
            "50-Day Moving Average": "",
            "200-Day Moving Average": ""
        },
        "Final Buy/Hold/Sell Recommendation": {
            "Recommendation": "",
            "Reasoning": ""
        },
        "risk_factors": ["", "", ""],
        "bull_case": { "scenario": "", "price_target": "" },
        "bear_case": { "scenario": "", "price_target": "" },
        "investor_recommendations": {
            "conservative_investors": "",
            "moderate_investors": "",
            "aggressive_investors": ""
        }
    });
    let name = quote.name.as_deref().unwrap_or(ticker.as_str());
    format!(
        "Analyze {ticker} ({name}) and fill in every empty value of this JSON layout. \
         Keep the pre-filled values. Give the top 3 recent news items with https source links. \
         Give bull and bear price targets for 7, 15, 30, 60 and 90 days. {price_note}\n\n{template:#}"
    )
}

/// Report built from market data alone, used when no model is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarketOnlyWriter;

fn moving_average(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    Some(round_two(tail.iter().sum::<f64>() / window as f64))
}

fn money_value(value: Option<f64>) -> Value {
    value.map(|v| Value::String(format!("${v:.2}"))).unwrap_or(Value::Null)
}

impl MarketOnlyWriter {
    pub fn report(&self, market: &MarketSnapshot) -> StockReport {
        let quote = &market.quote;
        let closes = &market.series.close;

        let mut performance = Map::new();
        performance.insert(
            "Current Price".into(),
            money_value(quote.effective_price().map(|(p, _)| p)),
        );
        performance.insert("Previous Close".into(), money_value(quote.previous_close));
        performance.insert(
            "Exchange".into(),
            quote.exchange.clone().map(Value::String).unwrap_or(Value::Null),
        );
        let range = week_range(market);
        performance.insert(
            "52-Week Range".into(),
            if range.is_empty() { Value::Null } else { Value::String(range) },
        );
        performance.insert(
            "Volume".into(),
            quote.volume.map(Value::from).unwrap_or(Value::Null),
        );
        let change = match (closes.first(), closes.last()) {
            (Some(first), Some(last)) if *first != 0.0 => {
                Value::String(format!("{:+.2}%", (last - first) / first * 100.0))
            }
            _ => Value::Null,
        };
        performance.insert("Period Change".into(), change);

        let mut trend = Map::new();
        for window in [20usize, 50, 200] {
            trend.insert(
                format!("{window}-Day Moving Average"),
                money_value(moving_average(closes, window)),
            );
        }

        StockReport {
            stock_performance: performance,
            technical_trend: trend,
            analyst_ratings: AnalystRatings::default(),
            recommendation: Recommendation {
                call: None,
                reasoning: Some(Value::String(
                    "Narrative analysis is disabled; set OPENAI_API_KEY to enable it.".into(),
                )),
            },
            ..Default::default()
        }
    }
}

#[async_trait]
impl ReportWriter for MarketOnlyWriter {
    async fn write(
        &self,
        _ticker: &Ticker,
        market: &MarketSnapshot,
    ) -> Result<Narrative, AnalystError> {
        Ok(Narrative::from_report(self.report(market)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::QuoteSummary;
    use ts_core::PriceSeries;

    fn snapshot(closes: &[f64]) -> MarketSnapshot {
        let mut series = PriceSeries::default();
        for (i, c) in closes.iter().enumerate() {
            series.dates.push(format!("2024-01-{:02}", i + 1));
            series.open.push(*c);
            series.high.push(*c);
            series.low.push(*c);
            series.close.push(*c);
        }
        MarketSnapshot {
            quote: QuoteSummary {
                previous_close: Some(99.0),
                fifty_two_week_low: Some(80.0),
                fifty_two_week_high: Some(120.0),
                ..Default::default()
            },
            series,
        }
    }

    #[test]
    fn moving_average_needs_full_window() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(moving_average(&[1.0, 2.0], 3), None);
        assert_eq!(moving_average(&[1.0], 0), None);
    }

    #[test]
    fn exchange_is_not_reported_as_industry() {
        let mut market = snapshot(&[10.0, 11.0]);
        market.quote.exchange = Some("NasdaqGS".into());
        let report = MarketOnlyWriter.report(&market);
        assert_eq!(report.stock_performance["Exchange"], json!("NasdaqGS"));

        let html = Narrative::from_report(report).to_html();
        assert!(html.contains("<p><strong>Industry:</strong> N/A</p>"));
        assert!(html.contains("<p><strong>Exchange:</strong> NasdaqGS</p>"));
    }

    #[test]
    fn market_only_report_fills_what_it_knows() {
        let closes: Vec<f64> = (1..=25).map(|v| v as f64 * 4.0).collect();
        let report = MarketOnlyWriter.report(&snapshot(&closes));
        let perf = &report.stock_performance;
        assert_eq!(perf["Current Price"], json!("$99.00"));
        assert_eq!(perf["52-Week Range"], json!("$80.00 - $120.00"));
        assert_eq!(perf["Period Change"], json!("+2400.00%"));
        assert_eq!(report.technical_trend["20-Day Moving Average"], json!("$62.00"));
        assert_eq!(report.technical_trend["50-Day Moving Average"], Value::Null);
        assert!(report.recommendation.call.is_none());
    }

    #[tokio::test]
    async fn market_only_writer_yields_structured_narrative() {
        let ticker = Ticker::parse("ibm").unwrap();
        let narrative = MarketOnlyWriter
            .write(&ticker, &snapshot(&[10.0, 11.0]))
            .await
            .unwrap();
        let raw = narrative.raw_json().unwrap();
        assert_eq!(raw["Stock Performance"]["Period Change"], json!("+10.00%"));
        assert!(narrative.to_html().contains("<p><strong>Recommendation:</strong> N/A</p>"));
    }

    #[test]
    fn prompt_prefills_known_figures() {
        let ticker = Ticker::parse("ibm").unwrap();
        let prompt = build_prompt(&ticker, &snapshot(&[10.0]));
        assert!(prompt.starts_with("Analyze IBM (IBM)"));
        assert!(prompt.contains("\"52-Week Range\": \"$80.00 - $120.00\""));
        assert!(prompt.contains("last close"));
        assert!(prompt.contains("\"investor_recommendations\""));
    }
}
