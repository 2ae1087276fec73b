use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;
use thiserror::Error;
use ts_core::{AnalysisResponse, Ticker};

use crate::analyst::{AnalystError, ReportWriter};
use crate::market::{MarketError, MarketSource};
use crate::report::{price_message_html, DISCLAIMER_HTML};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Please enter a valid stock ticker.")]
    EmptyTicker,
    #[error("No stock data found for {0}.")]
    NoData(Ticker),
    #[error("Error processing request: {0}")]
    Market(#[from] MarketError),
    #[error("Error processing request: {0}")]
    Report(#[from] AnalystError),
}

/// Market source and report writer behind `/analyze`.
pub struct AnalysisService {
    market: Arc<dyn MarketSource>,
    writer: Arc<dyn ReportWriter>,
}

impl AnalysisService {
    pub fn new(market: Arc<dyn MarketSource>, writer: Arc<dyn ReportWriter>) -> Self {
        Self { market, writer }
    }

    pub async fn analyze(&self, raw_ticker: &str) -> Result<AnalysisResponse, AnalyzeError> {
        let ticker = Ticker::parse(raw_ticker).ok_or(AnalyzeError::EmptyTicker)?;

        let snapshot = self.market.snapshot(&ticker).await?;
        if snapshot.series.is_empty() {
            return Err(AnalyzeError::NoData(ticker));
        }

        let narrative = self.writer.write(&ticker, &snapshot).await?;
        let mut result = price_message_html(&snapshot.quote);
        result.push_str(&narrative.to_html());

        Ok(AnalysisResponse {
            error: None,
            result: Some(result),
            disclaimer: Some(DISCLAIMER_HTML.to_string()),
            plot_data: Some(snapshot.series),
            raw_json: narrative.raw_json(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub ticker: String,
}

/// `POST /analyze`. Failures are reported in the `error` field with status 200.
pub async fn analyze_handler(
    State(service): State<Arc<AnalysisService>>,
    Form(form): Form<AnalyzeForm>,
) -> Json<AnalysisResponse> {
    match service.analyze(&form.ticker).await {
        Ok(response) => {
            let bars = response.plot_data.as_ref().map_or(0, |s| s.len());
            tracing::info!(ticker = %form.ticker.trim(), bars, "analysis ready");
            Json(response)
        }
        Err(err) => {
            match &err {
                AnalyzeError::Market(_) | AnalyzeError::Report(_) => {
                    tracing::error!(ticker = %form.ticker.trim(), error = %err, "analysis failed")
                }
                _ => tracing::info!(ticker = %form.ticker.trim(), error = %err, "analysis rejected"),
            }
            Json(AnalysisResponse::failure(err.to_string()))
        }
    }
}
