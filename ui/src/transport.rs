use futures_util::future::LocalBoxFuture;
use gloo_net::http::Request;
use js_sys::encode_uri_component;
use ts_core::{AnalysisResponse, Ticker};

use crate::controller::{AnalysisTransport, TransportError};

/// `POST {api_base}/analyze` with a form-encoded `ticker` field.
pub struct HttpTransport {
    api_base: String,
}

impl HttpTransport {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/analyze", self.api_base.trim_end_matches('/'))
    }
}

impl AnalysisTransport for HttpTransport {
    fn analyze<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> LocalBoxFuture<'a, Result<AnalysisResponse, TransportError>> {
        Box::pin(async move {
            let body = format!(
                "ticker={}",
                String::from(encode_uri_component(ticker.as_str()))
            );
            let resp = Request::post(&self.url())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body)
                .map_err(|e| TransportError::Network(e.to_string()))?
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            if !resp.ok() {
                return Err(TransportError::Status(resp.status()));
            }
            resp.json::<AnalysisResponse>()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))
        })
    }
}
