use std::cell::Cell;

use futures_util::future::LocalBoxFuture;
use thiserror::Error;
use ts_core::{AnalysisResponse, PriceSeries, Ticker};

pub const EMPTY_TICKER_ALERT: &str = "Please enter a stock ticker.";
pub const LOADING_HTML: &str = "<p class='text-light'>Loading analysis...</p>";
pub const NO_CHART_DATA_HTML: &str =
    "<p class='text-warning'>No stock data available for chart.</p>";
pub const TRANSPORT_ERROR_HTML: &str =
    "<div class=\"alert alert-danger\">Error retrieving stock data.</div>";

/// Inline alert for an error reported by the server. The message is trusted markup.
pub fn error_alert_html(message: &str) -> String {
    format!("<div class=\"alert alert-danger\">{message}</div>")
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("unreadable response: {0}")]
    Decode(String),
}

/// Carries one ticker to the analysis endpoint.
pub trait AnalysisTransport {
    fn analyze<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> LocalBoxFuture<'a, Result<AnalysisResponse, TransportError>>;
}

/// Page elements the controller drives.
pub trait AnalysisView {
    /// Blocking message box.
    fn alert(&self, message: &str);
    /// Disable the submit control and swap button text for the spinner, or undo it.
    fn set_busy(&self, busy: bool);
    fn set_results_visible(&self, visible: bool);
    fn set_result_html(&self, html: &str);
    fn set_disclaimer_html(&self, html: &str);
    fn set_chart_notice(&self, html: &str);
    /// Draw the candlestick chart. Returns false when nothing was drawn.
    fn render_chart(&self, series: &PriceSeries, ticker: &Ticker) -> bool;
    /// Diagnostic sink for a failed request; the page itself shows a generic message.
    fn log_transport_error(&self, err: &TransportError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Busy,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Blank input; nothing was sent.
    Rejected,
    /// The server answered with an `error` field.
    ServerError(String),
    /// Result markup was written; `charted` tells whether a chart was drawn.
    Rendered { charted: bool },
    TransportFailed,
}

/// Form submission flow: validate, go busy, send once, dispatch, go idle.
///
/// Overlapping submissions are not cancelled; the disabled submit control is
/// the only guard against them.
pub struct SubmissionController<V, T> {
    view: V,
    transport: T,
    phase: Cell<Phase>,
}

impl<V: AnalysisView, T: AnalysisTransport> SubmissionController<V, T> {
    pub fn new(view: V, transport: T) -> Self {
        Self {
            view,
            transport,
            phase: Cell::new(Phase::Idle),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn submit(&self, raw: &str) -> Outcome {
        let Some(ticker) = Ticker::parse(raw) else {
            self.view.alert(EMPTY_TICKER_ALERT);
            return Outcome::Rejected;
        };

        self.enter(Phase::Busy);
        self.view.set_results_visible(false);
        self.view.set_result_html(LOADING_HTML);

        let outcome = match self.transport.analyze(&ticker).await {
            Ok(response) => self.dispatch(&ticker, &response),
            Err(err) => {
                self.view.log_transport_error(&err);
                self.view.set_result_html(TRANSPORT_ERROR_HTML);
                Outcome::TransportFailed
            }
        };

        self.enter(Phase::Idle);
        outcome
    }

    fn dispatch(&self, ticker: &Ticker, response: &AnalysisResponse) -> Outcome {
        if let Some(message) = response.error_message() {
            self.view.set_result_html(&error_alert_html(message));
            return Outcome::ServerError(message.to_string());
        }

        self.view
            .set_result_html(response.result.as_deref().unwrap_or_default());
        self.view
            .set_disclaimer_html(response.disclaimer.as_deref().unwrap_or_default());
        // Reveal first so the chart container has a layout size to draw into.
        self.view.set_results_visible(true);

        let charted = response
            .chart_series()
            .is_some_and(|series| self.view.render_chart(series, ticker));
        if !charted {
            self.view.set_chart_notice(NO_CHART_DATA_HTML);
        }
        Outcome::Rendered { charted }
    }

    fn enter(&self, phase: Phase) {
        self.phase.set(phase);
        self.view.set_busy(phase == Phase::Busy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Alert(String),
        Busy(bool),
        Visible(bool),
        Result(String),
        Disclaimer(String),
        Notice(String),
        Chart { ticker: String, points: usize },
        TransportLog(String),
    }

    #[derive(Default, Clone)]
    struct RecordingView {
        calls: Rc<RefCell<Vec<Call>>>,
        refuse_charts: Rc<Cell<bool>>,
    }

    impl RecordingView {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn push(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl AnalysisView for RecordingView {
        fn alert(&self, message: &str) {
            self.push(Call::Alert(message.into()));
        }
        fn set_busy(&self, busy: bool) {
            self.push(Call::Busy(busy));
        }
        fn set_results_visible(&self, visible: bool) {
            self.push(Call::Visible(visible));
        }
        fn set_result_html(&self, html: &str) {
            self.push(Call::Result(html.into()));
        }
        fn set_disclaimer_html(&self, html: &str) {
            self.push(Call::Disclaimer(html.into()));
        }
        fn set_chart_notice(&self, html: &str) {
            self.push(Call::Notice(html.into()));
        }
        fn render_chart(&self, series: &PriceSeries, ticker: &Ticker) -> bool {
            self.push(Call::Chart {
                ticker: ticker.to_string(),
                points: series.len(),
            });
            !self.refuse_charts.get()
        }
        fn log_transport_error(&self, err: &TransportError) {
            self.push(Call::TransportLog(err.to_string()));
        }
    }

    /// Replays a canned reply and records what it was asked for.
    struct FakeTransport {
        reply: RefCell<Option<Result<AnalysisResponse, TransportError>>>,
        sent: RefCell<Vec<String>>,
        // Phase observed while the request is in flight.
        seen_busy: Rc<RefCell<Vec<bool>>>,
        view: RecordingView,
    }

    impl FakeTransport {
        fn new(view: &RecordingView, reply: Result<AnalysisResponse, TransportError>) -> Self {
            Self {
                reply: RefCell::new(Some(reply)),
                sent: RefCell::new(Vec::new()),
                seen_busy: Rc::default(),
                view: view.clone(),
            }
        }
    }

    impl AnalysisTransport for FakeTransport {
        fn analyze<'a>(
            &'a self,
            ticker: &'a Ticker,
        ) -> LocalBoxFuture<'a, Result<AnalysisResponse, TransportError>> {
            Box::pin(async move {
                self.sent.borrow_mut().push(ticker.to_string());
                let busy = self
                    .view
                    .calls()
                    .iter()
                    .rev()
                    .find_map(|c| match c {
                        Call::Busy(b) => Some(*b),
                        _ => None,
                    })
                    .unwrap_or(false);
                self.seen_busy.borrow_mut().push(busy);
                self.reply
                    .borrow_mut()
                    .take()
                    .unwrap_or_else(|| Err(TransportError::Network("no reply queued".into())))
            })
        }
    }

    fn series(n: usize) -> PriceSeries {
        PriceSeries {
            dates: (0..n).map(|i| format!("2024-04-{:02}", i + 1)).collect(),
            open: vec![10.0; n],
            high: vec![11.0; n],
            low: vec![9.0; n],
            close: vec![10.5; n],
            volume: Some(vec![1_000.0; n]),
        }
    }

    fn ok_response(plot: Option<PriceSeries>) -> AnalysisResponse {
        AnalysisResponse {
            result: Some("<h2>RECENT NEWS</h2>".into()),
            disclaimer: Some("<div class='alert alert-warning'>Disclaimer</div>".into()),
            plot_data: plot,
            ..Default::default()
        }
    }

    fn controller(
        reply: Result<AnalysisResponse, TransportError>,
    ) -> SubmissionController<RecordingView, FakeTransport> {
        let view = RecordingView::default();
        let transport = FakeTransport::new(&view, reply);
        SubmissionController::new(view, transport)
    }

    fn busy_toggles(calls: &[Call]) -> Vec<bool> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::Busy(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn blank_ticker_alerts_without_request() {
        for raw in ["", "   ", "\t\n"] {
            let ctrl = controller(Ok(ok_response(None)));
            assert_eq!(ctrl.submit(raw).await, Outcome::Rejected);
            assert_eq!(ctrl.view().calls(), vec![Call::Alert(EMPTY_TICKER_ALERT.into())]);
            assert!(ctrl.transport().sent.borrow().is_empty());
            assert_eq!(ctrl.phase(), Phase::Idle);
        }
    }

    #[tokio::test]
    async fn ticker_is_normalized_before_sending() {
        let ctrl = controller(Ok(ok_response(None)));
        ctrl.submit("  nvda ").await;
        assert_eq!(*ctrl.transport().sent.borrow(), vec!["NVDA".to_string()]);
    }

    #[tokio::test]
    async fn busy_spans_the_request_for_every_outcome() {
        let replies = vec![
            Ok(ok_response(Some(series(3)))),
            Ok(AnalysisResponse::failure("No stock data found for XYZ.")),
            Err(TransportError::Status(502)),
        ];
        for reply in replies {
            let ctrl = controller(reply);
            ctrl.submit("xyz").await;
            assert_eq!(*ctrl.transport().seen_busy.borrow(), vec![true]);
            assert_eq!(busy_toggles(&ctrl.view().calls()), vec![true, false]);
            assert_eq!(ctrl.phase(), Phase::Idle);
        }
    }

    #[tokio::test]
    async fn loading_placeholder_precedes_request() {
        let ctrl = controller(Ok(ok_response(None)));
        ctrl.submit("ko").await;
        let calls = ctrl.view().calls();
        assert_eq!(calls[1], Call::Visible(false));
        assert_eq!(calls[2], Call::Result(LOADING_HTML.into()));
    }

    #[tokio::test]
    async fn server_error_renders_only_the_alert() {
        let mut reply = AnalysisResponse::failure("Please enter a valid stock ticker.");
        reply.plot_data = Some(series(4));
        let ctrl = controller(Ok(reply));
        let outcome = ctrl.submit("aapl").await;
        assert_eq!(outcome, Outcome::ServerError("Please enter a valid stock ticker.".into()));

        let calls = ctrl.view().calls();
        assert_eq!(
            calls.last().cloned(),
            Some(Call::Busy(false)),
        );
        assert!(calls.contains(&Call::Result(
            "<div class=\"alert alert-danger\">Please enter a valid stock ticker.</div>".into()
        )));
        assert!(!calls.iter().any(|c| matches!(
            c,
            Call::Chart { .. } | Call::Notice(_) | Call::Disclaimer(_) | Call::Visible(true)
        )));
    }

    #[tokio::test]
    async fn series_with_points_is_charted_once() {
        let ctrl = controller(Ok(ok_response(Some(series(5)))));
        assert_eq!(ctrl.submit("msft").await, Outcome::Rendered { charted: true });
        let calls = ctrl.view().calls();
        let charts: Vec<_> = calls.iter().filter(|c| matches!(c, Call::Chart { .. })).collect();
        assert_eq!(
            charts,
            vec![&Call::Chart {
                ticker: "MSFT".into(),
                points: 5
            }]
        );
        assert!(calls.contains(&Call::Result("<h2>RECENT NEWS</h2>".into())));
        assert!(calls.contains(&Call::Disclaimer(
            "<div class='alert alert-warning'>Disclaimer</div>".into()
        )));
        assert!(calls.contains(&Call::Visible(true)));
        assert!(!calls.iter().any(|c| matches!(c, Call::Notice(_))));
    }

    #[tokio::test]
    async fn empty_or_missing_series_shows_notice() {
        for plot in [None, Some(PriceSeries::default())] {
            let ctrl = controller(Ok(ok_response(plot)));
            assert_eq!(ctrl.submit("pep").await, Outcome::Rendered { charted: false });
            let calls = ctrl.view().calls();
            assert!(calls.contains(&Call::Notice(NO_CHART_DATA_HTML.into())));
            assert!(!calls.iter().any(|c| matches!(c, Call::Chart { .. })));
        }
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_error_and_goes_idle() {
        let ctrl = controller(Err(TransportError::Network("connection refused".into())));
        assert_eq!(ctrl.submit("tsla").await, Outcome::TransportFailed);
        let calls = ctrl.view().calls();
        assert_eq!(
            &calls[calls.len() - 3..],
            &[
                Call::TransportLog("request failed: connection refused".into()),
                Call::Result(TRANSPORT_ERROR_HTML.into()),
                Call::Busy(false)
            ]
        );
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn refused_series_falls_back_to_notice() {
        let ctrl = controller(Ok(ok_response(Some(series(2)))));
        ctrl.view().refuse_charts.set(true);
        assert_eq!(ctrl.submit("msft").await, Outcome::Rendered { charted: false });
        let calls = ctrl.view().calls();
        let chart_at = calls
            .iter()
            .position(|c| matches!(c, Call::Chart { .. }))
            .unwrap();
        let notice_at = calls
            .iter()
            .position(|c| *c == Call::Notice(NO_CHART_DATA_HTML.into()))
            .unwrap();
        assert!(chart_at < notice_at);
        assert!(calls.contains(&Call::Result("<h2>RECENT NEWS</h2>".into())));
    }

    #[tokio::test]
    async fn controller_is_reusable_after_failure() {
        let view = RecordingView::default();
        let transport = FakeTransport::new(&view, Err(TransportError::Decode("eof".into())));
        let ctrl = SubmissionController::new(view, transport);
        assert_eq!(ctrl.submit("ko").await, Outcome::TransportFailed);
        *ctrl.transport().reply.borrow_mut() = Some(Ok(ok_response(Some(series(1)))));
        assert_eq!(ctrl.submit("ko").await, Outcome::Rendered { charted: true });
        assert_eq!(busy_toggles(&ctrl.view().calls()), vec![true, false, true, false]);
    }
}
