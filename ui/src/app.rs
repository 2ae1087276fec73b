use crate::{
    autocomplete::TickerInput,
    chart::{page_chart, ChartPanel, PageChart},
    controller::{AnalysisView, TransportError},
    state::PageState,
    theme::GLOBAL_CSS,
};
use leptos::*;
use leptos_meta::*;
use ts_core::{PriceSeries, Ticker};

#[cfg(target_arch = "wasm32")]
use crate::{controller::SubmissionController, transport::HttpTransport};
#[cfg(target_arch = "wasm32")]
use js_sys::Reflect;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

#[cfg(target_arch = "wasm32")]
fn read_global(key: &str) -> Option<String> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

/// Analysis endpoint base; empty means same origin.
fn api_base_default() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        read_global("STOCK_ANALYSIS_API_BASE").unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}

/// Signals and chart behind the controller's view of the page.
#[derive(Clone)]
pub struct PageView {
    page: PageState,
    chart: PageChart,
}

impl AnalysisView for PageView {
    fn alert(&self, message: &str) {
        if let Some(win) = web_sys::window() {
            let _ = win.alert_with_message(message);
        }
    }

    fn set_busy(&self, busy: bool) {
        self.page.busy.set(busy);
    }

    fn set_results_visible(&self, visible: bool) {
        self.page.results_visible.set(visible);
    }

    fn set_result_html(&self, html: &str) {
        self.page.result_html.set(html.to_string());
    }

    fn set_disclaimer_html(&self, html: &str) {
        self.page.disclaimer_html.set(html.to_string());
    }

    fn set_chart_notice(&self, html: &str) {
        #[cfg(target_arch = "wasm32")]
        if let Err(err) = self.chart.show_notice(html) {
            web_sys::console::error_1(&err.to_string().into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = html;
    }

    fn render_chart(&self, series: &PriceSeries, ticker: &Ticker) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            match self.chart.render(series, ticker) {
                Ok(()) => true,
                Err(err) => {
                    web_sys::console::error_1(&err.to_string().into());
                    false
                }
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (series, ticker);
            false
        }
    }

    fn log_transport_error(&self, err: &TransportError) {
        web_sys::console::error_1(&format!("analysis request: {err}").into());
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let api_base = api_base_default();
    let page = PageState::new();
    let chart = page_chart();
    let view_handle = PageView {
        page,
        chart: chart.clone(),
    };

    #[cfg(target_arch = "wasm32")]
    let controller = Rc::new(SubmissionController::new(
        view_handle,
        HttpTransport::new(api_base),
    ));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (api_base, view_handle);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        #[cfg(target_arch = "wasm32")]
        {
            let controller = controller.clone();
            let raw = page.ticker.get_untracked();
            spawn_local(async move {
                controller.submit(&raw).await;
            });
        }
    };

    view! {
        <Title text="Stock Analysis"/>
        <Style>{GLOBAL_CSS}</Style>
        <div class="page">
            <header class="panel topbar">
                <h1>Stock Analysis</h1>
                <span class="chip">AI-assisted research</span>
            </header>

            <form id="stockForm" class="panel form-row" on:submit=on_submit>
                <TickerInput value=page.ticker/>
                <button type="submit" class="btn primary" disabled=move || page.busy.get()>
                    <span id="button-text" class=move || if page.busy.get() { "d-none" } else { "" }>
                        Analyze
                    </span>
                    <span
                        id="loading-spinner"
                        class=move || if page.busy.get() { "status-spinner" } else { "status-spinner d-none" }
                    ></span>
                </button>
            </form>

            <div id="resultContent" class="result-content" inner_html=move || page.result_html.get()></div>

            <section
                id="resultBox"
                class="panel result-box"
                style:display=move || if page.results_visible.get() { "block" } else { "none" }
            >
                <ChartPanel chart=chart/>
                <div id="disclaimer" inner_html=move || page.disclaimer_html.get()></div>
            </section>
        </div>
    }
}
