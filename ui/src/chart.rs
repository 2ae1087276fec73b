use leptos::*;

#[cfg(target_arch = "wasm32")]
use chart_frontend::{CanvasSurface, StockChart};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
pub type PageChart = Rc<StockChart<CanvasSurface>>;
#[cfg(not(target_arch = "wasm32"))]
pub type PageChart = ();

#[cfg(target_arch = "wasm32")]
pub fn page_chart() -> PageChart {
    Rc::new(StockChart::new(CanvasSurface::default(), Default::default()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn page_chart() -> PageChart {}

/// Inline chart container plus the hidden full-screen overlay.
///
/// The containers are owned by the chart renderer; Leptos only lays them out.
/// The full-screen buttons get their handlers from the renderer on first draw.
#[component]
pub fn ChartPanel(chart: PageChart) -> impl IntoView {
    #[cfg(not(target_arch = "wasm32"))]
    let _ = &chart;

    let close_graph = move |_| {
        #[cfg(target_arch = "wasm32")]
        if let Err(err) = chart.clear() {
            web_sys::console::error_1(&err.to_string().into());
        }
    };

    view! {
        <div class="chart-section">
            <div class="flex-between">
                <div class="section-label">Price chart</div>
                <div class="flex-row">
                    <button id="fullScreenGraphBtn" type="button" class="btn ghost">Full screen</button>
                    <button id="closeGraphBtn" type="button" class="btn ghost" on:click=close_graph>Close graph</button>
                </div>
            </div>
            <div id="stockGraph" class="chart-container"></div>
        </div>
        <div id="fullPageGraphContainer" class="full-page-graph" style="display: none;">
            <div class="flex-between">
                <div class="section-label">Full screen chart</div>
                <button id="closeFullScreenGraphBtn" type="button" class="btn ghost">Close</button>
            </div>
            <div id="fullPageGraph"></div>
        </div>
    }
}
