pub mod app;
pub mod autocomplete;
pub mod chart;
pub mod controller;
pub mod state;
pub mod theme;
#[cfg(target_arch = "wasm32")]
pub mod transport;

pub use app::App;
pub use controller::{AnalysisTransport, AnalysisView, Outcome, Phase, SubmissionController};

#[cfg(all(any(feature = "csr", feature = "hydrate"), target_arch = "wasm32"))]
use leptos::*;
#[cfg(all(any(feature = "csr", feature = "hydrate"), target_arch = "wasm32"))]
use wasm_bindgen::prelude::*;

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
#[wasm_bindgen]
pub fn start() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(|| view! { <App/> });
}

#[cfg(all(feature = "hydrate", target_arch = "wasm32"))]
#[wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(|| view! { <App/> });
}
