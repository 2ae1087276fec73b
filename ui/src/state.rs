use leptos::*;

/// Reactive bits of the page the submission controller writes to.
#[derive(Clone, Copy)]
pub struct PageState {
    pub ticker: RwSignal<String>,
    pub busy: RwSignal<bool>,
    pub results_visible: RwSignal<bool>,
    pub result_html: RwSignal<String>,
    pub disclaimer_html: RwSignal<String>,
}

impl PageState {
    pub fn new() -> Self {
        Self {
            ticker: create_rw_signal(String::new()),
            busy: create_rw_signal(false),
            results_visible: create_rw_signal(false),
            result_html: create_rw_signal(String::new()),
            disclaimer_html: create_rw_signal(String::new()),
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}
