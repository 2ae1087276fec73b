use leptos::*;
use ts_core::{suggest, TickerSuggestion, TICKER_CATALOG};

/// Open suggestion list with a keyboard highlight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    items: Vec<TickerSuggestion>,
    highlight: Option<usize>,
}

impl Suggestions {
    pub fn for_query(query: &str) -> Self {
        let items: Vec<TickerSuggestion> = suggest(query, TICKER_CATALOG).into_iter().copied().collect();
        Self {
            highlight: None,
            items,
        }
    }

    pub fn items(&self) -> &[TickerSuggestion] {
        &self.items
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn is_open(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn move_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.highlight = Some(match self.highlight {
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    pub fn move_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        self.highlight = Some(match self.highlight {
            Some(0) | None => last,
            Some(i) => i - 1,
        });
    }

    /// Canonical value under the highlight.
    pub fn highlighted_value(&self) -> Option<&'static str> {
        self.highlight.and_then(|i| self.items.get(i)).map(|s| s.value)
    }

    pub fn close(&mut self) {
        self.items.clear();
        self.highlight = None;
    }
}

/// Ticker text field with catalog suggestions.
///
/// Picking a suggestion writes its canonical value (e.g. `RELIANCE.NS`) into `value`.
#[component]
pub fn TickerInput(value: RwSignal<String>) -> impl IntoView {
    let suggestions = create_rw_signal(Suggestions::default());

    let select = move |picked: &'static str| {
        value.set(picked.to_string());
        suggestions.update(Suggestions::close);
    };

    let on_input = move |ev: ev::Event| {
        let text = event_target_value(&ev);
        suggestions.set(Suggestions::for_query(&text));
        value.set(text);
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if !suggestions.with_untracked(Suggestions::is_open) {
            return;
        }
        match ev.key().as_str() {
            "ArrowDown" => {
                ev.prevent_default();
                suggestions.update(Suggestions::move_down);
            }
            "ArrowUp" => {
                ev.prevent_default();
                suggestions.update(Suggestions::move_up);
            }
            "Enter" => {
                if let Some(picked) = suggestions.with_untracked(Suggestions::highlighted_value) {
                    // Keep the form from submitting on the same keystroke.
                    ev.prevent_default();
                    select(picked);
                }
            }
            "Escape" => suggestions.update(Suggestions::close),
            _ => {}
        }
    };

    view! {
        <div class="autocomplete">
            <input
                id="ticker"
                name="ticker"
                type="text"
                class="form-control"
                placeholder="Enter stock ticker (e.g. AAPL, TCS.NS)"
                autocomplete="off"
                prop:value=move || value.get()
                on:input=on_input
                on:keydown=on_keydown
                on:blur=move |_| suggestions.update(Suggestions::close)
            />
            <Show when=move || suggestions.with(Suggestions::is_open)>
                <ul class="autocomplete-list" role="listbox">
                    {move || {
                        let current = suggestions.get();
                        current
                            .items()
                            .iter()
                            .enumerate()
                            .map(|(idx, item)| {
                                let picked = item.value;
                                let class = if current.highlight() == Some(idx) {
                                    "autocomplete-item active"
                                } else {
                                    "autocomplete-item"
                                };
                                view! {
                                    // mousedown fires before the input's blur closes the list.
                                    <li class=class on:mousedown=move |ev| {
                                        ev.prevent_default();
                                        select(picked);
                                    }>
                                        <div>{item.label}</div>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </Show>
        </div>
    }
}
