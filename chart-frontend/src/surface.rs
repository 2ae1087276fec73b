use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use ts_core::{PriceSeries, SeriesError, Ticker};

use crate::figure::Figure;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("element `{0}` not found")]
    MissingElement(String),
    #[error("dom error: {0}")]
    Dom(String),
}

/// Element ids the chart renders into and listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTargets {
    pub inline: String,
    pub full_screen_container: String,
    pub full_screen_graph: String,
    pub show_full_screen: String,
    pub close_full_screen: String,
}

impl Default for ChartTargets {
    fn default() -> Self {
        Self {
            inline: "stockGraph".into(),
            full_screen_container: "fullPageGraphContainer".into(),
            full_screen_graph: "fullPageGraph".into(),
            show_full_screen: "fullScreenGraphBtn".into(),
            close_full_screen: "closeFullScreenGraphBtn".into(),
        }
    }
}

/// The figure the full-screen handlers read when they fire.
///
/// Handlers hold a clone of the slot; a new render swaps the figure in place.
#[derive(Debug, Clone, Default)]
pub struct FigureSlot(Rc<RefCell<Option<Figure>>>);

impl FigureSlot {
    pub fn replace(&self, figure: Figure) {
        *self.0.borrow_mut() = Some(figure);
    }

    pub fn current(&self) -> Option<Figure> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }
}

/// Something that can draw figures into containers and wire the full-screen toggle.
pub trait ChartSurface {
    /// Replace the container's content with `figure`.
    fn plot(&self, container: &str, figure: &Figure) -> Result<(), ChartError>;

    /// Replace the container's content with raw markup.
    fn set_html(&self, container: &str, html: &str) -> Result<(), ChartError>;

    /// Attach show/close handlers. Called at most once per `StockChart`, even
    /// when it fails, so it should attach either both handlers or none.
    fn bind_full_screen(&self, targets: &ChartTargets, slot: FigureSlot) -> Result<(), ChartError>;
}

/// Inline price chart with a full-screen companion view.
pub struct StockChart<S> {
    surface: S,
    targets: ChartTargets,
    slot: FigureSlot,
    bound: Cell<bool>,
}

impl<S: ChartSurface> StockChart<S> {
    pub fn new(surface: S, targets: ChartTargets) -> Self {
        Self {
            surface,
            targets,
            slot: FigureSlot::default(),
            bound: Cell::new(false),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn targets(&self) -> &ChartTargets {
        &self.targets
    }

    /// Figure the full-screen view would show right now.
    pub fn current_figure(&self) -> Option<Figure> {
        self.slot.current()
    }

    /// Draw `series` inline and make it the full-screen figure.
    ///
    /// On error the full-screen slot is left empty; the inline container is
    /// left for the caller to replace with a notice.
    pub fn render(&self, series: &PriceSeries, ticker: &Ticker) -> Result<(), ChartError> {
        self.slot.clear();
        let figure = Figure::stock_chart(series, ticker)?;
        // Never retried: each button gets at most one handler.
        if !self.bound.replace(true) {
            self.surface.bind_full_screen(&self.targets, self.slot.clone())?;
        }
        self.surface.plot(&self.targets.inline, &figure)?;
        self.slot.replace(figure);
        Ok(())
    }

    /// Show a notice in place of the inline chart.
    pub fn show_notice(&self, html: &str) -> Result<(), ChartError> {
        self.slot.clear();
        self.surface.set_html(&self.targets.inline, html)
    }

    /// Empty the inline container.
    pub fn clear(&self) -> Result<(), ChartError> {
        self.show_notice("")
    }
}
