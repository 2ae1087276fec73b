use serde::Serialize;
use ts_core::{PriceSeries, SeriesError, Ticker};

pub const PLOT_BG: &str = "#1e1e1e";
pub const PAPER_BG: &str = "#121212";
pub const FONT_COLOR: &str = "#ffffff";
pub const COLOR_UP: &str = "#3fb68b";
pub const COLOR_DOWN: &str = "#f0635c";

/// Space left for chrome when the full-screen view sizes itself to the viewport.
pub const FULL_SCREEN_MARGIN: f64 = 100.0;

/// One candlestick series, columns copied from the price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickTrace {
    pub name: String,
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl CandlestickTrace {
    /// Build the trace for `ticker`. Refuses series whose columns disagree in length.
    pub fn from_series(series: &PriceSeries, ticker: &Ticker) -> Result<Self, SeriesError> {
        series.validate()?;
        Ok(Self {
            name: format!("{ticker} Stock"),
            x: series.dates.clone(),
            open: series.open.clone(),
            high: series.high.clone(),
            low: series.low.clone(),
            close: series.close.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn is_bullish(&self, idx: usize) -> bool {
        self.close[idx] >= self.open[idx]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub font_color: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub show_grid: bool,
    pub show_legend: bool,
    pub color_up: &'static str,
    pub color_down: &'static str,
    /// Fixed pixel height; `None` follows the container.
    pub height: Option<f64>,
}

impl ChartLayout {
    /// The page's fixed dark theme.
    pub fn dark(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            plot_bgcolor: PLOT_BG,
            paper_bgcolor: PAPER_BG,
            font_color: FONT_COLOR,
            x_title: "Date",
            y_title: "Price (USD)",
            show_grid: false,
            show_legend: true,
            color_up: COLOR_UP,
            color_down: COLOR_DOWN,
            height: None,
        }
    }
}

/// Traces plus layout, everything a surface needs to draw a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub traces: Vec<CandlestickTrace>,
    pub layout: ChartLayout,
}

impl Figure {
    /// Single-trace price chart for the analysis page.
    pub fn stock_chart(series: &PriceSeries, ticker: &Ticker) -> Result<Self, SeriesError> {
        let trace = CandlestickTrace::from_series(series, ticker)?;
        Ok(Self {
            traces: vec![trace],
            layout: ChartLayout::dark(format!("Stock Price for {ticker}")),
        })
    }

    /// Same traces, retitled and sized to the viewport.
    pub fn full_screen(&self, viewport_height: f64) -> Self {
        let mut layout = self.layout.clone();
        layout.title = format!("{} (Full Screen)", self.layout.title);
        layout.height = Some(viewport_height - FULL_SCREEN_MARGIN);
        Self {
            traces: self.traces.clone(),
            layout,
        }
    }
}
