//! Candlestick chart for the analysis page.
//!
//! Figure building and pixel projection are plain Rust; drawing goes through a
//! [`ChartSurface`], which is a canvas in the browser build.

pub mod figure;
pub mod geometry;
pub mod surface;

#[cfg(target_arch = "wasm32")]
mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use figure::{CandlestickTrace, ChartLayout, Figure};
pub use geometry::{project, PlotArea, PlotCandle, Projection};
pub use surface::{ChartError, ChartSurface, ChartTargets, FigureSlot, StockChart};
