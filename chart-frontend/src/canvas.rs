use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use crate::figure::{CandlestickTrace, Figure};
use crate::geometry::{project, PlotArea, PlotCandle, Projection};
use crate::surface::{ChartError, ChartSurface, ChartTargets, FigureSlot};

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 450.0;
const FONT: &str = "12px 'Inter', sans-serif";
const TITLE_FONT: &str = "16px 'Inter', sans-serif";

trait RendererBackend {
    fn begin_frame(&mut self, width: f64, height: f64, clear_color: &str);
    fn fill_area(&mut self, area: &PlotArea, color: &str);
    fn draw_candles(&mut self, candles: &[PlotCandle], color_up: &str, color_down: &str);
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str, align: &str);
}

struct CanvasBackend {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasBackend {
    fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }
}

impl RendererBackend for CanvasBackend {
    fn begin_frame(&mut self, width: f64, height: f64, clear_color: &str) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.ctx.set_fill_style_str(clear_color);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn fill_area(&mut self, area: &PlotArea, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(area.left, area.top, area.width, area.height);
    }

    fn draw_candles(&mut self, candles: &[PlotCandle], color_up: &str, color_down: &str) {
        let ctx = &self.ctx;
        ctx.set_line_width(1.0);
        for c in candles {
            let color = if c.bullish { color_up } else { color_down };
            ctx.set_stroke_style_str(color);
            ctx.set_fill_style_str(color);
            ctx.begin_path();
            ctx.move_to(c.x, c.y_high);
            ctx.line_to(c.x, c.y_low);
            ctx.stroke();

            let body_top = c.y_open.min(c.y_close);
            let body_bottom = c.y_open.max(c.y_close);
            let body_h = (body_bottom - body_top).max(1.0);
            ctx.fill_rect(c.x - c.half_w, body_top, c.half_w * 2.0, body_h);
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str, align: &str) {
        self.ctx.set_font(font);
        self.ctx.set_fill_style_str(color);
        self.ctx.set_text_align(align);
        self.ctx.fill_text(text, x, y).ok();
    }
}

fn paint(backend: &mut impl RendererBackend, figure: &Figure, width: f64, height: f64) {
    let layout = &figure.layout;
    backend.begin_frame(width, height, layout.paper_bgcolor);
    let title_y = 28.0;
    backend.draw_text(&layout.title, width / 2.0, title_y, TITLE_FONT, layout.font_color, "center");

    let Some(trace) = figure.traces.first() else {
        return;
    };
    let Some(proj) = project(trace, width, height) else {
        backend.fill_area(&PlotArea::within(width, height), layout.plot_bgcolor);
        return;
    };
    backend.fill_area(&proj.area, layout.plot_bgcolor);
    backend.draw_candles(&proj.candles, layout.color_up, layout.color_down);
    draw_axes(backend, figure, &proj);
    if layout.show_legend {
        draw_legend(backend, figure, trace, &proj.area);
    }
}

fn draw_axes(backend: &mut impl RendererBackend, figure: &Figure, proj: &Projection) {
    let color = figure.layout.font_color;
    let area = &proj.area;
    for tick in &proj.price_ticks {
        backend.draw_text(&tick.label, area.left - 6.0, tick.pos + 4.0, FONT, color, "right");
    }
    for tick in &proj.date_ticks {
        backend.draw_text(&tick.label, tick.pos, area.bottom() + 16.0, FONT, color, "center");
    }
    backend.draw_text(
        figure.layout.x_title,
        area.left + area.width / 2.0,
        area.bottom() + 36.0,
        FONT,
        color,
        "center",
    );
    backend.draw_text(figure.layout.y_title, 8.0, area.top - 10.0, FONT, color, "left");
}

fn draw_legend(
    backend: &mut impl RendererBackend,
    figure: &Figure,
    trace: &CandlestickTrace,
    area: &PlotArea,
) {
    let swatch = PlotArea {
        left: area.right() - 120.0,
        top: area.top + 8.0,
        width: 10.0,
        height: 10.0,
    };
    backend.fill_area(&swatch, figure.layout.color_up);
    backend.draw_text(
        &trace.name,
        swatch.right() + 6.0,
        swatch.bottom(),
        FONT,
        figure.layout.font_color,
        "left",
    );
}

fn document() -> Result<Document, ChartError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ChartError::Dom("no document".into()))
}

fn element(id: &str) -> Result<HtmlElement, ChartError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| ChartError::MissingElement(id.to_string()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| ChartError::Dom(format!("`{id}` is not an HTMLElement")))
}

fn js_err(err: JsValue) -> ChartError {
    ChartError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn set_display(id: &str, visible: bool) -> Result<(), ChartError> {
    element(id)?
        .style()
        .set_property("display", if visible { "block" } else { "none" })
        .map_err(js_err)
}

fn viewport_height() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|h| h.as_f64())
        .unwrap_or(DEFAULT_HEIGHT)
}

/// Canvas 2D implementation of [`ChartSurface`].
#[derive(Default)]
pub struct CanvasSurface {
    // Keeps the bound listeners alive for the page lifetime.
    listeners: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl CanvasSurface {
    fn listen(&self, target: &HtmlElement, handler: impl FnMut() + 'static) -> Result<(), ChartError> {
        let closure = Closure::<dyn FnMut()>::wrap(Box::new(handler));
        target
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        self.listeners.borrow_mut().push(closure);
        Ok(())
    }
}

impl ChartSurface for CanvasSurface {
    fn plot(&self, container: &str, figure: &Figure) -> Result<(), ChartError> {
        let host = element(container)?;
        host.set_inner_html("");
        let canvas = document()?
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ChartError::Dom("not a canvas".into()))?;
        canvas.style().set_property("width", "100%").map_err(js_err)?;
        host.append_child(&canvas).map_err(js_err)?;

        let rect = host.get_bounding_client_rect();
        let width = if rect.width() > 1.0 { rect.width() } else { DEFAULT_WIDTH };
        let height = figure.layout.height.unwrap_or(if rect.height() > 1.0 {
            rect.height()
        } else {
            DEFAULT_HEIGHT
        });
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| ChartError::Dom("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ChartError::Dom("not a 2d context".into()))?;
        let mut backend = CanvasBackend::new(canvas, ctx);
        paint(&mut backend, figure, width, height);
        Ok(())
    }

    fn set_html(&self, container: &str, html: &str) -> Result<(), ChartError> {
        element(container)?.set_inner_html(html);
        Ok(())
    }

    fn bind_full_screen(&self, targets: &ChartTargets, slot: FigureSlot) -> Result<(), ChartError> {
        // Both buttons must exist before either gets a handler.
        let show_btn = element(&targets.show_full_screen)?;
        let close_btn = element(&targets.close_full_screen)?;

        let show_targets = targets.clone();
        self.listen(&show_btn, move || {
            let Some(figure) = slot.current() else {
                return;
            };
            let full = figure.full_screen(viewport_height());
            let shown = set_display(&show_targets.full_screen_container, true)
                .and_then(|_| CanvasSurface::default().plot(&show_targets.full_screen_graph, &full));
            if let Err(err) = shown {
                web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
            }
        })?;

        let container = targets.full_screen_container.clone();
        self.listen(&close_btn, move || {
            if let Err(err) = set_display(&container, false) {
                web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
            }
        })
    }
}
