use crate::figure::CandlestickTrace;

const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 56.0;
const PRICE_PAD: f64 = 0.05;

/// Inner rectangle the candles are drawn into, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn within(width: f64, height: f64) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotCandle {
    pub x: f64,
    pub half_w: f64,
    pub y_open: f64,
    pub y_close: f64,
    pub y_high: f64,
    pub y_low: f64,
    pub bullish: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub label: String,
    pub pos: f64,
}

/// A trace mapped to pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub area: PlotArea,
    pub candles: Vec<PlotCandle>,
    pub price_ticks: Vec<AxisTick>,
    pub date_ticks: Vec<AxisTick>,
}

/// Map `trace` into a `width` x `height` canvas.
///
/// Returns `None` for an empty trace or one with no finite prices.
pub fn project(trace: &CandlestickTrace, width: f64, height: f64) -> Option<Projection> {
    if trace.is_empty() {
        return None;
    }
    let mut min_p = f64::MAX;
    let mut max_p = f64::MIN;
    for p in trace.low.iter().chain(trace.high.iter()) {
        if p.is_finite() {
            min_p = min_p.min(*p);
            max_p = max_p.max(*p);
        }
    }
    if min_p > max_p {
        return None;
    }
    let span = max_p - min_p;
    let pad = if span > 0.0 { span * PRICE_PAD } else { (max_p.abs() * PRICE_PAD).max(1.0) };
    let (y_min, y_max) = (min_p - pad, max_p + pad);

    let area = PlotArea::within(width, height);
    let price_to_y = |price: f64| area.top + (y_max - price) / (y_max - y_min) * area.height;

    let n = trace.len();
    let slot = area.width / n as f64;
    let half_w = (slot * 0.35).max(0.5);
    let candles = (0..n)
        .map(|i| PlotCandle {
            x: area.left + slot * (i as f64 + 0.5),
            half_w,
            y_open: price_to_y(trace.open[i]),
            y_close: price_to_y(trace.close[i]),
            y_high: price_to_y(trace.high[i]),
            y_low: price_to_y(trace.low[i]),
            bullish: trace.is_bullish(i),
        })
        .collect::<Vec<_>>();

    Some(Projection {
        area,
        price_ticks: price_ticks(y_min, y_max, 5)
            .into_iter()
            .map(|p| AxisTick {
                label: format!("{p:.2}"),
                pos: price_to_y(p),
            })
            .collect(),
        date_ticks: date_tick_indices(n, 6)
            .into_iter()
            .map(|i| AxisTick {
                label: trace.x[i].clone(),
                pos: candles[i].x,
            })
            .collect(),
        candles,
    })
}

fn price_ticks(y_min: f64, y_max: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return Vec::new();
    }
    let step = (y_max - y_min) / (count as f64 - 1.0);
    (0..count).map(|i| y_min + step * i as f64).collect()
}

/// Evenly spaced indices into an `n`-point axis, first and last included.
fn date_tick_indices(n: usize, max_ticks: usize) -> Vec<usize> {
    if n == 0 || max_ticks == 0 {
        return Vec::new();
    }
    if n <= max_ticks {
        return (0..n).collect();
    }
    let step = (n - 1) as f64 / (max_ticks - 1) as f64;
    let mut out: Vec<usize> = (0..max_ticks).map(|i| (i as f64 * step).round() as usize).collect();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(rows: &[(f64, f64, f64, f64)]) -> CandlestickTrace {
        CandlestickTrace {
            name: "T Stock".into(),
            x: (0..rows.len()).map(|i| format!("2024-01-{:02}", i + 1)).collect(),
            open: rows.iter().map(|r| r.0).collect(),
            high: rows.iter().map(|r| r.1).collect(),
            low: rows.iter().map(|r| r.2).collect(),
            close: rows.iter().map(|r| r.3).collect(),
        }
    }

    #[test]
    fn candles_stay_inside_plot_area() {
        let t = trace(&[(10.0, 12.0, 9.0, 11.0), (11.0, 11.5, 8.0, 8.5), (8.5, 13.0, 8.4, 12.9)]);
        let proj = project(&t, 800.0, 400.0).unwrap();
        assert_eq!(proj.candles.len(), 3);
        for c in &proj.candles {
            assert!(c.x > proj.area.left && c.x < proj.area.right());
            assert!(c.y_high >= proj.area.top && c.y_low <= proj.area.bottom());
            assert!(c.y_high <= c.y_low);
        }
        assert!(proj.candles[0].bullish);
        assert!(!proj.candles[1].bullish);
        assert!(proj.candles[0].x < proj.candles[1].x);
    }

    #[test]
    fn flat_series_still_projects() {
        let t = trace(&[(5.0, 5.0, 5.0, 5.0)]);
        let proj = project(&t, 300.0, 200.0).unwrap();
        let c = &proj.candles[0];
        assert!((c.y_open - c.y_close).abs() < f64::EPSILON);
        assert_eq!(proj.price_ticks.len(), 5);
    }

    #[test]
    fn empty_or_non_finite_trace_has_no_projection() {
        assert!(project(&trace(&[]), 300.0, 200.0).is_none());
        assert!(project(&trace(&[(f64::NAN, f64::NAN, f64::NAN, f64::NAN)]), 300.0, 200.0).is_none());
    }

    #[test]
    fn date_ticks_cover_both_ends() {
        assert_eq!(date_tick_indices(3, 6), vec![0, 1, 2]);
        let idx = date_tick_indices(63, 6);
        assert_eq!(idx.first(), Some(&0));
        assert_eq!(idx.last(), Some(&62));
        assert_eq!(idx.len(), 6);
    }
}
