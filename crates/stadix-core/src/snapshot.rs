//! SVG rendering of result charts for reports

use serde::{Deserialize, Serialize};
use stadix_stats::ChartSeries;
use std::fmt::Write as _;

use crate::chart::ChartData;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;

const PRIMARY: &str = "#3b82f6";
const ACCENT: &str = "#dc2626";
const SHADE: &str = "#bfdbfe";
const AXIS: &str = "#374151";
const SLICES: [&str; 6] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899"];

/// A captured chart, ready to embed in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub svg: String,
}

/// Maps data coordinates into the plot area
struct Frame {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(width: u32, height: u32, x: (f64, f64), y: (f64, f64)) -> Self {
        let (x0, x1) = widen(x);
        let (y0, y1) = widen(y);
        Self {
            x0,
            x1,
            y0,
            y1,
            width: width as f64,
            height: height as f64,
        }
    }

    fn plot_width(&self) -> f64 {
        (self.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0)
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN_LEFT + (x - self.x0) / (self.x1 - self.x0) * self.plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        MARGIN_TOP + (1.0 - (y - self.y0) / (self.y1 - self.y0)) * self.plot_height()
    }

    fn baseline(&self) -> f64 {
        self.py(self.y0.max(0.0).min(self.y1))
    }
}

/// Avoid a zero-width range
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl ChartSnapshot {
    pub const DEFAULT_WIDTH: u32 = 720;
    pub const DEFAULT_HEIGHT: u32 = 420;

    /// Render a chart
    pub fn chart(title: &str, chart: &ChartData, width: u32, height: u32) -> Self {
        let mut body = String::new();
        match chart {
            ChartData::Bars {
                labels,
                values,
                highlight,
                y_label,
            } => bars(&mut body, labels, values, *highlight, y_label, width, height),
            ChartData::Polygon {
                labels,
                values,
                y_label,
            } => polygon(&mut body, labels, values, y_label, width, height),
            ChartData::Pie { labels, values } => pie(&mut body, labels, values, width, height),
            ChartData::Scatter {
                points,
                slope,
                intercept,
            } => scatter(&mut body, points, *slope, *intercept, width, height),
            ChartData::Distribution { series } => match series {
                ChartSeries::Curve(points) => {
                    let xy: Vec<(f64, f64, bool)> =
                        points.iter().map(|p| (p.x, p.density, p.shaded)).collect();
                    curve(&mut body, &xy, width, height)
                }
                ChartSeries::Mass(points) => {
                    let labels: Vec<String> = points.iter().map(|p| p.k.to_string()).collect();
                    let values: Vec<f64> = points.iter().map(|p| p.probability).collect();
                    let target = points.iter().position(|p| p.target);
                    bars(&mut body, &labels, &values, target, "P(X = k)", width, height)
                }
            },
        }
        Self::wrap(title, body, width, height)
    }

    /// Render a text card for results without a chart
    pub fn card(title: &str, rows: &[(String, String)], width: u32, height: u32) -> Self {
        let mut body = String::new();
        let line_height = 28.0;
        for (i, (label, value)) in rows.iter().enumerate() {
            let y = MARGIN_TOP + 24.0 + i as f64 * line_height;
            let _ = write!(
                body,
                r#"<text x="{x}" y="{y:.1}" font-size="14" fill="{AXIS}">{label}</text><text x="{vx:.1}" y="{y:.1}" font-size="14" font-weight="bold" text-anchor="end" fill="{PRIMARY}">{value}</text>"#,
                x = MARGIN_LEFT,
                vx = width as f64 - MARGIN_RIGHT,
                label = escape(label),
                value = escape(value),
            );
        }
        Self::wrap(title, body, width, height)
    }

    fn wrap(title: &str, body: String, width: u32, height: u32) -> Self {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="Helvetica, Arial, sans-serif"><rect width="100%" height="100%" fill="white"/><text x="{cx:.1}" y="28" font-size="18" font-weight="bold" text-anchor="middle" fill="{AXIS}">{title}</text>{body}</svg>"#,
            cx = width as f64 / 2.0,
            title = escape(title),
        );
        Self {
            title: title.to_string(),
            width,
            height,
            svg,
        }
    }
}

fn axes(out: &mut String, frame: &Frame) {
    let left = MARGIN_LEFT;
    let bottom = MARGIN_TOP + frame.plot_height();
    let right = left + frame.plot_width();
    let _ = write!(
        out,
        r#"<line x1="{left}" y1="{MARGIN_TOP}" x2="{left}" y2="{bottom:.1}" stroke="{AXIS}"/><line x1="{left}" y1="{base:.1}" x2="{right:.1}" y2="{base:.1}" stroke="{AXIS}"/>"#,
        base = frame.baseline(),
    );
    for y in [frame.y0, (frame.y0 + frame.y1) / 2.0, frame.y1] {
        let _ = write!(
            out,
            r#"<text x="{x:.1}" y="{py:.1}" font-size="11" text-anchor="end" fill="{AXIS}">{y:.4}</text>"#,
            x = left - 6.0,
            py = frame.py(y) + 4.0,
        );
    }
}

fn bars(
    out: &mut String,
    labels: &[String],
    values: &[f64],
    highlight: Option<usize>,
    y_label: &str,
    width: u32,
    height: u32,
) {
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);
    let frame = Frame::new(width, height, (0.0, values.len().max(1) as f64), (lo, hi));
    axes(out, &frame);

    let slot = frame.plot_width() / values.len().max(1) as f64;
    let bar = slot * 0.7;
    // Thin out labels when there are too many bars to read
    let label_every = (values.len() / 20).max(1);
    let base = frame.baseline();

    for (i, &value) in values.iter().enumerate() {
        let x = frame.px(i as f64) + (slot - bar) / 2.0;
        let top = frame.py(value);
        let fill = if Some(i) == highlight { ACCENT } else { PRIMARY };
        let _ = write!(
            out,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar:.1}" height="{h:.1}" fill="{fill}"/>"#,
            y = top.min(base),
            h = (base - top).abs(),
        );
        if i % label_every == 0 {
            if let Some(label) = labels.get(i) {
                let _ = write!(
                    out,
                    r#"<text x="{cx:.1}" y="{ly:.1}" font-size="11" text-anchor="middle" fill="{AXIS}">{label}</text>"#,
                    cx = x + bar / 2.0,
                    ly = MARGIN_TOP + frame.plot_height() + 16.0,
                    label = escape(label),
                );
            }
        }
    }

    y_axis_label(out, y_label, height);
}

fn polygon(
    out: &mut String,
    labels: &[String],
    values: &[f64],
    y_label: &str,
    width: u32,
    height: u32,
) {
    let hi = values.iter().copied().fold(0.0, f64::max);
    let n = values.len().max(1) as f64;
    let frame = Frame::new(width, height, (-0.5, n - 0.5), (0.0, hi));
    axes(out, &frame);

    let label_every = (values.len() / 20).max(1);
    let mut line = Vec::with_capacity(values.len());
    for (i, &value) in values.iter().enumerate() {
        let (x, y) = (frame.px(i as f64), frame.py(value));
        line.push(format!("{x:.1},{y:.1}"));
        let _ = write!(out, r#"<circle cx="{x:.1}" cy="{y:.1}" r="4" fill="{PRIMARY}"/>"#);
        if i % label_every == 0 {
            if let Some(label) = labels.get(i) {
                let _ = write!(
                    out,
                    r#"<text x="{x:.1}" y="{ly:.1}" font-size="11" text-anchor="middle" fill="{AXIS}">{label}</text>"#,
                    ly = MARGIN_TOP + frame.plot_height() + 16.0,
                    label = escape(label),
                );
            }
        }
    }
    let _ = write!(
        out,
        r#"<polyline points="{}" fill="none" stroke="{PRIMARY}" stroke-width="3"/>"#,
        line.join(" ")
    );
    y_axis_label(out, y_label, height);
}

fn pie(out: &mut String, labels: &[String], values: &[f64], width: u32, height: u32) {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let cx = MARGIN_LEFT + (width as f64 - MARGIN_LEFT - MARGIN_RIGHT) * 0.35;
    let cy = MARGIN_TOP + (height as f64 - MARGIN_TOP - MARGIN_BOTTOM / 2.0) / 2.0;
    let r = ((height as f64 - MARGIN_TOP - MARGIN_BOTTOM / 2.0) / 2.0 - 8.0).max(8.0);
    if total <= 0.0 {
        let _ = write!(
            out,
            r#"<text x="{cx:.1}" y="{cy:.1}" font-size="14" text-anchor="middle" fill="{AXIS}">No data</text>"#
        );
        return;
    }

    let legend_x = cx + r + 32.0;
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, &value) in values.iter().enumerate() {
        let share = value.max(0.0) / total;
        let fill = SLICES[i % SLICES.len()];
        if share >= 1.0 - 1e-12 {
            let _ = write!(out, r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{fill}"/>"#);
        } else if share > 0.0 {
            let end = angle + share * std::f64::consts::TAU;
            let large = i32::from(share > 0.5);
            let _ = write!(
                out,
                r#"<path d="M{cx:.1},{cy:.1} L{x0:.1},{y0:.1} A{r:.1},{r:.1} 0 {large} 1 {x1:.1},{y1:.1} Z" fill="{fill}" stroke="white"/>"#,
                x0 = cx + r * angle.cos(),
                y0 = cy + r * angle.sin(),
                x1 = cx + r * end.cos(),
                y1 = cy + r * end.sin(),
            );
            angle = end;
        }

        let ly = MARGIN_TOP + 8.0 + i as f64 * 20.0;
        let label = labels.get(i).map(String::as_str).unwrap_or_default();
        let _ = write!(
            out,
            r#"<rect x="{legend_x:.1}" y="{ry:.1}" width="12" height="12" fill="{fill}"/><text x="{tx:.1}" y="{ly:.1}" font-size="12" fill="{AXIS}">{label} ({pct:.1}%)</text>"#,
            ry = ly - 10.0,
            tx = legend_x + 18.0,
            label = escape(label),
            pct = share * 100.0,
        );
    }
}

fn scatter(out: &mut String, points: &[(f64, f64)], slope: f64, intercept: f64, width: u32, height: u32) {
    let xs = points.iter().map(|p| p.0);
    let x_lo = xs.clone().fold(f64::INFINITY, f64::min);
    let x_hi = xs.fold(f64::NEG_INFINITY, f64::max);
    let (x_lo, x_hi) = if x_lo.is_finite() { (x_lo, x_hi) } else { (0.0, 1.0) };

    let line = [(x_lo, slope * x_lo + intercept), (x_hi, slope * x_hi + intercept)];
    let ys = points.iter().map(|p| p.1).chain(line.iter().map(|p| p.1));
    let y_lo = ys.clone().fold(f64::INFINITY, f64::min);
    let y_hi = ys.fold(f64::NEG_INFINITY, f64::max);

    let frame = Frame::new(width, height, (x_lo, x_hi), (y_lo, y_hi));
    axes(out, &frame);

    for &(x, y) in points {
        let _ = write!(
            out,
            r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{PRIMARY}"/>"#,
            frame.px(x),
            frame.py(y),
        );
    }
    let _ = write!(
        out,
        r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{ACCENT}" stroke-width="2"/>"#,
        frame.px(line[0].0),
        frame.py(line[0].1),
        frame.px(line[1].0),
        frame.py(line[1].1),
    );
    y_axis_label(out, "Y", height);
}

fn curve(out: &mut String, points: &[(f64, f64, bool)], width: u32, height: u32) {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let y_hi = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let frame = Frame::new(width, height, (first.0, last.0), (0.0, y_hi));
    axes(out, &frame);
    let base = frame.baseline();

    let shaded: Vec<&(f64, f64, bool)> = points.iter().filter(|p| p.2).collect();
    if let (Some(start), Some(end)) = (shaded.first(), shaded.last()) {
        let mut path = format!("M{:.1},{base:.1}", frame.px(start.0));
        for p in &shaded {
            let _ = write!(path, " L{:.1},{:.1}", frame.px(p.0), frame.py(p.1));
        }
        let _ = write!(path, " L{:.1},{base:.1} Z", frame.px(end.0));
        let _ = write!(out, r#"<path d="{path}" fill="{SHADE}"/>"#);
    }

    let line: Vec<String> = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", frame.px(p.0), frame.py(p.1)))
        .collect();
    let _ = write!(
        out,
        r#"<polyline points="{}" fill="none" stroke="{PRIMARY}" stroke-width="2"/>"#,
        line.join(" ")
    );
    y_axis_label(out, "Density", height);
}

fn y_axis_label(out: &mut String, label: &str, height: u32) {
    let y = height as f64 / 2.0;
    let _ = write!(
        out,
        r#"<text x="16" y="{y:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 16 {y:.1})" fill="{AXIS}">{}</text>"#,
        escape(label),
    );
}
