//! SVG line chart of the three measurement series
//!
//! Each series (`sys`, `dia`, `pulse`) becomes one colored line over the
//! measurement index. Placeholders break the line so gaps stay visible.
//! Only SVG is written; asking for PNG reports a missing raster backend.

use crate::config::ChartOptions;
use crate::error::{Error, Result};
use crate::models::{Field, Slot};
use crate::statistic::Statistic;
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 48.0;
const DOT_RADIUS: f64 = 3.0;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 10;

/// Extra used for x-axis labels when measurements carry it
const DATE_EXTRA: &str = "date";

struct Palette {
    background: &'static str,
    foreground: &'static str,
    grid: &'static str,
    series: [&'static str; 3],
}

const DARK: Palette = Palette {
    background: "#181818",
    foreground: "#eeeeee",
    grid: "#3a3a3a",
    series: ["#f44336", "#3f51b5", "#009688"],
};

const LIGHT: Palette = Palette {
    background: "#fdf6e3",
    foreground: "#073642",
    grid: "#e0d9c5",
    series: ["#b58900", "#cb4b16", "#dc322f"],
};

/// Render the chart to the configured file and return the written path
pub fn render_chart(statistic: &Statistic, options: &ChartOptions) -> Result<PathBuf> {
    options.validate()?;
    let path = options.output_path();

    if options.png {
        return Err(Error::environment(
            "PNG backend",
            format!(
                "cannot render '{}', this build writes SVG charts only",
                path.display()
            ),
        ));
    }

    let svg = render_svg(statistic, options);
    fs::write(&path, svg).map_err(|e| Error::io(&path, e))?;
    info!("Chart written to {}", path.display());
    Ok(path)
}

/// Chart as an SVG document
pub fn render_svg(statistic: &Statistic, options: &ChartOptions) -> String {
    let palette = if options.light { &LIGHT } else { &DARK };
    let plot = PlotArea::new(statistic, options);
    let mut svg = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = options.width,
        h = options.height
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        palette.background
    );

    draw_axes(&mut svg, statistic, &plot, palette);
    for field in Field::ALL {
        draw_series(
            &mut svg,
            field,
            statistic.series(field),
            &plot,
            palette.series[field.index()],
            options,
        );
    }
    draw_legend(&mut svg, palette);

    svg.push_str("</svg>\n");
    debug!("Rendered SVG chart with {} point(s)", plot.count);
    svg
}

/// Pixel mapping of the plot region
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    low: f64,
    high: f64,
    count: usize,
}

impl PlotArea {
    fn new(statistic: &Statistic, options: &ChartOptions) -> Self {
        let values: Vec<i32> = Field::ALL
            .iter()
            .flat_map(|field| statistic.series(*field).iter().flatten().copied())
            .collect();
        let (low, high) = match (values.iter().min(), values.iter().max()) {
            (Some(&low), Some(&high)) if low < high => (f64::from(low), f64::from(high)),
            (Some(&value), _) => (f64::from(value) - 1.0, f64::from(value) + 1.0),
            _ => (0.0, 1.0),
        };

        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: f64::from(options.width) - MARGIN_LEFT - MARGIN_RIGHT,
            height: f64::from(options.height) - MARGIN_TOP - MARGIN_BOTTOM,
            low,
            high,
            count: statistic.values().len(),
        }
    }

    fn x(&self, index: usize) -> f64 {
        if self.count <= 1 {
            return self.left + self.width / 2.0;
        }
        self.left + self.width * index as f64 / (self.count - 1) as f64
    }

    fn y(&self, value: f64) -> f64 {
        self.top + self.height * (self.high - value) / (self.high - self.low)
    }

    fn floor(&self) -> f64 {
        self.top + self.height
    }
}

fn draw_axes(svg: &mut String, statistic: &Statistic, plot: &PlotArea, palette: &Palette) {
    for tick in 0..Y_TICKS {
        let value = plot.low + (plot.high - plot.low) * tick as f64 / (Y_TICKS - 1) as f64;
        let y = plot.y(value);
        let _ = writeln!(
            svg,
            r#"<line class="grid" x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}"/>"#,
            plot.left,
            plot.left + plot.width,
            palette.grid
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" fill="{}">{}</text>"#,
            plot.left - 6.0,
            y + 4.0,
            palette.foreground,
            value.round()
        );
    }

    let slots = statistic.values();
    let step = slots.len().div_ceil(MAX_X_LABELS).max(1);
    for (index, slot) in slots.iter().enumerate().step_by(step) {
        let _ = writeln!(
            svg,
            r#"<text class="label" x="{:.1}" y="{:.1}" text-anchor="middle" fill="{}">{}</text>"#,
            plot.x(index),
            plot.floor() + 18.0,
            palette.foreground,
            escape(&x_label(index, slot))
        );
    }
}

fn x_label(index: usize, slot: &Slot) -> String {
    slot.as_ref()
        .and_then(|m| m.extra(DATE_EXTRA))
        .and_then(|date| date.as_str())
        .map_or_else(|| (index + 1).to_string(), str::to_string)
}

fn draw_series(
    svg: &mut String,
    field: Field,
    series: &[Option<i32>],
    plot: &PlotArea,
    color: &str,
    options: &ChartOptions,
) {
    for run in runs(series) {
        let points: Vec<(f64, f64)> = run
            .iter()
            .map(|(index, value)| (plot.x(*index), plot.y(f64::from(*value))))
            .collect();
        let coordinates = points
            .iter()
            .map(|(x, y)| format!("{x:.1},{y:.1}"))
            .collect::<Vec<_>>()
            .join(" ");

        if options.fill {
            if let (Some((first_x, _)), Some((last_x, _))) = (points.first(), points.last()) {
                let _ = writeln!(
                    svg,
                    r#"<polygon class="fill {field}" points="{first_x:.1},{floor:.1} {coordinates} {last_x:.1},{floor:.1}" fill="{color}" fill-opacity="0.3"/>"#,
                    floor = plot.floor()
                );
            }
        }
        if options.lines && points.len() > 1 {
            let _ = writeln!(
                svg,
                r#"<polyline class="line {field}" points="{coordinates}" fill="none" stroke="{color}" stroke-width="2"/>"#
            );
        }
        if options.dots {
            for (x, y) in &points {
                let _ = writeln!(
                    svg,
                    r#"<circle class="dot {field}" cx="{x:.1}" cy="{y:.1}" r="{DOT_RADIUS}" fill="{color}"/>"#
                );
            }
        }
    }
}

/// Consecutive real values, split at every placeholder
fn runs(series: &[Option<i32>]) -> Vec<Vec<(usize, i32)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (index, value) in series.iter().enumerate() {
        match value {
            Some(value) => current.push((index, *value)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn draw_legend(svg: &mut String, palette: &Palette) {
    for field in Field::ALL {
        let x = MARGIN_LEFT + 80.0 * field.index() as f64;
        let _ = writeln!(
            svg,
            r#"<rect x="{x:.1}" y="16" width="12" height="12" fill="{}"/>"#,
            palette.series[field.index()]
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="27" fill="{}">{field}</text>"#,
            x + 18.0,
            palette.foreground
        );
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
