// 🖼️ SVG Surface
// Writes a ChartModel out as a standalone SVG document

use crate::aggregate::AggregateBucket;
use crate::chart::{Bar, ChartModel, ChartSurface, Margin, Tick};
use anyhow::{Context, Result};
use askama::Template;

pub const BAR_FILL: &str = "dodgerblue";

struct SvgRect {
    y: String,
    width: String,
    height: String,
}

struct SvgTick {
    x: String,
    label: String,
}

struct SvgLabel {
    y: String,
    text: String,
}

/// Collects the drawing calls, then renders `templates/chart.svg`.
/// Text content is escaped by the template.
#[derive(Template)]
#[template(path = "chart.svg", escape = "html")]
pub struct SvgSurface {
    width: String,
    height: String,
    left: String,
    top: String,
    header_y: String,
    title: String,
    subtitle: String,
    fill: &'static str,
    rects: Vec<SvgRect>,
    grid_length: String,
    ticks: Vec<SvgTick>,
    labels: Vec<SvgLabel>,
}

impl SvgSurface {
    pub fn new() -> Self {
        SvgSurface {
            width: String::new(),
            height: String::new(),
            left: String::new(),
            top: String::new(),
            header_y: String::new(),
            title: String::new(),
            subtitle: String::new(),
            fill: BAR_FILL,
            rects: Vec::new(),
            grid_length: String::new(),
            ticks: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn into_string(self) -> Result<String> {
        self.render().context("Failed to render SVG chart")
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSurface for SvgSurface {
    fn begin(&mut self, outer_width: f64, outer_height: f64, margin: &Margin) {
        self.width = num(outer_width);
        self.height = num(outer_height);
        self.left = num(margin.left);
        self.top = num(margin.top);
    }

    fn header(&mut self, title: &str, subtitle: &str, offset_y: f64) {
        self.header_y = num(offset_y);
        self.title = title.to_string();
        self.subtitle = subtitle.to_string();
    }

    fn bar(&mut self, bar: &Bar) {
        self.rects.push(SvgRect {
            y: num(bar.y),
            width: num(bar.width),
            height: num(bar.height),
        });
    }

    fn x_axis(&mut self, ticks: &[Tick], grid_length: f64) {
        self.grid_length = num(grid_length);
        self.ticks = ticks
            .iter()
            .map(|tick| SvgTick {
                x: num(tick.x),
                label: num(tick.value),
            })
            .collect();
    }

    fn y_axis(&mut self, bars: &[Bar]) {
        self.labels = bars
            .iter()
            .map(|bar| SvgLabel {
                y: num(bar.center_y()),
                text: bar.label.clone(),
            })
            .collect();
    }

    // closing tags come from the template
    fn finish(&mut self) {}
}

/// Builds and draws the chart for already-sorted buckets.
pub fn render_svg(buckets: &[AggregateBucket]) -> Result<String> {
    let mut surface = SvgSurface::new();
    ChartModel::build(buckets).draw(&mut surface);
    surface.into_string()
}

/// Whole numbers without a fraction, everything else to two decimals.
fn num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
