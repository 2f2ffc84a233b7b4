// 📈 Bar Chart Model
// Sorted buckets → positioned bars, ticks and header, ready for any surface

use crate::aggregate::AggregateBucket;
use crate::scale::{BandScale, LinearScale};
use serde::{Deserialize, Serialize};

pub const OUTER_WIDTH: f64 = 600.0;
pub const OUTER_HEIGHT: f64 = 600.0;
pub const MARGIN: Margin = Margin {
    top: 80.0,
    right: 40.0,
    bottom: 40.0,
    left: 150.0,
};
pub const BAR_PADDING_INNER: f64 = 0.25;
pub const X_TICK_COUNT: usize = 10;

pub const TITLE: &str = "Usuarios registrados segun disciplina.";
pub const SUBTITLE: &str = "Ordenados de mayor a menos convocatoria.";

// ============================================================================
// MODEL TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// One horizontal bar, in inner (margin-translated) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: usize,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bar {
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartModel {
    pub outer_width: f64,
    pub outer_height: f64,
    pub margin: Margin,
    /// Inner plotting width
    pub width: f64,
    /// Inner plotting height
    pub height: f64,
    pub title: String,
    pub subtitle: String,
    pub bars: Vec<Bar>,
    pub x_ticks: Vec<Tick>,
}

// ============================================================================
// SURFACE
// ============================================================================

/// Anything that can draw a ChartModel. Calls arrive in a fixed order:
/// begin, header, bar (one per bar), x_axis, y_axis, finish.
pub trait ChartSurface {
    fn begin(&mut self, outer_width: f64, outer_height: f64, margin: &Margin);

    /// `offset_y` is relative to the inner origin (negative = inside the top margin).
    fn header(&mut self, title: &str, subtitle: &str, offset_y: f64);

    fn bar(&mut self, bar: &Bar);

    /// Top axis; `grid_length` is how far each tick line runs down the plot.
    fn x_axis(&mut self, ticks: &[Tick], grid_length: f64);

    /// Left axis, one label per bar, centered on its band.
    fn y_axis(&mut self, bars: &[Bar]);

    fn finish(&mut self);
}

// ============================================================================
// BUILD / DRAW
// ============================================================================

impl ChartModel {
    /// Lays out buckets in the order given (already sorted).
    pub fn build(buckets: &[AggregateBucket]) -> Self {
        let width = OUTER_WIDTH - MARGIN.left - MARGIN.right;
        let height = OUTER_HEIGHT - MARGIN.top - MARGIN.bottom;

        let (bars, x_ticks) = if buckets.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let x_max = buckets.iter().map(|b| b.users_total).max().unwrap_or(0) as f64;
            let x = LinearScale::new((0.0, x_max), (0.0, width));

            let keys: Vec<Option<&str>> = buckets.iter().map(|b| b.disciplina.as_deref()).collect();
            let y = BandScale::new(keys, (0.0, height), BAR_PADDING_INNER);

            let bars = buckets
                .iter()
                .map(|b| Bar {
                    label: b.label().to_string(),
                    value: b.users_total,
                    y: y.position(&b.disciplina.as_deref()).unwrap_or(0.0),
                    width: x.apply(b.users_total as f64),
                    height: y.bandwidth(),
                })
                .collect();

            // counts are whole registrants
            let ticks = x
                .ticks(X_TICK_COUNT)
                .into_iter()
                .filter(|value| value.fract() == 0.0)
                .map(|value| Tick {
                    value,
                    x: x.apply(value),
                })
                .collect();

            (bars, ticks)
        };

        ChartModel {
            outer_width: OUTER_WIDTH,
            outer_height: OUTER_HEIGHT,
            margin: MARGIN,
            width,
            height,
            title: TITLE.to_string(),
            subtitle: SUBTITLE.to_string(),
            bars,
            x_ticks,
        }
    }

    pub fn draw<S: ChartSurface>(&self, surface: &mut S) {
        surface.begin(self.outer_width, self.outer_height, &self.margin);
        surface.header(&self.title, &self.subtitle, -self.margin.top / 1.5);

        for bar in &self.bars {
            surface.bar(bar);
        }

        surface.x_axis(&self.x_ticks, self.height);
        surface.y_axis(&self.bars);
        surface.finish();
    }
}
