// Registrant Chart - Core Library
// Exposes the data pipeline and chart rendering for the CLI, API server, and tests

pub mod registrant;  // CSV rows → typed registrants
pub mod aggregate;   // Filter + count per discipline
pub mod scale;       // Linear and band scales
pub mod chart;       // Chart model + surface trait
pub mod svg;         // SVG surface
pub mod logging;

// Re-export commonly used types
pub use registrant::{
    RawRow, Registrant,
    normalize_empty, parse_access_date, coerce_number,
    load_rows, load_csv, parse_rows,
    ABSENT_MARKER, ACCESS_DATE_LAYOUT,
};
pub use aggregate::{
    AggregateBucket, PipelineSummary,
    is_complete, filter_complete, group_counts, sort_buckets, aggregate, summarize,
};
pub use scale::{LinearScale, BandScale};
pub use chart::{ChartModel, ChartSurface, Bar, Tick, Margin};
pub use svg::{SvgSurface, render_svg};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
