pub mod aggregate;
pub mod config;
pub mod loader;
pub mod model;
pub mod palette;
pub mod render;
pub mod report;
pub mod schema;

#[cfg(test)]
mod loader_test;
#[cfg(test)]
mod render_test;

pub use aggregate::{aggregate_by, compute_speedup, filter_top_overlap, speedup_label};
pub use config::ReportConfig;
pub use loader::{LoadError, load_measurements};
pub use model::{AggregatedRow, GroupKey, Measurement, MeasurementTable, Metric};
pub use report::{ReportError, ReportOptions, ReportSummary, run_report};
pub use schema::SchemaError;
