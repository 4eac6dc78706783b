//! Top-level pipeline: load once, then aggregate and render every chart.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::aggregate::{aggregate_by, compute_speedup, filter_top_overlap, keep_smallest, speedup_label};
use crate::config::ReportConfig;
use crate::loader::{LoadError, load_measurements};
use crate::model::{AggregatedRow, GroupKey, MeasurementTable};
use crate::palette::Palette;
use crate::render::{self, ChartKind, ChartSpec, RenderContext, RenderError};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub data: PathBuf,
    pub out_dir: PathBuf,
    pub config: ReportConfig,
}

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, RenderError)>,
}

impl ReportSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub enum ReportError {
    Load(LoadError),
    EmptyInput(PathBuf),
    OutputDir { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Load(_) => f.write_str("failed to load measurements"),
            ReportError::EmptyInput(path) => write!(f, "{} contains no measurements", path.display()),
            ReportError::OutputDir { path, .. } => {
                write!(f, "failed to create output directory {}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Load(err) => Some(err),
            ReportError::OutputDir { source, .. } => Some(source),
            ReportError::EmptyInput(_) => None,
        }
    }
}

impl From<LoadError> for ReportError {
    fn from(err: LoadError) -> Self {
        ReportError::Load(err)
    }
}

/// Every chart one report produces, in rendering order.
///
/// Repeated charts are planned once. Distinct charts whose file names would
/// collide (e.g. passes `live vars` and `live_vars`) get a numeric suffix.
pub fn plan_charts(table: &MeasurementTable, config: &ReportConfig) -> Vec<ChartSpec> {
    let mut plan = Vec::new();
    for &metric in &config.metrics {
        plan.push(ChartSpec::averages(metric));
        for &n in &config.limits {
            plan.push(ChartSpec::averages_top(metric, n));
        }
        if table.schema.has_name() {
            for pass in table.passes() {
                plan.push(ChartSpec::by_benchmark(metric, pass));
            }
        }
        plan.push(ChartSpec::violin(metric));
        for &n in &config.limits {
            plan.push(ChartSpec::violin_top(metric, n));
        }
    }
    dedup_file_names(plan)
}

fn dedup_file_names(plan: Vec<ChartSpec>) -> Vec<ChartSpec> {
    let mut names = HashSet::new();
    let mut kept: Vec<ChartSpec> = Vec::with_capacity(plan.len());
    for mut spec in plan {
        if kept.contains(&spec) {
            continue;
        }
        while !names.insert(spec.file_name()) {
            spec.collision += 1;
        }
        if spec.collision > 0 {
            tracing::warn!(chart = %spec.file_name(), "chart file name collides, added a suffix");
        }
        kept.push(spec);
    }
    kept
}

/// Aggregated, speedup-annotated rows for a bar chart.
///
/// Speedups are computed on the full aggregate before any top-n filter, so a
/// filtered-out baseline still yields speedups for the executors that remain.
pub fn bar_rows(table: &MeasurementTable, spec: &ChartSpec, baseline: &str) -> (GroupKey, Vec<AggregatedRow>) {
    let metric = spec.metric;
    let (group_key, full) = match &spec.pass {
        Some(pass) => {
            let key = GroupKey::by_executor_name();
            let rows = aggregate_by(table.rows_for_pass(pass), metric, &key, None);
            (key, rows)
        }
        None => {
            let key = GroupKey::by_pass_executor();
            let rows = aggregate_by(&table.rows, metric, &key, None);
            (key, rows)
        }
    };
    let with_speedup = compute_speedup(&full, metric, &group_key, baseline);
    let rows = match spec.limit {
        Some(n) => keep_smallest(with_speedup, metric, &group_key, n),
        None => with_speedup,
    };
    (group_key, rows)
}

/// Render one planned chart.
pub fn render_chart(
    ctx: &RenderContext,
    table: &MeasurementTable,
    spec: &ChartSpec,
    baseline: &str,
    out_dir: &Path,
) -> Result<PathBuf, RenderError> {
    match spec.kind {
        ChartKind::Bar => {
            let (group_key, rows) = bar_rows(table, spec, baseline);
            log_table(spec, &rows);
            render::render_bar(ctx, spec, &rows, &group_key, out_dir)
        }
        ChartKind::Violin => {
            let raw: Vec<_> = match spec.limit {
                Some(n) => {
                    let key = GroupKey::by_pass_executor();
                    let top = aggregate_by(&table.rows, spec.metric, &key, Some(n));
                    filter_top_overlap(&table.rows, &top, &key)
                }
                None => table.rows.iter().collect(),
            };
            render::render_violin(ctx, spec, &raw, out_dir)
        }
    }
}

fn log_table(spec: &ChartSpec, rows: &[AggregatedRow]) {
    for row in rows {
        let speedup = speedup_label(row.speedup).unwrap_or_else(|| "-".to_string());
        tracing::debug!(
            chart = %spec.file_name(),
            key = %row.key.join("/"),
            count = row.count,
            mean = row.value(spec.metric),
            speedup = %speedup,
            "aggregated"
        );
    }
}

/// Run the whole pipeline. A missing input file fails before the output
/// directory is touched; a failing chart is recorded and the rest still run.
pub fn run_report(options: &ReportOptions) -> Result<ReportSummary, ReportError> {
    let table = load_measurements(&options.data)?;
    if table.is_empty() {
        return Err(ReportError::EmptyInput(options.data.clone()));
    }
    tracing::info!(
        data = %options.data.display(),
        rows = table.len(),
        passes = table.passes().len(),
        executors = table.executors().len(),
        "loaded measurements"
    );

    std::fs::create_dir_all(&options.out_dir).map_err(|source| ReportError::OutputDir {
        path: options.out_dir.clone(),
        source,
    })?;

    let palette = Palette::for_executors(table.executors());
    let ctx = RenderContext::new(&options.config.image, palette);
    Ok(render_all(&ctx, &table, &options.config, &options.out_dir))
}

/// Render every planned chart with an already prepared context.
pub fn render_all(ctx: &RenderContext, table: &MeasurementTable, config: &ReportConfig, out_dir: &Path) -> ReportSummary {
    let mut summary = ReportSummary::default();
    for spec in plan_charts(table, config) {
        match render_chart(ctx, table, &spec, &config.baseline, out_dir) {
            Ok(path) => {
                tracing::info!(chart = %path.display(), "wrote chart");
                summary.written.push(path);
            }
            Err(err) => {
                tracing::error!(chart = %spec.file_name(), error = %err, "chart failed");
                summary.failed.push((spec.file_name(), err));
            }
        }
    }
    summary
}
