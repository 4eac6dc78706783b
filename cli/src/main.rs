use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use passplot_core::{
    ReportConfig, ReportOptions,
    config::CONFIG_ENV,
    report::{ReportSummary, run_report},
};

const LOG_ENV: &str = "PASSPLOT_LOG";
const DEFAULT_LOG_FILTER: &str = "passplot_core=info,passplot=info";


#[derive(Debug, Parser)]
#[command(
    name = "passplot",
    author,
    version,
    about = "Plot graphs from performance data.",
    long_about = None,
    after_help = "Charts are tuned through passplot.toml (or the file named by PASSPLOT_CONFIG)."
)]
struct CliArgs {
    /// Path to the CSV file
    #[arg(long, value_name = "PATH", default_value = "perf.csv")]
    data: PathBuf,

    /// Output directory for the plots
    #[arg(long = "out_dir", alias = "out-dir", value_name = "DIR", default_value = "results")]
    out_dir: PathBuf,
}

/// Filter expression from `PASSPLOT_LOG`, then `RUST_LOG`; blank values are
/// treated as unset.
fn log_filter_from(passplot_log: Option<String>, rust_log: Option<String>) -> Option<String> {
    passplot_log
        .into_iter()
        .chain(rust_log)
        .map(|raw| raw.trim().to_string())
        .find(|raw| !raw.is_empty())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter_expr = log_filter_from(std::env::var(LOG_ENV).ok(), std::env::var("RUST_LOG").ok());
    let builder = fmt().with_writer(std::io::stderr).with_target(false);

    let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
        Some(filter) => builder.with_env_filter(filter),
        None => builder.with_env_filter(DEFAULT_LOG_FILTER),
    };

    let _ = builder.try_init();
}

fn finish(summary: &ReportSummary) -> anyhow::Result<()> {
    for path in &summary.written {
        println!("{}", path.display());
    }
    if !summary.is_success() {
        let failed: Vec<&str> = summary.failed.iter().map(|(name, _)| name.as_str()).collect();
        anyhow::bail!("{} chart(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let CliArgs { data, out_dir } = CliArgs::parse();

    let cwd = std::env::current_dir().context("Failed to resolve the current directory")?;
    let config = ReportConfig::discover(&cwd, std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .context("Failed to load passplot configuration")?;

    let summary = run_report(&ReportOptions { data, out_dir, config })?;
    finish(&summary)
}
