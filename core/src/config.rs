use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aggregate::DEFAULT_BASELINE;
use crate::model::Metric;

pub const CONFIG_ENV: &str = "PASSPLOT_CONFIG";
pub const CONFIG_FILE_NAME: &str = "passplot.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub metrics: Vec<Metric>,
    /// Top-n variants rendered next to the full charts.
    pub limits: Vec<usize>,
    pub baseline: String,
    pub image: ImageConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub font: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
            limits: vec![3],
            baseline: DEFAULT_BASELINE.to_string(),
            image: ImageConfig::default(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            font: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    UnknownMetric { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "config file {} does not exist", path.display()),
            ConfigError::Io { path, source } => write!(f, "failed to read config {}: {}", path.display(), source),
            ConfigError::Parse { path, source } => write!(f, "invalid config {}: {}", path.display(), source),
            ConfigError::UnknownMetric { path, message } => write!(f, "{}: {}", path.display(), message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    report: ReportSection,
    #[serde(default)]
    image: ImageSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ReportSection {
    #[serde(default)]
    metrics: Option<Vec<String>>,
    #[serde(default)]
    limits: Option<Vec<usize>>,
    #[serde(default)]
    baseline: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ImageSection {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    font: Option<PathBuf>,
}

impl ReportConfig {
    /// Locate the config: an explicit `PASSPLOT_CONFIG` path wins, then
    /// `passplot.toml` in `dir`. No file at all means defaults.
    pub fn discover(dir: &Path, env_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = env_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            return Self::from_file(&path);
        }
        let local = dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::from_file(&local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw, path)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(metrics) = file.report.metrics {
            config.metrics = metrics
                .iter()
                .map(|m| m.parse::<Metric>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| ConfigError::UnknownMetric {
                    path: origin.to_path_buf(),
                    message,
                })?;
        }
        if let Some(limits) = file.report.limits {
            // A top-0 chart would be empty.
            let mut kept: Vec<usize> = Vec::new();
            for n in limits.into_iter().filter(|n| *n > 0) {
                if !kept.contains(&n) {
                    kept.push(n);
                }
            }
            config.limits = kept;
        }
        if let Some(baseline) = file.report.baseline.filter(|b| !b.trim().is_empty()) {
            config.baseline = baseline.trim().to_string();
        }
        if let Some(v) = file.image.width.filter(|v| *v > 0) {
            config.image.width = v;
        }
        if let Some(v) = file.image.height.filter(|v| *v > 0) {
            config.image.height = v;
        }
        config.image.font = file.image.font;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = ReportConfig::from_toml_str("", Path::new("passplot.toml")).expect("empty config parses");
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.baseline, "sequential");
        assert_eq!(config.limits, vec![3]);
    }

    #[test]
    fn test_config_overrides() {
        let raw = r#"
            [report]
            metrics = ["loadtime"]
            limits = [2, 0, 4, 2]
            baseline = " serial "

            [image]
            width = 1600
            height = 0
            font = "fonts/DejaVuSans.ttf"
        "#;
        let config = ReportConfig::from_toml_str(raw, Path::new("passplot.toml")).expect("config parses");
        assert_eq!(config.metrics, vec![Metric::Loadtime]);
        assert_eq!(config.limits, vec![2, 4]);
        assert_eq!(config.baseline, "serial");
        assert_eq!(config.image.width, 1600);
        assert_eq!(config.image.height, 600);
        assert_eq!(config.image.font, Some(PathBuf::from("fonts/DejaVuSans.ttf")));
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        let err = ReportConfig::from_toml_str("[report]\nmetrics = [\"walltime\"]\n", Path::new("p.toml")).unwrap_err();
        assert!(err.to_string().contains("Unknown metric: walltime"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ReportConfig::from_toml_str("[report]\nlimit = 3\n", Path::new("p.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_discover_missing_env_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ReportConfig::discover(dir.path(), Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_discover_local_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[report]\nlimits = []\n").expect("write config");
        let config = ReportConfig::discover(dir.path(), None).expect("local config loads");
        assert!(config.limits.is_empty());

        let other = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            ReportConfig::discover(other.path(), None).expect("defaults"),
            ReportConfig::default()
        );
    }
}
