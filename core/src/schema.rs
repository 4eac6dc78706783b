use std::fmt;
use std::path::{Path, PathBuf};

pub const PASS: &str = "pass";
pub const EXECUTOR: &str = "executor";
pub const NAME: &str = "name";
pub const ITERATION: &str = "iteration";
pub const RUNTIME: &str = "runtime";
pub const LOADTIME: &str = "loadtime";

/// Columns every measurement file must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 4] = [PASS, EXECUTOR, RUNTIME, LOADTIME];

/// Resolved header positions for one measurement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInfo {
    pub pass: usize,
    pub executor: usize,
    pub runtime: usize,
    pub loadtime: usize,
    pub name: Option<usize>,
    pub iteration: Option<usize>,
}

impl SchemaInfo {
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn has_iteration(&self) -> bool {
        self.iteration.is_some()
    }
}

/// Raised when a header row lacks one or more required columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub origin: PathBuf,
    pub missing: Vec<&'static str>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is missing required column(s): {}",
            self.origin.display(),
            self.missing.join(", ")
        )
    }
}

impl std::error::Error for SchemaError {}

/// Match `headers` against the measurement schema. Header names are compared
/// after trimming surrounding whitespace; extra columns are ignored.
pub fn validate_headers<'a, I>(headers: I, origin: &Path) -> Result<SchemaInfo, SchemaError>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
    let position = |column: &str| headers.iter().position(|h| *h == column);

    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| position(column).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError {
            origin: origin.to_path_buf(),
            missing,
        });
    }

    // Presence was checked above.
    let required = |column: &str| position(column).unwrap_or_default();
    Ok(SchemaInfo {
        pass: required(PASS),
        executor: required(EXECUTOR),
        runtime: required(RUNTIME),
        loadtime: required(LOADTIME),
        name: position(NAME),
        iteration: position(ITERATION),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_headers_harness_order() {
        let headers = ["name", "pass", "executor", "iteration", "loadtime", "runtime"];
        let info = validate_headers(headers, Path::new("perf.csv")).expect("schema should validate");
        assert_eq!(info.pass, 1);
        assert_eq!(info.executor, 2);
        assert_eq!(info.loadtime, 4);
        assert_eq!(info.runtime, 5);
        assert_eq!(info.name, Some(0));
        assert_eq!(info.iteration, Some(3));
    }

    #[test]
    fn test_validate_headers_without_optional_columns() {
        let info = validate_headers([" pass", "executor ", "runtime", "loadtime"], Path::new("perf.csv"))
            .expect("optional columns may be absent");
        assert!(!info.has_name());
        assert!(!info.has_iteration());
    }

    #[test]
    fn test_validate_headers_lists_all_missing_columns() {
        let err = validate_headers(["name", "executor", "extra"], Path::new("data/perf.csv")).unwrap_err();
        assert_eq!(err.missing, vec!["pass", "runtime", "loadtime"]);
        assert_eq!(
            err.to_string(),
            "data/perf.csv is missing required column(s): pass, runtime, loadtime"
        );
    }
}
