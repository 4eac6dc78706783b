use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::model::{Measurement, MeasurementTable};
use crate::schema::{self, SchemaError, SchemaInfo};

#[derive(Debug)]
pub enum LoadError {
    /// The input path does not exist. Reported before any parsing.
    MissingInput(PathBuf),
    Io { path: PathBuf, source: io::Error },
    Schema(SchemaError),
    Csv { origin: PathBuf, source: csv::Error },
    InvalidRecord {
        origin: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::MissingInput(path) => write!(f, "The file {} does not exist.", path.display()),
            LoadError::Io { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
            LoadError::Schema(err) => write!(f, "{}", err),
            LoadError::Csv { origin, source } => write!(f, "malformed CSV in {}: {}", origin.display(), source),
            LoadError::InvalidRecord {
                origin,
                line,
                column,
                value,
            } => write!(
                f,
                "{}:{}: column '{}' expects a non-negative number, found '{}'",
                origin.display(),
                line,
                column,
                value
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Csv { source, .. } => Some(source),
            LoadError::Schema(_) | LoadError::MissingInput(_) | LoadError::InvalidRecord { .. } => None,
        }
    }
}

impl From<SchemaError> for LoadError {
    fn from(err: SchemaError) -> Self {
        LoadError::Schema(err)
    }
}

/// Read a measurement file. The existence check runs first so a wrong path
/// never reaches the CSV parser.
pub fn load_measurements(path: &Path) -> Result<MeasurementTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_measurements_from_reader(BufReader::new(file), path)?;
    tracing::debug!(path = %path.display(), rows = table.len(), "loaded measurements");
    Ok(table)
}

/// Parse measurements from any reader; `origin` only labels errors.
pub fn load_measurements_from_reader<R: Read>(reader: R, origin: &Path) -> Result<MeasurementTable, LoadError> {
    let csv_err = |source| LoadError::Csv {
        origin: origin.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let info = schema::validate_headers(headers.iter(), origin)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(parse_record(&record, &info, origin, line)?);
    }

    Ok(MeasurementTable { schema: info, rows })
}

fn parse_record(
    record: &csv::StringRecord,
    info: &SchemaInfo,
    origin: &Path,
    line: u64,
) -> Result<Measurement, LoadError> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let invalid = |column: &'static str, value: &str| LoadError::InvalidRecord {
        origin: origin.to_path_buf(),
        line,
        column,
        value: value.to_string(),
    };
    let number = |idx: usize, column: &'static str| -> Result<f64, LoadError> {
        let raw = field(idx);
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(invalid(column, raw)),
        }
    };

    let iteration = match info.iteration {
        Some(idx) if !field(idx).is_empty() => {
            let raw = field(idx);
            Some(raw.parse::<u64>().map_err(|_| invalid(schema::ITERATION, raw))?)
        }
        _ => None,
    };

    Ok(Measurement {
        pass: field(info.pass).to_string(),
        executor: field(info.executor).to_string(),
        name: info.name.map(|idx| field(idx).to_string()),
        iteration,
        runtime: number(info.runtime, schema::RUNTIME)?,
        loadtime: number(info.loadtime, schema::LOADTIME)?,
    })
}
