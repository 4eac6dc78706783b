use std::fmt;
use std::str::FromStr;

use crate::schema::{self, SchemaInfo};

/// Numeric column a chart is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Runtime,
    Loadtime,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Runtime, Metric::Loadtime];

    pub fn column(self) -> &'static str {
        match self {
            Metric::Runtime => schema::RUNTIME,
            Metric::Loadtime => schema::LOADTIME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Runtime => "Runtime",
            Metric::Loadtime => "Loadtime",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "runtime" => Ok(Metric::Runtime),
            "loadtime" => Ok(Metric::Loadtime),
            _ => Err(format!("Unknown metric: {}", s)),
        }
    }
}

/// One benchmark iteration as read from the measurement file.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub pass: String,
    pub executor: String,
    pub name: Option<String>,
    pub iteration: Option<u64>,
    pub runtime: f64,
    pub loadtime: f64,
}

impl Measurement {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Runtime => self.runtime,
            Metric::Loadtime => self.loadtime,
        }
    }

    /// Value of a categorical key column. A missing `name` reads as the empty
    /// string so files without the column still group consistently.
    pub fn key_value(&self, column: KeyColumn) -> &str {
        match column {
            KeyColumn::Pass => &self.pass,
            KeyColumn::Executor => &self.executor,
            KeyColumn::Name => self.name.as_deref().unwrap_or(""),
        }
    }
}

/// All rows of one measurement file in file order.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    pub schema: SchemaInfo,
    pub rows: Vec<Measurement>,
}

impl MeasurementTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn passes(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|row| row.pass.as_str()))
    }

    pub fn executors(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|row| row.executor.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        distinct(self.rows.iter().filter_map(|row| row.name.as_deref()))
    }

    pub fn rows_for_pass<'a>(&'a self, pass: &'a str) -> impl Iterator<Item = &'a Measurement> + 'a {
        self.rows.iter().filter(move |row| row.pass == pass)
    }
}

/// Distinct values in order of first appearance.
pub fn distinct<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyColumn {
    Pass,
    Executor,
    Name,
}

/// Ordered set of categorical columns rows are grouped by.
///
/// Every column except `Executor` forms the outer grouping level: top-n
/// filtering ranks executors inside one outer group, and speedups compare
/// executors that share the same outer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKey {
    columns: Vec<KeyColumn>,
}

impl GroupKey {
    pub fn new(columns: Vec<KeyColumn>) -> Self {
        Self { columns }
    }

    pub fn by_pass_executor() -> Self {
        Self::new(vec![KeyColumn::Pass, KeyColumn::Executor])
    }

    pub fn by_executor_name() -> Self {
        Self::new(vec![KeyColumn::Executor, KeyColumn::Name])
    }

    pub fn executor_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| *c == KeyColumn::Executor)
    }

    pub fn key_of(&self, row: &Measurement) -> Vec<String> {
        self.columns.iter().map(|c| row.key_value(*c).to_string()).collect()
    }

    /// Key values without the executor column.
    pub fn outer_of<'a>(&self, key: &'a [String]) -> Vec<&'a str> {
        self.columns
            .iter()
            .zip(key)
            .filter(|(column, _)| **column != KeyColumn::Executor)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

/// Mean of one group of measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub key: Vec<String>,
    pub executor: String,
    pub count: usize,
    pub runtime: f64,
    pub loadtime: f64,
    /// Baseline mean divided by this row's mean; `None` when the outer group
    /// has no baseline executor.
    pub speedup: Option<f64>,
}

impl AggregatedRow {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Runtime => self.runtime,
            Metric::Loadtime => self.loadtime,
        }
    }
}
