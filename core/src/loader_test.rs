#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::Result;

    use crate::loader::{LoadError, load_measurements, load_measurements_from_reader};

    const HARNESS_CSV: &str = "\
name,pass,executor,iteration,loadtime,runtime
fib,ReachingDefinitions,sequential,0,1200,98000
fib,ReachingDefinitions,parallel,0,1300,51000
fib,ReachingDefinitions,sequential,1,1100,102000
";

    fn load(text: &str) -> Result<crate::model::MeasurementTable, LoadError> {
        load_measurements_from_reader(text.as_bytes(), Path::new("perf.csv"))
    }

    #[test]
    fn test_load_harness_output() -> Result<()> {
        let table = load(HARNESS_CSV)?;
        assert_eq!(table.len(), 3);
        assert!(table.schema.has_name());
        let first = &table.rows[0];
        assert_eq!(first.name.as_deref(), Some("fib"));
        assert_eq!(first.pass, "ReachingDefinitions");
        assert_eq!(first.executor, "sequential");
        assert_eq!(first.iteration, Some(0));
        assert_eq!(first.loadtime, 1200.0);
        assert_eq!(first.runtime, 98000.0);
        assert_eq!(table.executors(), vec!["sequential", "parallel"]);
        assert_eq!(table.names(), vec!["fib"]);
        Ok(())
    }

    #[test]
    fn test_load_without_name_column() -> Result<()> {
        let table = load("pass,executor,runtime,loadtime\nrd, parallel ,10.5,2\n")?;
        assert!(!table.schema.has_name());
        assert_eq!(table.rows[0].name, None);
        assert_eq!(table.rows[0].executor, "parallel");
        assert_eq!(table.rows[0].runtime, 10.5);
        Ok(())
    }

    #[test]
    fn test_header_only_is_empty_table() -> Result<()> {
        let table = load("pass,executor,runtime,loadtime\n")?;
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_columns_fail_eagerly() {
        let err = load("pass,name,runtime\nrd,fib,1\n").unwrap_err();
        match err {
            LoadError::Schema(schema) => assert_eq!(schema.missing, vec!["executor", "loadtime"]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_and_non_numeric_values_are_rejected() {
        let err = load("pass,executor,runtime,loadtime\nrd,seq,-1,2\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidRecord { column: "runtime", line: 2, .. }
        ));

        let err = load("pass,executor,runtime,loadtime\nrd,seq,1,fast\n").unwrap_err();
        assert!(err.to_string().contains("column 'loadtime'"));
        assert!(err.to_string().contains("'fast'"));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let err = load("pass,executor,runtime,loadtime\nrd,seq,1\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn test_missing_file_reported_before_parsing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("perf.csv");
        let err = load_measurements(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingInput(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("perf.csv");
        std::fs::write(&path, HARNESS_CSV)?;
        let table = load_measurements(&path)?;
        assert_eq!(table.passes(), vec!["ReachingDefinitions"]);
        Ok(())
    }
}
