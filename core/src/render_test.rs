#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::Result;

    use crate::aggregate::{aggregate_by, compute_speedup};
    use crate::config::ImageConfig;
    use crate::model::{GroupKey, Measurement, Metric};
    use crate::palette::Palette;
    use crate::render::{ChartSpec, RenderContext, RenderError, render_bar, render_violin};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    fn row(pass: &str, executor: &str, runtime: f64) -> Measurement {
        Measurement {
            pass: pass.to_string(),
            executor: executor.to_string(),
            name: None,
            iteration: None,
            runtime,
            loadtime: runtime / 4.0,
        }
    }

    fn sample() -> Vec<Measurement> {
        let mut rows = Vec::new();
        for i in 0..6 {
            let jitter = i as f64;
            rows.push(row("rd", "sequential", 100.0 + jitter));
            rows.push(row("rd", "parallel", 50.0 + jitter * 2.0));
            rows.push(row("live", "parallel", 30.0 + jitter));
            rows.push(row("live", "mixed", 20.0));
        }
        rows
    }

    fn small_image() -> ImageConfig {
        ImageConfig {
            width: 320,
            height: 200,
            font: None,
        }
    }

    fn textless_context(rows: &[Measurement]) -> RenderContext {
        let palette = Palette::for_executors(rows.iter().map(|r| r.executor.as_str()));
        RenderContext::with_font(&small_image(), palette, None)
    }

    fn staging_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .expect("read out dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".passplot-"))
            .collect()
    }

    #[test]
    fn test_render_bar_writes_png() -> Result<()> {
        let rows = sample();
        let ctx = textless_context(&rows);
        let key = GroupKey::by_pass_executor();
        let agg = compute_speedup(
            &aggregate_by(&rows, Metric::Runtime, &key, None),
            Metric::Runtime,
            &key,
            "sequential",
        );
        let dir = tempfile::tempdir()?;

        let path = render_bar(&ctx, &ChartSpec::averages(Metric::Runtime), &agg, &key, dir.path())?;
        assert_eq!(path, dir.path().join("averages_runtime.png"));
        let bytes = std::fs::read(&path)?;
        assert!(bytes.starts_with(PNG_MAGIC));
        assert!(staging_files(dir.path()).is_empty());
        Ok(())
    }

    #[test]
    fn test_render_bar_overwrites_existing_chart() -> Result<()> {
        let rows = sample();
        let ctx = textless_context(&rows);
        let key = GroupKey::by_pass_executor();
        let agg = aggregate_by(&rows, Metric::Loadtime, &key, Some(1));
        let dir = tempfile::tempdir()?;
        let spec = ChartSpec::averages_top(Metric::Loadtime, 1);

        std::fs::write(dir.path().join(spec.file_name()), b"stale")?;
        let path = render_bar(&ctx, &spec, &agg, &key, dir.path())?;
        assert!(std::fs::read(path)?.starts_with(PNG_MAGIC));
        Ok(())
    }

    #[test]
    fn test_render_violin_writes_png() -> Result<()> {
        let rows = sample();
        let ctx = textless_context(&rows);
        let raw: Vec<&Measurement> = rows.iter().collect();
        let dir = tempfile::tempdir()?;

        let path = render_violin(&ctx, &ChartSpec::violin(Metric::Runtime), &raw, dir.path())?;
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("violin_runtime.png"));
        assert!(std::fs::read(&path)?.starts_with(PNG_MAGIC));
        Ok(())
    }

    #[test]
    fn test_render_with_discovered_font() -> Result<()> {
        let rows = sample();
        let palette = Palette::for_executors(rows.iter().map(|r| r.executor.as_str()));
        let ctx = RenderContext::new(&small_image(), palette);
        let key = GroupKey::by_pass_executor();
        let agg = compute_speedup(
            &aggregate_by(&rows, Metric::Runtime, &key, None),
            Metric::Runtime,
            &key,
            "sequential",
        );
        let dir = tempfile::tempdir()?;

        let path = render_bar(&ctx, &ChartSpec::averages(Metric::Runtime), &agg, &key, dir.path())?;
        assert!(std::fs::read(&path)?.starts_with(PNG_MAGIC));
        Ok(())
    }

    #[test]
    fn test_empty_rows_are_rejected() {
        let ctx = textless_context(&[]);
        let dir = tempfile::tempdir().expect("tempdir");
        let err = render_violin(&ctx, &ChartSpec::violin_top(Metric::Runtime, 2), &[], dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::Empty(ref name) if name == "violin_runtime_top_2.png"));
        assert!(!dir.path().join("violin_runtime_top_2.png").exists());
    }

    #[test]
    fn test_missing_out_dir_is_io_error() {
        let rows = sample();
        let ctx = textless_context(&rows);
        let key = GroupKey::by_pass_executor();
        let agg = aggregate_by(&rows, Metric::Runtime, &key, None);
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("not-created");

        let err = render_bar(&ctx, &ChartSpec::averages(Metric::Runtime), &agg, &key, &missing).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
