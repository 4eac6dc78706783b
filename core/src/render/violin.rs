use std::path::{Path, PathBuf};

use plotters::prelude::*;

use super::density::{self, DensityCurve};
use super::{
    AXIS_LABEL_FONT_SIZE, ChartSpec, LEGEND_FONT_SIZE, RenderContext, RenderError, TICK_LABEL_FONT_SIZE,
    TITLE_FONT_SIZE, category_label, slot_bounds, write_png, y_upper,
};
use crate::model::{Measurement, distinct};

const GROUP_WIDTH: f64 = 0.8;
const DENSITY_STEPS: usize = 96;

/// One violin: the raw values of a (pass, executor) group.
struct Violin<'a> {
    pass_idx: usize,
    executor: &'a str,
    sorted: Vec<f64>,
    curve: Option<DensityCurve>,
}

/// Distribution chart of raw per-iteration values: one violin per executor
/// inside each pass, with a median tick.
pub fn render_violin(
    ctx: &RenderContext,
    spec: &ChartSpec,
    rows: &[&Measurement],
    out_dir: &Path,
) -> Result<PathBuf, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::Empty(spec.file_name()));
    }

    let metric = spec.metric;
    let passes: Vec<String> = distinct(rows.iter().map(|row| row.pass.as_str()))
        .into_iter()
        .map(str::to_string)
        .collect();
    let present = distinct(rows.iter().map(|row| row.executor.as_str()));
    let executors: Vec<&str> = ctx
        .palette
        .executors()
        .filter(|e| present.contains(e))
        .chain(present.iter().copied().filter(|e| ctx.palette.executors().all(|p| p != *e)))
        .collect();

    let mut violins = Vec::new();
    for (pass_idx, pass) in passes.iter().enumerate() {
        for executor in executors.iter().copied() {
            let mut sorted: Vec<f64> = rows
                .iter()
                .filter(|row| row.pass == *pass && row.executor == executor)
                .map(|row| row.value(metric))
                .collect();
            if sorted.is_empty() {
                continue;
            }
            sorted.sort_by(f64::total_cmp);
            let curve = density::estimate(&sorted, DENSITY_STEPS);
            violins.push(Violin {
                pass_idx,
                executor,
                sorted,
                curve,
            });
        }
    }

    let max = violins
        .iter()
        .map(|v| match &v.curve {
            Some(curve) => curve.points.last().map(|(y, _)| *y).unwrap_or_default(),
            None => v.sorted.last().copied().unwrap_or_default(),
        })
        .fold(0.0_f64, f64::max);

    write_png(ctx, out_dir, &spec.file_name(), |root| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(20).x_label_area_size(50).y_label_area_size(90);
        if let Some(font) = ctx.font {
            builder.caption(spec.title(), (font, TITLE_FONT_SIZE));
        }
        let mut chart = builder.build_cartesian_2d(-0.5..(passes.len() as f64 - 0.5), 0.0..y_upper(max))?;

        if let Some(font) = ctx.font {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(passes.len().max(1))
                .x_label_formatter(&|x| category_label(&passes, *x))
                .y_desc("Time (ns)")
                .x_desc(spec.x_desc())
                .label_style((font, TICK_LABEL_FONT_SIZE))
                .axis_desc_style((font, AXIS_LABEL_FONT_SIZE))
                .draw()?;
        }

        for (slot, executor) in executors.iter().enumerate() {
            let color = ctx.palette.color_of(executor);
            let mut shapes = Vec::new();
            let mut ticks = Vec::new();

            for violin in violins.iter().filter(|v| v.executor == *executor) {
                let (left, right) = slot_bounds(violin.pass_idx as f64, slot, executors.len(), GROUP_WIDTH);
                let center = (left + right) / 2.0;
                let half = (right - left) / 2.0 * 0.9;
                let median = density::quantile(&violin.sorted, 0.5);

                match &violin.curve {
                    Some(curve) => {
                        let mut outline: Vec<(f64, f64)> =
                            curve.points.iter().map(|(y, d)| (center + d * half, *y)).collect();
                        outline.extend(curve.points.iter().rev().map(|(y, d)| (center - d * half, *y)));
                        shapes.push(outline);
                        ticks.push(vec![(center - half * 0.4, median), (center + half * 0.4, median)]);
                    }
                    // No spread to estimate: a flat tick at the value.
                    None => ticks.push(vec![(center - half, median), (center + half, median)]),
                }
            }

            chart
                .draw_series(shapes.into_iter().map(|outline| Polygon::new(outline, color.mix(0.75).filled())))?
                .label(*executor)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
            chart.draw_series(
                ticks
                    .into_iter()
                    .map(|tick| PathElement::new(tick, BLACK.stroke_width(2))),
            )?;
        }

        if let Some(font) = ctx.font {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((font, LEGEND_FONT_SIZE))
                .draw()?;
        }
        Ok(())
    })
}
