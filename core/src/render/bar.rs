use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{
    AXIS_LABEL_FONT_SIZE, ChartSpec, DATA_LABEL_FONT_SIZE, LEGEND_FONT_SIZE, RenderContext, RenderError,
    TICK_LABEL_FONT_SIZE, TITLE_FONT_SIZE, category_label, slot_bounds, write_png, y_upper,
};
use crate::aggregate::{outer_label, speedup_label};
use crate::model::{AggregatedRow, GroupKey, distinct};

const GROUP_WIDTH: f64 = 0.8;
const BAR_GAP: f64 = 0.01;

/// Grouped bar chart of aggregated means: one category per outer key (pass or
/// benchmark), one bar per executor. Bars with a speedup are annotated with
/// it; bars without one are left bare.
pub fn render_bar(
    ctx: &RenderContext,
    spec: &ChartSpec,
    rows: &[AggregatedRow],
    group_key: &GroupKey,
    out_dir: &Path,
) -> Result<PathBuf, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::Empty(spec.file_name()));
    }

    let labels: Vec<String> = rows.iter().map(|row| outer_label(row, group_key)).collect();
    let categories: Vec<String> = distinct(labels.iter().map(String::as_str))
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

    let metric = spec.metric;
    let max = rows.iter().map(|row| row.value(metric)).fold(0.0_f64, f64::max);
    let n_categories = categories.len();

    write_png(ctx, out_dir, &spec.file_name(), |root| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(20).x_label_area_size(50).y_label_area_size(90);
        if let Some(font) = ctx.font {
            builder.caption(spec.title(), (font, TITLE_FONT_SIZE));
        }
        let mut chart = builder.build_cartesian_2d(-0.5..(n_categories as f64 - 0.5), 0.0..y_upper(max))?;

        if let Some(font) = ctx.font {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n_categories.max(1))
                .x_label_formatter(&|x| category_label(&categories, *x))
                .y_desc("Time (ns)")
                .x_desc(spec.x_desc())
                .label_style((font, TICK_LABEL_FONT_SIZE))
                .axis_desc_style((font, AXIS_LABEL_FONT_SIZE))
                .draw()?;
        }

        for (slot, executor) in executors.iter().enumerate() {
            let color = ctx.palette.color_of(executor);
            let bars: Vec<(f64, f64, f64, Option<String>)> = rows
                .iter()
                .zip(&labels)
                .filter(|(row, _)| row.executor == *executor)
                .filter_map(|(row, label)| {
                    let idx = categories.iter().position(|c| c == label)?;
                    let (left, right) = slot_bounds(idx as f64, slot, executors.len(), GROUP_WIDTH);
                    Some((left + BAR_GAP, right - BAR_GAP, row.value(metric), speedup_label(row.speedup)))
                })
                .collect();

            chart
                .draw_series(
                    bars.iter()
                        .map(|(left, right, value, _)| Rectangle::new([(*left, 0.0), (*right, *value)], color.filled())),
                )?
                .label(*executor)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));

            let Some(font) = ctx.font else {
                continue;
            };
            for (left, right, value, label) in &bars {
                let Some(label) = label else {
                    continue;
                };
                chart.draw_series(std::iter::once(Text::new(
                    label.clone(),
                    ((left + right) / 2.0, *value),
                    (font, DATA_LABEL_FONT_SIZE)
                        .into_font()
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Bottom)),
                )))?;
            }
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
