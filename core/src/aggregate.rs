//! Grouping, top-n selection and speedup computation over measurement rows.
//!
//! Everything here is a pure function of its inputs: the same rows always
//! produce the same aggregated numbers in the same order.

use std::collections::{HashMap, HashSet};

use crate::model::{AggregatedRow, GroupKey, Measurement, Metric};

/// Executor every other executor is compared against by default.
pub const DEFAULT_BASELINE: &str = "sequential";

#[derive(Default)]
struct Accumulator {
    count: usize,
    runtime: f64,
    loadtime: f64,
}

/// Mean of both metrics per `group_key` combination, in first-appearance order.
///
/// With `limit = Some(n)` only the `n` groups with the smallest mean `metric`
/// survive inside each outer group (every key column except the executor).
/// Ties keep first-appearance order.
pub fn aggregate_by<'a, I>(rows: I, metric: Metric, group_key: &GroupKey, limit: Option<usize>) -> Vec<AggregatedRow>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<String>, Accumulator)> = Vec::new();

    for row in rows {
        let key = group_key.key_of(row);
        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, Accumulator::default()));
                groups.len() - 1
            }
        };
        let acc = &mut groups[slot].1;
        acc.count += 1;
        acc.runtime += row.runtime;
        acc.loadtime += row.loadtime;
    }

    let executor_idx = group_key.executor_index();
    let aggregated: Vec<AggregatedRow> = groups
        .into_iter()
        .map(|(key, acc)| {
            let n = acc.count as f64;
            AggregatedRow {
                executor: executor_idx.map(|i| key[i].clone()).unwrap_or_default(),
                key,
                count: acc.count,
                runtime: acc.runtime / n,
                loadtime: acc.loadtime / n,
                speedup: None,
            }
        })
        .collect();

    match limit {
        Some(n) => keep_smallest(aggregated, metric, group_key, n),
        None => aggregated,
    }
}

/// Keep the `n` smallest rows per outer group, ordered ascending by `metric`.
pub fn keep_smallest(rows: Vec<AggregatedRow>, metric: Metric, group_key: &GroupKey, n: usize) -> Vec<AggregatedRow> {
    let mut outer_order: Vec<Vec<String>> = Vec::new();
    let mut buckets: HashMap<Vec<String>, Vec<AggregatedRow>> = HashMap::new();

    for row in rows {
        let outer: Vec<String> = group_key.outer_of(&row.key).into_iter().map(str::to_string).collect();
        if !buckets.contains_key(&outer) {
            outer_order.push(outer.clone());
        }
        buckets.entry(outer).or_default().push(row);
    }

    let mut kept = Vec::new();
    for outer in outer_order {
        let Some(mut bucket) = buckets.remove(&outer) else {
            continue;
        };
        // `sort_by` is stable, so equal means keep their original order.
        bucket.sort_by(|a, b| a.value(metric).total_cmp(&b.value(metric)));
        bucket.truncate(n);
        kept.extend(bucket);
    }
    kept
}

/// Attach `speedup = baseline mean / row mean` to every row whose outer key
/// has a `baseline` executor row in `rows`.
///
/// Rows without such a baseline get `None`, as does any ratio with a zero
/// mean on either side.
pub fn compute_speedup(rows: &[AggregatedRow], metric: Metric, group_key: &GroupKey, baseline: &str) -> Vec<AggregatedRow> {
    let baselines: HashMap<Vec<&str>, f64> = rows
        .iter()
        .filter(|row| row.executor == baseline && row.value(metric) > 0.0)
        .map(|row| (group_key.outer_of(&row.key), row.value(metric)))
        .collect();

    rows.iter()
        .map(|row| {
            let value = row.value(metric);
            let speedup = baselines
                .get(&group_key.outer_of(&row.key))
                .filter(|_| value > 0.0)
                .map(|base| base / value);
            AggregatedRow {
                speedup,
                ..row.clone()
            }
        })
        .collect()
}

/// Raw rows whose group key survived a top-n aggregation, in raw order.
pub fn filter_top_overlap<'a, I>(raw: I, top: &[AggregatedRow], group_key: &GroupKey) -> Vec<&'a Measurement>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let survivors: HashSet<&[String]> = top.iter().map(|row| row.key.as_slice()).collect();
    raw.into_iter()
        .filter(|row| survivors.contains(group_key.key_of(row).as_slice()))
        .collect()
}

/// Bar annotation for a speedup: two decimals and an `x` suffix.
pub fn speedup_label(speedup: Option<f64>) -> Option<String> {
    speedup.map(|s| format!("{:.2}x", s))
}

/// Outer-group label of an aggregated row, e.g. the pass or benchmark name.
pub fn outer_label(row: &AggregatedRow, group_key: &GroupKey) -> String {
    group_key.outer_of(&row.key).join("/")
}

