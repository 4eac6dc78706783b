use criterion::{Criterion, criterion_group, criterion_main};
use passplot_core::{
    aggregate::keep_smallest,
    aggregate_by, compute_speedup,
    model::{GroupKey, Measurement, Metric},
};
use std::hint::black_box;

// Roughly the shape of a full harness run: a handful of passes and executors,
// dozens of benchmarks, ten iterations each.
fn build_rows(passes: usize, executors: usize, names: usize, iterations: usize) -> Vec<Measurement> {
    let executor_names = ["sequential", "parallel", "mixed", "mutex", "rayon", "chunked"];
    let mut rows = Vec::with_capacity(passes * executors * names * iterations);
    for p in 0..passes {
        for e in 0..executors {
            for n in 0..names {
                for i in 0..iterations {
                    let seed = (p * 31 + e * 17 + n * 7 + i) % 97;
                    rows.push(Measurement {
                        pass: format!("pass{}", p),
                        executor: executor_names[e % executor_names.len()].to_string(),
                        name: Some(format!("bench{}", n)),
                        iteration: Some(i as u64),
                        runtime: 1_000.0 + seed as f64 * 13.0,
                        loadtime: 100.0 + seed as f64,
                    });
                }
            }
        }
    }
    rows
}

fn bench_aggregate(c: &mut Criterion) {
    let rows = build_rows(4, 3, 40, 10);
    let key = GroupKey::by_pass_executor();

    c.bench_function("aggregate_pass_executor", |b| {
        b.iter(|| black_box(aggregate_by(&rows, Metric::Runtime, &key, None)))
    });

    c.bench_function("aggregate_speedup_top2", |b| {
        b.iter(|| {
            let full = aggregate_by(&rows, Metric::Runtime, &key, None);
            let with_speedup = compute_speedup(&full, Metric::Runtime, &key, "sequential");
            black_box(keep_smallest(with_speedup, Metric::Runtime, &key, 2))
        })
    });

    let by_name = GroupKey::by_executor_name();
    c.bench_function("aggregate_executor_name", |b| {
        b.iter(|| black_box(aggregate_by(rows.iter().filter(|r| r.pass == "pass0"), Metric::Loadtime, &by_name, None)))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
