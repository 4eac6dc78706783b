//! Gaussian kernel density estimate used to draw violins.

/// Samples of an estimated density, `(value, density)` with the density
/// scaled so its peak is `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub points: Vec<(f64, f64)>,
}

/// Silverman's rule of thumb. Zero when the sample has no spread.
pub fn silverman_bandwidth(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n < 2 {
        return 0.0;
    }
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sd = var.sqrt();
    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    let spread = if iqr > 0.0 { sd.min(iqr / 1.34) } else { sd };
    0.9 * spread * (n as f64).powf(-0.2)
}

/// Linear-interpolated quantile of already sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = pos - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Evaluate the KDE of `sorted` on `steps` evenly spaced points spanning the
/// data plus two bandwidths on each side, cut at zero. `None` for degenerate
/// samples (fewer than two values or no spread).
pub fn estimate(sorted: &[f64], steps: usize) -> Option<DensityCurve> {
    let bw = silverman_bandwidth(sorted);
    if bw <= 0.0 || steps < 2 {
        return None;
    }
    let lo = (sorted[0] - 2.0 * bw).max(0.0);
    let hi = sorted[sorted.len() - 1] + 2.0 * bw;
    let step = (hi - lo) / (steps - 1) as f64;

    let mut points: Vec<(f64, f64)> = (0..steps)
        .map(|i| {
            let y = lo + step * i as f64;
            let d: f64 = sorted
                .iter()
                .map(|v| {
                    let z = (y - v) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (y, d)
        })
        .collect();

    let peak = points.iter().map(|(_, d)| *d).fold(0.0_f64, f64::max);
    if peak <= 0.0 {
        return None;
    }
    for (_, d) in points.iter_mut() {
        *d /= peak;
    }
    Some(DensityCurve { points })
}
