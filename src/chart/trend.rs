//! Trailing moving averages for trend overlays.

/// Trailing simple moving average over the y-values of `points`.
///
/// The output point at index `i` (for `i >= window - 1`) keeps the x of
/// `points[i]` and averages the `window` samples ending there. Inputs shorter
/// than the window, or a zero window, produce no points.
pub fn moving_average(points: &[(f64, f64)], window: usize) -> Vec<(f64, f64)> {
    if window == 0 || points.len() < window {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(points.len() + 1 - window);
    let mut sum: f64 = points[..window].iter().map(|&(_, y)| y).sum();
    out.push((points[window - 1].0, sum / window as f64));

    for i in window..points.len() {
        sum += points[i].1 - points[i - window].1;
        out.push((points[i].0, sum / window as f64));
    }

    out
}
