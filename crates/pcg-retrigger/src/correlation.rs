use pcg_core::Window;

/// Mean and sum of squared deviations (not divided by window length) over
/// `range` of `signal`, matching the reference engine's un-normalized
/// variance term.
fn window_stats(signal: &[f32], range: std::ops::Range<usize>) -> (f64, f64) {
    let n = range.len() as f64;
    let mean = signal[range.clone()].iter().map(|&x| x as f64).sum::<f64>() / n;
    let sum_sq_dev = signal[range]
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum();
    (mean, sum_sq_dev)
}

/// The normalized cross-correlation of `signal` at index `j` against the
/// template anchored at `template_offset`, using `window` for both sides
/// and dividing by the *larger* of the two windows' sums of squared
/// deviations (a deliberate asymmetric clamp, not a typo).
fn correlation_at(signal: &[f32], window: Window, j: usize, template_offset: usize) -> Option<f64> {
    let n = signal.len();
    let range_j = window.range_at(j, n)?;
    let range_t = window.range_at(template_offset, n)?;

    let (mean_j, var_j) = window_stats(signal, range_j.clone());
    let (mean_t, var_t) = window_stats(signal, range_t.clone());

    let cross: f64 = range_j
        .clone()
        .zip(range_t.clone())
        .map(|(i, t)| (signal[i] as f64 - mean_j) * (signal[t] as f64 - mean_t))
        .sum();

    let denom = var_j.max(var_t);
    if denom <= 0.0 {
        return Some(0.0);
    }
    Some(cross / denom)
}

/// The normalized cross-correlation signal of `signal` against the
/// template anchored at `template_offset`, evaluated at every index whose
/// correlation window fits entirely inside the signal, zero elsewhere.
///
/// The reference engine restricts this computation to the union of
/// per-event lookaround windows as a performance optimization; every value
/// this engine ever reads from the result falls inside some such window,
/// so computing the full valid region here is return-value-identical at
/// every point that matters and simpler to reason about.
pub(crate) fn correlation_signal(signal: &[f32], window: Window, template_offset: usize) -> Vec<f32> {
    let n = signal.len();
    let mut out = vec![0.0f32; n];
    let half = window.len / 2;
    if window.len == 0 || n < window.len {
        return out;
    }
    for j in half..n.saturating_sub(window.len - half) {
        if let Some(c) = correlation_at(signal, window, j, template_offset) {
            out[j] = c as f32;
        }
    }
    out
}

/// Maximum value of `signal` within the lookaround window centered at
/// `center`, or `None` if the window falls outside `signal`.
pub(crate) fn max_in_window(signal: &[f32], window: Window, center: usize) -> Option<f64> {
    let range = window.range_at(center, signal.len())?;
    signal[range]
        .iter()
        .cloned()
        .fold(None, |acc: Option<f32>, x| {
            Some(acc.map_or(x, |m| m.max(x)))
        })
        .map(|v| v as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_windows_correlate_at_unity() {
        let mut signal = vec![0.0f32; 1000];
        for (i, x) in signal.iter_mut().enumerate() {
            *x = ((i as f64) * 0.1).sin() as f32;
        }
        let window = Window::new(200, 100);
        let c = correlation_signal(&signal, window, 500);
        assert!(c[500] > 0.99, "self-correlation should be ~1.0, got {}", c[500]);
    }

    #[test]
    fn flat_windows_correlate_to_zero() {
        let signal = vec![1.0f32; 1000];
        let window = Window::new(200, 100);
        let c = correlation_signal(&signal, window, 500);
        assert_eq!(c[500], 0.0);
    }

    #[test]
    fn out_of_range_template_yields_all_zero() {
        let signal = vec![1.0f32; 100];
        let window = Window::new(200, 100);
        let c = correlation_signal(&signal, window, 50);
        assert!(c.iter().all(|&x| x == 0.0));
    }
}
