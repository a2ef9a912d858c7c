use std::ops::Range;

use pcg_core::order_stat;

/// Windowed standard deviation `sqrt(E[x^2] - E[x]^2)`, clamped at 0 to
/// absorb rounding. `None` if `range` is empty or out of bounds.
pub fn windowed_std(signal: &[f32], range: Range<usize>) -> Option<f64> {
    if range.is_empty() || range.end > signal.len() {
        return None;
    }
    let n = range.len() as f64;
    let (sum, sum_sq) = signal[range]
        .iter()
        .fold((0.0, 0.0), |(s, sq), &x| (s + x as f64, sq + (x as f64) * (x as f64)));
    let mean = sum / n;
    Some((sum_sq / n - mean * mean).max(0.0).sqrt())
}

/// A length-`signal.len()` moving standard deviation with window
/// `window_len`, tapering at both ends (the window simply shrinks at the
/// boundaries rather than reading out of range).
pub fn moving_std(signal: &[f32], window_len: usize) -> Vec<f32> {
    let n = signal.len();
    if window_len == 0 || n == 0 {
        return vec![0.0; n];
    }

    let mut prefix = vec![0.0f64; n + 1];
    let mut prefix_sq = vec![0.0f64; n + 1];
    for (i, &x) in signal.iter().enumerate() {
        let xf = x as f64;
        prefix[i + 1] = prefix[i] + xf;
        prefix_sq[i + 1] = prefix_sq[i] + xf * xf;
    }

    let half = window_len / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            let count = (end - start) as f64;
            let sum = prefix[end] - prefix[start];
            let sum_sq = prefix_sq[end] - prefix_sq[start];
            let mean = sum / count;
            ((sum_sq / count - mean * mean).max(0.0).sqrt()) as f32
        })
        .collect()
}

/// Reduction applied to a sequence of moving-std values over a region's
/// range: `min`, `max`, or `max - min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeReduction {
    Min,
    Max,
    MinMax,
}

pub fn reduce_range(values: &[f32], range: Range<usize>, reduction: RangeReduction) -> Option<f64> {
    if range.is_empty() || range.end > values.len() {
        return None;
    }
    let slice = &values[range];
    let min = slice.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = slice.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    Some(match reduction {
        RangeReduction::Min => min as f64,
        RangeReduction::Max => max as f64,
        RangeReduction::MinMax => (max - min) as f64,
    })
}

/// Median of per-event values, logging and returning `None` for an empty
/// input (an "empty reduction": every event's window fell outside bounds).
pub fn median_or_empty(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        tracing::debug!("empty reduction: no event windows were in bounds");
        return None;
    }
    order_stat::median(&mut values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_std_of_constant_signal_is_zero() {
        let signal = vec![3.0f32; 100];
        assert_eq!(windowed_std(&signal, 10..90), Some(0.0));
    }

    #[test]
    fn windowed_std_out_of_bounds_is_none() {
        let signal = vec![1.0f32; 10];
        assert_eq!(windowed_std(&signal, 5..20), None);
    }

    #[test]
    fn moving_std_matches_windowed_std_at_interior_points() {
        let signal: Vec<f32> = (0..200).map(|i| (i % 7) as f32).collect();
        let moving = moving_std(&signal, 20);
        let direct = windowed_std(&signal, 90..110).unwrap();
        assert!((moving[100] as f64 - direct).abs() < 0.5);
    }

    #[test]
    fn reduce_range_minmax_reports_peak_to_peak() {
        let values = vec![1.0f32, 5.0, 2.0, 0.5];
        assert_eq!(reduce_range(&values, 0..4, RangeReduction::MinMax), Some(4.5));
    }

    #[test]
    fn median_or_empty_on_empty_input_is_none() {
        assert_eq!(median_or_empty(vec![]), None);
    }
}
