/// Advisory pre-check for clipped/saturated recordings. Never alters the
/// classifier's verdict; reported alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationReport {
    pub tot_n_saturated: usize,
    pub tot_len_saturated: usize,
    pub too_saturated: bool,
}

const SKIP_FROM_START: usize = 500;
const MIN_RUN_LEN: usize = 2;

/// Scan `signal` for runs (longer than [`MIN_RUN_LEN`]) of consecutive
/// samples pinned to the observed min or max, skipping the first
/// [`SKIP_FROM_START`] samples (the reference implementation's warm-up
/// exclusion).
pub fn check_saturation(signal: &[f32]) -> SaturationReport {
    let n = signal.len();
    if n <= SKIP_FROM_START {
        return SaturationReport {
            tot_n_saturated: 0,
            tot_len_saturated: 0,
            too_saturated: false,
        };
    }

    let min = signal.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = signal.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let mut tot_n = 0usize;
    let mut tot_len = 0usize;
    let mut run: Option<(usize, f32)> = None;

    let mut close_run = |run: Option<(usize, f32)>, end: usize, tot_n: &mut usize, tot_len: &mut usize| {
        if let Some((start, _)) = run {
            let len = end - start;
            if len > MIN_RUN_LEN {
                *tot_n += 1;
                *tot_len += len;
            }
        }
    };

    for i in SKIP_FROM_START..n {
        let x = signal[i];
        let extreme_value = if x == min {
            Some(min)
        } else if x == max {
            Some(max)
        } else {
            None
        };

        match (extreme_value, run) {
            (Some(v), None) => run = Some((i, v)),
            (Some(v), Some((_, run_v))) if v != run_v => {
                close_run(run, i, &mut tot_n, &mut tot_len);
                run = Some((i, v));
            }
            (Some(_), Some(_)) => {}
            (None, Some(_)) => {
                close_run(run, i, &mut tot_n, &mut tot_len);
                run = None;
            }
            (None, None) => {}
        }
    }
    close_run(run, n, &mut tot_n, &mut tot_len);

    let too_saturated = (10000.0 * tot_n as f64 / n as f64).sqrt() * tot_len as f64 > 0.01 * n as f64;

    SaturationReport {
        tot_n_saturated: tot_n,
        tot_len_saturated: tot_len,
        too_saturated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_sine_reports_no_saturation() {
        let signal: Vec<f32> = (0..5000).map(|i| (i as f32 * 0.01).sin()).collect();
        let report = check_saturation(&signal);
        assert!(!report.too_saturated);
    }

    #[test]
    fn clipped_runs_are_counted() {
        let mut signal = vec![0.0f32; 5000];
        for x in signal.iter_mut().skip(1000).take(50) {
            *x = 100.0;
        }
        let report = check_saturation(&signal);
        assert_eq!(report.tot_n_saturated, 1);
        assert_eq!(report.tot_len_saturated, 50);
    }

    #[test]
    fn short_recording_is_never_flagged() {
        let signal = vec![1.0f32; 100];
        let report = check_saturation(&signal);
        assert_eq!(report.tot_n_saturated, 0);
        assert!(!report.too_saturated);
    }
}
