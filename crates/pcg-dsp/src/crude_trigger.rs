//! The crude threshold trigger that proposes a first, generous list of
//! candidate heart-sound offsets from the energy signal, before the
//! retrigger engine refines them by template correlation.
//!
//! The threshold is set from two per-3-second-segment order statistics: a
//! low percentile of each segment's peak, and a high percentile of each
//! segment's quietest "local forward maximum" (a rough noise floor). The
//! forward scan then requires a rising, sufficiently-above-minimum sample
//! before it will even consider firing, tracks the loudest sample within a
//! bounded lookahead window while tolerating brief dips back under
//! threshold, and enforces a dead time after each firing.

use pcg_core::{order_stat, ReferenceEvent};

/// Tuning knobs for [`detect`], named after the reference trigger's
/// constructor/`trig_do` constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrudeTriggerConfig {
    /// Leading (and trailing) portion of the recording to skip entirely, in seconds.
    pub skip_s: f64,
    /// Forward-looking window used to find each segment's local maxima, in seconds.
    pub base_len_s: f64,
    /// Segment length for threshold estimation, in seconds.
    pub max_rr_s: f64,
    /// Percentile (0.0-1.0) of per-segment maxima defining the "peak" estimate.
    pub peak_percentile: f64,
    /// Percentile (0.0-1.0) of per-segment baselines defining the "base" estimate.
    pub base_percentile: f64,
    /// Fraction of `(peak - base)` added to `base` to get the firing threshold.
    pub threshold_fraction: f64,
    /// Fraction of the peak value used as the trailing low-water mark after a firing.
    pub low_limit_factor: f32,
    /// Fraction of `limit` a sample must clear its running minimum by before it is considered.
    pub min_rise_fraction: f32,
    /// Longest dip below threshold that does not close an open firing, in seconds.
    pub max_tolerance_s: f64,
    /// Longest a firing is allowed to track a rising peak before closing, in seconds.
    pub max_above_len_s: f64,
    /// Dead time enforced after a firing before the trigger can re-arm, in seconds.
    pub dead_time_s: f64,
}

impl Default for CrudeTriggerConfig {
    fn default() -> Self {
        Self {
            skip_s: 0.5,
            base_len_s: 0.100,
            max_rr_s: 3.0,
            peak_percentile: 0.1,
            base_percentile: 0.9,
            threshold_fraction: 0.125,
            low_limit_factor: 0.1,
            min_rise_fraction: 0.2,
            max_tolerance_s: 0.060,
            max_above_len_s: 0.400,
            dead_time_s: 0.200,
        }
    }
}

/// Estimate the firing threshold from 3-second segments of `energy`,
/// mirroring the reference trigger's `define_threshold_value`. Returns
/// `None` if the recording is too short to form even one segment.
fn define_threshold_value(energy: &[f32], skip_samples: usize, sample_rate_hz: f64, config: &CrudeTriggerConfig) -> Option<f64> {
    let base_len = (config.base_len_s * sample_rate_hz) as usize;
    let max_rr = (config.max_rr_s * sample_rate_hz) as usize;
    if max_rr == 0 || energy.len() < skip_samples + base_len {
        return None;
    }
    let n_step = (energy.len() - skip_samples - base_len) / max_rr;
    if n_step < 1 {
        return None;
    }

    let mut max = vec![0.0f64; n_step];
    let mut base = vec![0.0f64; n_step];

    for n in 0..n_step {
        let set = skip_samples + n * max_rr;
        let segment_end = (set + max_rr).min(energy.len());
        max[n] = energy[set] as f64;
        for i in set..segment_end {
            if energy[i] as f64 > max[n] {
                max[n] = energy[i] as f64;
            }
            let mut base_max = energy[i];
            for j in (i + 1)..(i + base_len).min(energy.len()) {
                if energy[j] > base_max {
                    base_max = energy[j];
                }
            }
            if i == set || (base_max as f64) < base[n] {
                base[n] = base_max as f64;
            }
        }
    }

    let peak_k = ((n_step - 1) as f64 * config.peak_percentile) as usize;
    let base_k = ((n_step - 1) as f64 * config.base_percentile) as usize;
    let peak_estimate = order_stat::kth_smallest(&mut max, peak_k);
    let base_estimate = order_stat::kth_smallest(&mut base, base_k);

    Some(base_estimate + config.threshold_fraction * (peak_estimate - base_estimate))
}

/// Scan the energy signal `energy` for threshold crossings and return one
/// [`ReferenceEvent`] per accepted firing, in ascending offset order.
///
/// Returns an empty list if the recording is too short to estimate a
/// threshold at all.
pub fn detect(energy: &[f32], sample_rate_hz: f64, config: &CrudeTriggerConfig) -> Vec<ReferenceEvent> {
    let skip_samples = (config.skip_s * sample_rate_hz) as usize;
    let Some(limit) = define_threshold_value(energy, skip_samples, sample_rate_hz, config) else {
        tracing::debug!("recording too short to estimate a crude-trigger threshold");
        return Vec::new();
    };

    let max_tolerance = (config.max_tolerance_s * sample_rate_hz) as usize;
    let max_above_len = (config.max_above_len_s * sample_rate_hz) as usize;
    let dead_time = (config.dead_time_s * sample_rate_hz) as usize;

    let len = energy.len();
    if len <= 2 * skip_samples {
        return Vec::new();
    }

    let mut events = Vec::new();
    let mut min = f32::MAX;
    let mut low_limit = 0.0f32;
    let mut next_allowed = 0usize;

    let mut i = skip_samples;
    while i < len - skip_samples {
        let x = energy[i];
        if x < min {
            min = x;
        }

        let rejects = x < low_limit
            || (i > 0 && x < energy[i - 1])
            || ((x - min) as f64) < config.min_rise_fraction as f64 * limit
            || i < next_allowed;

        if !rejects && x as f64 > limit {
            let mut max_i = i;
            let mut max_v = x;
            let mut below_limit = 0usize;
            let mut j = i + 1;
            while j < len && j < i + max_above_len {
                if (energy[j] as f64) < limit {
                    below_limit += 1;
                    if below_limit > max_tolerance {
                        break;
                    }
                } else {
                    below_limit = 0;
                    if energy[j] > max_v {
                        max_v = energy[j];
                        max_i = j;
                    }
                }
                j += 1;
            }

            min = max_v;
            events.push(ReferenceEvent { offset: max_i });
            next_allowed = max_i + dead_time;
            low_limit = config.low_limit_factor * max_v;
        }

        i += 1;
    }

    events
}
