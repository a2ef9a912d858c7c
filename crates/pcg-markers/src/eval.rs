use pcg_core::{PcgError, PcgResult};

use crate::spec::{parse_where, How, MarkerSpec, What, WhereRegion};
use crate::stats::{self, RangeReduction};
use crate::windows::{self, Clusters};

/// Everything [`evaluate`] needs to resolve a marker name against one
/// recording: the raw (unfiltered) waveform and the retrigger clusters.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub raw: &'a [f32],
    pub clusters: Clusters<'a>,
    pub sample_rate_hz: f64,
}

/// Division that substitutes `1e10 * numerator` instead of propagating a
/// `NaN`/`inf` when the denominator is zero.
fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        1e10 * numerator
    } else {
        numerator / denominator
    }
}

fn bandpass_if_needed(raw: &[f32], sample_rate_hz: f64, f_lo: f64, f_hi: f64) -> Vec<f32> {
    if f_hi <= 0.0 {
        return raw.to_vec();
    }
    let mut out = raw.to_vec();
    pcg_dsp::bandpass_filter(&mut out, sample_rate_hz, f_lo, f_hi);
    out
}

/// Parse and evaluate a marker name end to end.
pub fn evaluate(name: &str, ctx: &EvalContext<'_>) -> PcgResult<f64> {
    let spec = MarkerSpec::parse(name)?;
    evaluate_spec(&spec, ctx)
}

/// Stages 2-3 of marker evaluation: the windowed statistic (per-event
/// sigma for `how=all`, or a moving-sigma min/max/peak-to-peak reduction
/// otherwise), reduced to a single value by median across qualifying
/// events. Quarter-cycle regions (`q1..q3`, `q5`, `q6`) subtract the
/// `base` region's value before the caller sees the result.
fn primary_value(spec: &MarkerSpec, signal: &[f32], ctx: &EvalContext<'_>) -> PcgResult<f64> {
    if matches!(spec.where_, WhereRegion::NoOp) {
        return Err(PcgError::EmptyReduction);
    }

    let s1 = ctx.clusters.s1_or_ev();
    let s2 = ctx.clusters.s2_or_ev();
    let ss = windows::ss_dur(s1, ctx.sample_rate_hz);
    let s1s2 = windows::s1s2_dur(s1, s2, ctx.sample_rate_hz);
    let ranges = windows::region_ranges(
        spec.where_,
        spec.how == How::All,
        &ctx.clusters,
        ctx.sample_rate_hz,
        ss,
        s1s2,
        signal.len(),
    );

    let per_event: Vec<f64> = if spec.how == How::All {
        ranges
            .iter()
            .filter_map(|(_, r)| stats::windowed_std(signal, r.clone()))
            .collect()
    } else {
        let window_len = (0.1 * ctx.sample_rate_hz) as usize;
        let moving = stats::moving_std(signal, window_len);
        let reduction = match spec.how {
            How::Min => RangeReduction::Min,
            How::Max => RangeReduction::Max,
            How::MinMax => RangeReduction::MinMax,
            How::All => unreachable!("handled above"),
        };
        ranges
            .iter()
            .filter_map(|(_, r)| stats::reduce_range(&moving, r.clone(), reduction))
            .collect()
    };

    let median = stats::median_or_empty(per_event).ok_or(PcgError::EmptyReduction)?;

    if windows::subtracts_base(spec.where_) {
        let base_spec = derived_spec(spec, WhereRegion::Base, How::All);
        let base_value = primary_value(&base_spec, signal, ctx)?;
        Ok(median - base_value)
    } else {
        Ok(median)
    }
}

fn derived_spec(spec: &MarkerSpec, where_: WhereRegion, how: How) -> MarkerSpec {
    MarkerSpec {
        what: What::Abs,
        where_,
        to: "-".to_string(),
        how,
        f_lo: spec.f_lo,
        f_hi: spec.f_hi,
    }
}

/// `evaluate(base, all)`: this marker's own primary value at the `base`
/// region, with `how` forced to `all`.
fn evaluate_base(spec: &MarkerSpec, filtered: &[f32], ctx: &EvalContext<'_>) -> PcgResult<f64> {
    primary_value(&derived_spec(spec, WhereRegion::Base, How::All), filtered, ctx)
}

/// `evaluate(to, all)`: this marker's own primary value with `where`
/// replaced by the region named in `to`, `how` forced to `all`.
fn evaluate_to(spec: &MarkerSpec, ctx: &EvalContext<'_>) -> PcgResult<f64> {
    let region = parse_where(&spec.to).map_err(|_| PcgError::MalformedMarkerName {
        name: spec.to.clone(),
        reason: "`to` is not a recognized region token".to_string(),
    })?;
    let filtered = bandpass_if_needed(ctx.raw, ctx.sample_rate_hz, spec.f_lo, spec.f_hi);
    primary_value(&derived_spec(spec, region, How::All), &filtered, ctx)
}

fn eval_dur(spec: &MarkerSpec, ctx: &EvalContext<'_>) -> PcgResult<f64> {
    let s1 = ctx.clusters.s1_or_ev();
    let s2 = ctx.clusters.s2_or_ev();
    match spec.where_ {
        WhereRegion::Ss => Ok(windows::ss_dur(s1, ctx.sample_rate_hz)),
        WhereRegion::S1S2 => Ok(windows::s1s2_dur(s1, s2, ctx.sample_rate_hz)),
        _ => Err(PcgError::MalformedMarkerName {
            name: "dur".to_string(),
            reason: "`dur` only supports `where in {ss, s1s2}`".to_string(),
        }),
    }
}

/// Median time width of the region's events spent above `to`% of the
/// median absolute peak across those same events.
fn eval_width(spec: &MarkerSpec, ctx: &EvalContext<'_>) -> PcgResult<f64> {
    let level: f64 = spec.to.parse().map_err(|_| PcgError::MalformedMarkerName {
        name: spec.to.clone(),
        reason: "`width` requires a numeric `to` percentage".to_string(),
    })?;
    if !matches!(spec.where_, WhereRegion::S1 | WhereRegion::S2) {
        return Err(PcgError::MalformedMarkerName {
            name: "width".to_string(),
            reason: "`width` only supports `where in {s1, s2}`".to_string(),
        });
    }

    let filtered = bandpass_if_needed(ctx.raw, ctx.sample_rate_hz, spec.f_lo, spec.f_hi);
    let ranges = windows::region_ranges(spec.where_, false, &ctx.clusters, ctx.sample_rate_hz, 0.0, 0.0, filtered.len());

    let abs_maxes: Vec<f64> = ranges
        .iter()
        .filter_map(|(_, r)| {
            filtered[r.clone()]
                .iter()
                .map(|&x| (x as f64).abs())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        })
        .collect();
    let median_abs_max = stats::median_or_empty(abs_maxes).ok_or(PcgError::EmptyReduction)?;
    let threshold = median_abs_max * (level / 100.0);

    let widths: Vec<f64> = ranges
        .iter()
        .filter_map(|(_, r)| {
            let count = filtered[r.clone()].iter().filter(|&&x| (x as f64).abs() > threshold).count();
            (count > 0).then(|| count as f64 / ctx.sample_rate_hz)
        })
        .collect();
    stats::median_or_empty(widths).ok_or(PcgError::EmptyReduction)
}

fn evaluate_spec(spec: &MarkerSpec, ctx: &EvalContext<'_>) -> PcgResult<f64> {
    match spec.what {
        What::Ext => {
            tracing::debug!("ext marker evaluated: no external marker source is wired up");
            Err(PcgError::EmptyReduction)
        }
        What::Dur => eval_dur(spec, ctx),
        What::Width => eval_width(spec, ctx),
        What::Norm => {
            let filtered = bandpass_if_needed(ctx.raw, ctx.sample_rate_hz, spec.f_lo, spec.f_hi);
            let primary_filtered = primary_value(spec, &filtered, ctx)?;
            let primary_raw = primary_value(spec, ctx.raw, ctx)?;
            Ok(safe_div(primary_filtered, primary_raw))
        }
        What::Abs | What::Corr | What::Rel | What::RelCorr => {
            let filtered = bandpass_if_needed(ctx.raw, ctx.sample_rate_hz, spec.f_lo, spec.f_hi);
            let primary = primary_value(spec, &filtered, ctx)?;
            match spec.what {
                What::Abs => Ok(primary),
                What::Corr => {
                    let base = evaluate_base(spec, &filtered, ctx)?;
                    Ok(primary - base)
                }
                What::Rel => {
                    let to_value = evaluate_to(spec, ctx)?;
                    Ok(safe_div(primary, to_value))
                }
                What::RelCorr => {
                    let base = evaluate_base(spec, &filtered, ctx)?;
                    let to_value = evaluate_to(spec, ctx)?;
                    Ok(safe_div(primary - base, to_value))
                }
                _ => unreachable!("matched above"),
            }
        }
    }
}
