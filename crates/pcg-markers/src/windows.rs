use std::ops::Range;

use pcg_core::{order_stat, RetrigEvent};

use crate::spec::WhereRegion;

const S_START_S: f64 = -0.1;
const S_END_S: f64 = 0.1;
const M_S: f64 = 0.05;
const RR_DEFAULT_S: f64 = 0.8;
const S1S2_DEFAULT_S: f64 = 0.4;

/// The two cluster slots markers are evaluated against. When the retrigger
/// engine only produced a primary cluster (no S1/S2 pairing), both the
/// `s1` and `s2` regions fall back to it: the `ev`-only tree's markers are
/// evaluated against the single cluster that exists.
#[derive(Debug, Clone, Copy)]
pub struct Clusters<'a> {
    pub ev: &'a [RetrigEvent],
    pub s1: Option<&'a [RetrigEvent]>,
    pub s2: Option<&'a [RetrigEvent]>,
}

impl<'a> Clusters<'a> {
    pub fn s1_or_ev(&self) -> &'a [RetrigEvent] {
        self.s1.unwrap_or(self.ev)
    }

    pub fn s2_or_ev(&self) -> &'a [RetrigEvent] {
        self.s2.unwrap_or(self.ev)
    }
}

/// Median of inter-S1 intervals within `[0.6, 2.2]` seconds; `RR_DEFAULT_S`
/// if none qualify.
pub fn ss_dur(s1: &[RetrigEvent], sample_rate_hz: f64) -> f64 {
    let mut intervals: Vec<f64> = s1
        .windows(2)
        .map(|w| (w[1].offset as f64 - w[0].offset as f64) / sample_rate_hz)
        .filter(|&d| (0.6..=2.2).contains(&d))
        .collect();
    order_stat::median(&mut intervals).unwrap_or(RR_DEFAULT_S)
}

/// Median of the first-S2-after-each-S1 gap within `[0.2, 0.6]` seconds;
/// `S1S2_DEFAULT_S` if none qualify.
pub fn s1s2_dur(s1: &[RetrigEvent], s2: &[RetrigEvent], sample_rate_hz: f64) -> f64 {
    let mut gaps: Vec<f64> = s1
        .iter()
        .filter_map(|s1_ev| {
            s2.iter()
                .find(|s2_ev| s2_ev.offset > s1_ev.offset)
                .map(|s2_ev| (s2_ev.offset as f64 - s1_ev.offset as f64) / sample_rate_hz)
        })
        .filter(|&d| (0.2..=0.6).contains(&d))
        .collect();
    order_stat::median(&mut gaps).unwrap_or(S1S2_DEFAULT_S)
}

fn build_ranges(
    anchor: &[RetrigEvent],
    start_s: f64,
    end_s: f64,
    sample_rate_hz: f64,
    signal_len: usize,
) -> Vec<(usize, Range<usize>)> {
    anchor
        .iter()
        .filter_map(|e| {
            let start = e.offset as isize + (start_s * sample_rate_hz).round() as isize;
            let end = e.offset as isize + (end_s * sample_rate_hz).round() as isize;
            if start < 0 || end <= start {
                return None;
            }
            let (start, end) = (start as usize, end as usize);
            if end > signal_len {
                return None;
            }
            Some((e.offset, start..end))
        })
        .collect()
}

fn q_ranges(
    anchor: &[RetrigEvent],
    k: u32,
    s1s2_dur: f64,
    sample_rate_hz: f64,
    signal_len: usize,
) -> Vec<(usize, Range<usize>)> {
    let center = (k as f64 / 4.0) * s1s2_dur;
    build_ranges(anchor, center - 0.025, center + 0.025, sample_rate_hz, signal_len)
}

/// Global windows at strides of 3s starting 1s in, not anchored to any
/// event; used by `where = untrigged` to sample quiescent background.
fn untrigged_ranges(signal_len: usize, sample_rate_hz: f64) -> Vec<(usize, Range<usize>)> {
    let half_width = ((S_END_S - S_START_S) / 2.0 * sample_rate_hz).round() as usize;
    let mut out = Vec::new();
    let mut t = 1.0;
    while ((t * sample_rate_hz) as usize) < signal_len {
        let center = (t * sample_rate_hz) as usize;
        if let Some(start) = center.checked_sub(half_width) {
            let end = center + half_width;
            if end <= signal_len {
                out.push((center, start..end));
            }
        }
        t += 3.0;
    }
    out
}

/// The per-event sample ranges for `where_`, per the region window table:
/// one `(anchor_offset, range)` pair per qualifying event, silently
/// dropping events whose window would run outside `[0, signal_len)`.
pub fn region_ranges(
    where_: WhereRegion,
    how_all: bool,
    clusters: &Clusters<'_>,
    sample_rate_hz: f64,
    ss_dur: f64,
    s1s2_dur: f64,
    signal_len: usize,
) -> Vec<(usize, Range<usize>)> {
    match where_ {
        WhereRegion::S1 => build_ranges(clusters.s1_or_ev(), S_START_S, S_END_S, sample_rate_hz, signal_len),
        WhereRegion::S2 => build_ranges(clusters.s2_or_ev(), S_START_S, S_END_S, sample_rate_hz, signal_len),
        WhereRegion::S => {
            let mut ranges = build_ranges(clusters.s1_or_ev(), S_START_S, S_END_S, sample_rate_hz, signal_len);
            if how_all {
                ranges.extend(build_ranges(
                    clusters.s2_or_ev(),
                    S_START_S,
                    S_END_S,
                    sample_rate_hz,
                    signal_len,
                ));
            }
            ranges
        }
        WhereRegion::S1S2 => build_ranges(
            clusters.s1_or_ev(),
            S_END_S + M_S,
            s1s2_dur - M_S,
            sample_rate_hz,
            signal_len,
        ),
        WhereRegion::S2S1 => build_ranges(
            clusters.s2_or_ev(),
            -M_S - ss_dur + s1s2_dur,
            -M_S,
            sample_rate_hz,
            signal_len,
        ),
        WhereRegion::Ss => build_ranges(clusters.s1_or_ev(), S_END_S + M_S, ss_dur - M_S, sample_rate_hz, signal_len),
        WhereRegion::Base => build_ranges(clusters.s1_or_ev(), -0.125, -0.075, sample_rate_hz, signal_len),
        WhereRegion::Q1 => q_ranges(clusters.s1_or_ev(), 1, s1s2_dur, sample_rate_hz, signal_len),
        WhereRegion::Q2 => q_ranges(clusters.s1_or_ev(), 2, s1s2_dur, sample_rate_hz, signal_len),
        WhereRegion::Q3 => q_ranges(clusters.s1_or_ev(), 3, s1s2_dur, sample_rate_hz, signal_len),
        WhereRegion::Q5 => q_ranges(clusters.s2_or_ev(), 1, s1s2_dur, sample_rate_hz, signal_len),
        WhereRegion::Q6 => q_ranges(clusters.s2_or_ev(), 2, s1s2_dur, sample_rate_hz, signal_len),
        WhereRegion::Untrigged => untrigged_ranges(signal_len, sample_rate_hz),
        WhereRegion::NoOp => Vec::new(),
    }
}

/// Whether `where_` subtracts the `base` region's value from its
/// per-event statistic before reducing (the quarter-cycle markers only).
pub fn subtracts_base(where_: WhereRegion) -> bool {
    matches!(
        where_,
        WhereRegion::Q1 | WhereRegion::Q2 | WhereRegion::Q3 | WhereRegion::Q5 | WhereRegion::Q6
    )
}
