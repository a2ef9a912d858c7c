//! The retrigger engine: given an energy signal, a bandpass-filtered
//! waveform, and a coarse event list, produces zero, one, or two clusters
//! of mutually self-similar refined events.

mod cluster;
mod correlation;
mod extended_event;
mod output;
mod pairing;

pub use output::RetriggerOutput;

use pcg_core::{PcgResult, ReferenceEvent, Window, REF_EV_LIMIT};

/// Tunables for one retrigger run, scaled to samples from the caller's
/// seconds-denominated configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetriggerConfig {
    pub sample_rate_hz: f64,
    pub lookaround: Window,
    pub correlation: Window,
    pub correlation_limit: f64,
}

impl RetriggerConfig {
    /// Defaults named in the reference engine: a 0.05s/0.025s lookaround
    /// window, a 0.25s/0.125s correlation window, and a 0.8 acceptance limit.
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            sample_rate_hz,
            lookaround: Window::from_seconds(0.05, 0.025, sample_rate_hz),
            correlation: Window::from_seconds(0.25, 0.125, sample_rate_hz),
            correlation_limit: 0.8,
        }
    }
}

/// Run the full retrigger pipeline: intake, correlation-based template
/// scoring, cluster formation, and S1/S2 disambiguation.
#[tracing::instrument(skip_all, fields(crude_events = crude_events.len()))]
pub fn run(
    filtered: &[f32],
    energy: &[f32],
    crude_events: &[ReferenceEvent],
    config: &RetriggerConfig,
) -> PcgResult<RetriggerOutput> {
    let capped = cap_and_center(crude_events, REF_EV_LIMIT);
    let mut arena = extended_event::intake(&capped, energy, config.lookaround);
    if arena.is_empty() {
        tracing::debug!("no reference event produced a valid extended event");
        return Ok(RetriggerOutput::empty());
    }

    let mut scored: Vec<(usize, cluster::TemplateScore)> = (0..arena.len())
        .filter_map(|idx| {
            cluster::score_template(&arena, idx, filtered, config).map(|score| (idx, score))
        })
        .collect();

    if scored.is_empty() {
        tracing::debug!("no template accumulated a viable correlation stack");
        return Ok(RetriggerOutput::empty());
    }

    scored.sort_by(|a, b| {
        let key = |s: &cluster::TemplateScore| s.p * s.stack.len() as f64;
        key(&b.1)
            .partial_cmp(&key(&a.1))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut primary_cluster = None;
    let mut sibling_cluster = None;

    for (idx, score) in &scored {
        if arena[*idx].assigned {
            continue;
        }
        if primary_cluster.is_some() && score.stack.iter().all(|&u| arena[u].assigned) {
            continue;
        }

        let Some(members) =
            cluster::form_cluster(&arena, *idx, &score.stack, score.p, filtered, energy, config)
        else {
            continue;
        };

        arena[*idx].assigned = true;
        for &u in &score.stack {
            arena[u].assigned = true;
        }

        if primary_cluster.is_none() {
            primary_cluster = Some(members);
        } else {
            match pairing::try_pair(primary_cluster.as_ref().unwrap(), &members, config.sample_rate_hz)
            {
                pairing::PairOutcome::Accepted { s1, s2 } => {
                    sibling_cluster = Some((s1, s2));
                    break;
                }
                pairing::PairOutcome::Rejected => {
                    break;
                }
            }
        }
    }

    let Some(ev) = primary_cluster else {
        return Ok(RetriggerOutput::empty());
    };

    match sibling_cluster {
        Some((s1, s2)) => Ok(RetriggerOutput::paired(ev, s1, s2)),
        None => Ok(RetriggerOutput::unpaired(ev)),
    }
}

/// Truncate `events` to the middlemost `limit` entries (by offset order),
/// re-sorted by offset, matching the intake cap described for the engine.
fn cap_and_center(events: &[ReferenceEvent], limit: usize) -> Vec<ReferenceEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.offset);
    if sorted.len() <= limit {
        return sorted;
    }
    let excess = sorted.len() - limit;
    let start = excess / 2;
    sorted[start..start + limit].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_and_center_keeps_middlemost_events() {
        let events: Vec<ReferenceEvent> = (0..120)
            .map(|i| ReferenceEvent { offset: i * 10 })
            .collect();
        let capped = cap_and_center(&events, REF_EV_LIMIT);
        assert_eq!(capped.len(), REF_EV_LIMIT);
        assert_eq!(capped.first().unwrap().offset, 100);
        assert_eq!(capped.last().unwrap().offset, 1090);
    }

    #[test]
    fn cap_and_center_is_noop_under_limit() {
        let events: Vec<ReferenceEvent> = (0..5).map(|i| ReferenceEvent { offset: i * 10 }).collect();
        assert_eq!(cap_and_center(&events, REF_EV_LIMIT), events);
    }

    proptest::proptest! {
        /// `cap_and_center` must never grow the input, never exceed `limit`,
        /// and always leave the result sorted by offset, no matter how the
        /// input offsets were ordered going in.
        #[test]
        fn cap_and_center_stays_within_limit_and_sorted(mut offsets in proptest::collection::vec(0usize..1_000_000, 0..250)) {
            offsets.sort_unstable();
            let events: Vec<ReferenceEvent> = offsets.iter().map(|&offset| ReferenceEvent { offset }).collect();
            let capped = cap_and_center(&events, REF_EV_LIMIT);
            proptest::prop_assert!(capped.len() <= REF_EV_LIMIT);
            proptest::prop_assert!(capped.len() <= events.len());
            proptest::prop_assert!(capped.windows(2).all(|w| w[0].offset <= w[1].offset));
        }
    }

    #[test]
    fn empty_crude_events_yield_empty_output() {
        let config = RetriggerConfig::new(2000.0);
        let energy = vec![0.0f32; 4000];
        let filtered = vec![0.0f32; 4000];
        let out = run(&filtered, &energy, &[], &config).unwrap();
        assert!(out.ev().is_empty());
    }
}
