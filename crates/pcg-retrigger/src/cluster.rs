use pcg_core::{RetrigCluster, RetrigEvent};

use crate::correlation::{correlation_signal, max_in_window};
use crate::extended_event::ExtendedEvent;
use crate::RetriggerConfig;

const THRESHOLD_START: f64 = 0.95;
const THRESHOLD_FLOOR: f64 = 0.80;
const THRESHOLD_STEP: f64 = 0.025;
const PEER_ACCEPT_FLOOR: f64 = 0.6;
const MIN_CLUSTER_EVENTS: usize = 3;
const MERGE_JITTER: usize = 100;

#[derive(Debug, Clone)]
pub(crate) struct TemplateScore {
    pub stack: Vec<usize>,
    pub p: f64,
}

/// Stage 4.2.3: score `idx` as a candidate cluster center by correlating it
/// against every other extended event, keeping peers whose peak
/// correlation clears `config.correlation_limit`.
pub(crate) fn score_template(
    arena: &[ExtendedEvent],
    idx: usize,
    filtered: &[f32],
    config: &RetriggerConfig,
) -> Option<TemplateScore> {
    let template = &arena[idx];
    let c_t = correlation_signal(filtered, config.correlation, template.refined_offset);

    let mut stack = Vec::new();
    let mut sum_q = 0.0;
    for (u_idx, u) in arena.iter().enumerate() {
        if u_idx == idx {
            continue;
        }
        let q = max_in_window(&c_t, config.lookaround, u.refined_offset).unwrap_or(0.0);
        if q >= config.correlation_limit {
            stack.push(u_idx);
            sum_q += q;
        }
    }

    if stack.len() < MIN_CLUSTER_EVENTS {
        return None;
    }

    let p = (1.0 + sum_q) / (1.0 + stack.len() as f64);
    Some(TemplateScore { stack, p })
}

/// Stage 4.2.4: descend the acceptance threshold from 0.95 to 0.80 until at
/// least 3 raw events emerge from `stack`'s members, peak-sharpen and
/// jitter-merge them, and return the finished cluster.
pub(crate) fn form_cluster(
    arena: &[ExtendedEvent],
    template_idx: usize,
    stack: &[usize],
    p: f64,
    filtered: &[f32],
    energy: &[f32],
    config: &RetriggerConfig,
) -> Option<RetrigCluster> {
    let template_offset = arena[template_idx].refined_offset;

    // Pre-compute each stack member's correlation signal and offset delta
    // against the template once; members whose best correlation against
    // the template is below the peer-accept floor take no part in raw
    // event generation (they are still marked assigned by the caller).
    let mut eligible: Vec<(Vec<f32>, isize)> = Vec::new();
    for &u_idx in stack {
        let u = &arena[u_idx];
        let c_u = correlation_signal(filtered, config.correlation, u.refined_offset);
        let Some(range) = config.lookaround.range_at(template_offset, c_u.len()) else {
            continue;
        };
        let Some((best_idx, best_val)) = c_u[range.clone()]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        else {
            continue;
        };
        if (*best_val as f64) < PEER_ACCEPT_FLOOR {
            continue;
        }
        let delta = (range.start + best_idx) as isize - u.refined_offset as isize;
        eligible.push((c_u, delta));
    }

    if eligible.is_empty() {
        return None;
    }

    let mut d = THRESHOLD_START;
    while d >= THRESHOLD_FLOOR - 1e-9 {
        let mut raw: Vec<(f64, f64)> = Vec::new(); // (offset, p)

        for (c_u, delta_u) in &eligible {
            let half = config.correlation.len / 2;
            if c_u.len() <= half {
                continue;
            }
            let mut i = half;
            while i < c_u.len() - half {
                if (c_u[i] as f64) > d {
                    let sharpen_end = (i + config.correlation.len).min(c_u.len());
                    let (peak_idx, _) = c_u[i..sharpen_end]
                        .iter()
                        .enumerate()
                        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                        .expect("non-empty sharpening window");
                    let sharpened = i + peak_idx;
                    raw.push((sharpened as f64 - *delta_u as f64, p));
                }
                i += 1;
            }
        }

        raw.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        let merged = merge_jitter(&raw, MERGE_JITTER);

        if merged.len() >= MIN_CLUSTER_EVENTS {
            return Some(
                merged
                    .into_iter()
                    .filter_map(|(offset, p)| {
                        let offset = offset.round();
                        if offset < 0.0 {
                            return None;
                        }
                        let offset = offset as usize;
                        let nominal_energy = *energy.get(offset)?;
                        Some(RetrigEvent {
                            offset,
                            p,
                            nominal_energy,
                        })
                    })
                    .collect(),
            );
        }

        d -= THRESHOLD_STEP;
    }

    None
}

/// Merge events within `jitter` samples of each other into one event whose
/// offset and `p` are the arithmetic mean of the merged group.
fn merge_jitter(raw: &[(f64, f64)], jitter: usize) -> Vec<(f64, f64)> {
    let mut merged = Vec::new();
    let mut group: Vec<(f64, f64)> = Vec::new();

    for &(offset, p) in raw {
        if let Some(&(last_offset, _)) = group.last() {
            if offset - last_offset > jitter as f64 {
                merged.push(average_group(&group));
                group.clear();
            }
        }
        group.push((offset, p));
    }
    if !group.is_empty() {
        merged.push(average_group(&group));
    }
    merged
}

fn average_group(group: &[(f64, f64)]) -> (f64, f64) {
    let n = group.len() as f64;
    let offset = group.iter().map(|(o, _)| o).sum::<f64>() / n;
    let p = group.iter().map(|(_, p)| p).sum::<f64>() / n;
    (offset, p)
}
