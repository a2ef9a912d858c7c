//! Orchestration: wires the ambient I/O and the three core engines
//! together into one classification per recording.

use std::path::Path;

use pcg_core::{PcgResult, Verdict};
use pcg_markers::{Clusters, EvalContext};

use crate::config::Config;
use crate::stats::{PipelineStats, TreeUsed};

/// The verdict plus the diagnostics gathered while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub verdict: Verdict,
    pub stats: PipelineStats,
}

/// Run the full pipeline on one recording: read, filter, estimate energy,
/// crude-trigger, retrigger, check saturation, select and evaluate a tree.
#[tracing::instrument(skip(config), fields(waveform = %waveform_path.as_ref().display()))]
pub fn classify(
    waveform_path: impl AsRef<Path> + std::fmt::Debug,
    kernel_path: impl AsRef<Path> + std::fmt::Debug,
    params_dir: impl AsRef<Path> + std::fmt::Debug,
    config: &Config,
) -> PcgResult<PipelineOutput> {
    let raw = pcg_io::read_waveform(waveform_path.as_ref())?;
    tracing::debug!(samples = raw.len(), "waveform loaded");

    let mut filtered = raw.clone();
    pcg_dsp::bandpass_filter(&mut filtered, config.sample_rate_hz, config.bandpass.f_lo, config.bandpass.f_hi);

    let kernel = pcg_io::read_kernel(kernel_path.as_ref())?;
    let blackman = pcg_energy::blackman_window(config.energy_window_len());
    let energy = pcg_energy::estimate_energy(&filtered, &kernel, &blackman);

    let crude_events = pcg_dsp::crude_trigger::detect(&energy, config.sample_rate_hz, &config.crude_trigger);
    tracing::debug!(n = crude_events.len(), "crude trigger fired");

    let retrigger_config = config.retrigger_config();
    let retrigger_output = pcg_retrigger::run(&filtered, &energy, &crude_events, &retrigger_config)?;
    tracing::debug!(
        ev_len = retrigger_output.ev().len(),
        paired = retrigger_output.is_paired(),
        "retrigger complete"
    );

    let saturation = pcg_markers::check_saturation(&raw);
    if saturation.too_saturated {
        tracing::warn!(?saturation, "recording flagged as too saturated");
    }

    let (tree_name, tree_used) = if retrigger_output.is_paired() {
        ("s1s2.txt", TreeUsed::S1S2)
    } else if !retrigger_output.ev().is_empty() {
        ("ev.txt", TreeUsed::Ev)
    } else {
        ("rest.txt", TreeUsed::Rest)
    };
    let tree_path = params_dir.as_ref().join(tree_name);
    let tree = pcg_io::read_tree(&tree_path)?;

    let clusters = Clusters {
        ev: retrigger_output.ev(),
        s1: retrigger_output.s1().ok().map(Vec::as_slice),
        s2: retrigger_output.s2().ok().map(Vec::as_slice),
    };
    let ctx = EvalContext {
        raw: &raw,
        clusters,
        sample_rate_hz: config.sample_rate_hz,
    };

    let verdict = pcg_tree::evaluate(&tree, &ctx);
    tracing::info!(%verdict, tree = %tree_used, "classification complete");

    Ok(PipelineOutput {
        verdict,
        stats: PipelineStats {
            crude_event_count: crude_events.len(),
            ev_cluster_len: retrigger_output.ev().len(),
            paired: retrigger_output.is_paired(),
            tree_used,
            saturation,
        },
    })
}
