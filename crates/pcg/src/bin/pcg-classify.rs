//! `pcg-classify <kernel_csv> <waveform_basename>`: classifies one
//! recording and appends the result to `answers.txt`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pcg::Config;

#[derive(Parser, Debug)]
#[command(about = "Classify a phonocardiogram recording as normal, abnormal, or unknown")]
struct Args {
    /// Path to the convolution kernel CSV file.
    kernel_csv: PathBuf,

    /// Waveform base name, e.g. `a0001` for `a0001.wav`.
    waveform_basename: String,

    /// Directory containing `s1s2.txt`, `ev.txt`, `rest.txt`.
    #[arg(long, default_value = "params")]
    params_dir: PathBuf,

    /// Path to append `<basename>,<r>` results to.
    #[arg(long, default_value = "answers.txt")]
    answers_file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "pcg=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let waveform_path = format!("{}.wav", args.waveform_basename);
    let config = Config::default();

    let output = pcg::classify(&waveform_path, &args.kernel_csv, &args.params_dir, &config)
        .with_context(|| format!("classifying {waveform_path}"))?;

    println!("verdict: {} (tree: {})", output.verdict, output.stats.tree_used);
    if output.stats.saturation.too_saturated {
        println!("warning: recording flagged as saturated/clipped");
    }

    pcg_io::append_answer(&args.answers_file, &args.waveform_basename, output.verdict)
        .context("appending to answers file")?;

    Ok(())
}
