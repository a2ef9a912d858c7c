use std::path::Path;

use pcg_core::{PcgError, PcgResult, SAMPLE_RATE_HZ};

const MAX_RANGE: f32 = 2000.0;
const SHORT_RECORDING_SAMPLES: usize = 4000;

/// Read a single-channel, little-endian 16-bit PCM WAV file, decode it to
/// `f32`, and apply the reader's baseline/amplitude normalization.
///
/// The recording's own sample rate is trusted over [`SAMPLE_RATE_HZ`] only
/// for a sanity check; every stage downstream assumes 2000 Hz.
pub fn read_waveform(path: impl AsRef<Path>) -> PcgResult<Vec<f32>> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path).map_err(|err| PcgError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })?;

    let spec = reader.spec();
    if spec.sample_rate as f64 != SAMPLE_RATE_HZ {
        tracing::warn!(
            path = %path.display(),
            found = spec.sample_rate,
            expected = SAMPLE_RATE_HZ,
            "waveform sample rate does not match the pipeline's fixed rate",
        );
    }

    let samples: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32))
        .collect::<Result<_, _>>()
        .map_err(|err| PcgError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })?;

    Ok(normalize(samples))
}

/// Stage 2-3 of the reader contract: subtract a baseline mean, then scale
/// by the range observed over a middle window. Mirrors the reference
/// implementation's fallback to whole-signal statistics for short
/// recordings (`N <= 4000`).
fn normalize(mut samples: Vec<f32>) -> Vec<f32> {
    let n = samples.len();
    if n == 0 {
        return samples;
    }

    let baseline_range = if n <= SHORT_RECORDING_SAMPLES { 0..n } else { 1000..n };
    let baseline = mean(&samples[baseline_range]);
    for x in samples.iter_mut() {
        *x -= baseline;
    }

    let scale_range = if n >= 10_000 {
        2000..9000
    } else if n >= SHORT_RECORDING_SAMPLES {
        1000..(n - 1000)
    } else {
        0..n
    };
    let (min, max) = min_max(&samples[scale_range]);
    let spread = max - min;
    if spread > 0.0 {
        let scale = MAX_RANGE / spread;
        for x in samples.iter_mut() {
            *x *= scale;
        }
    }

    samples
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn min_max(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
}
