//! End-to-end tests: synthesize a waveform, a kernel, and a tree on disk,
//! then run the real pipeline over them exactly as `pcg-classify` would.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;

use pcg::{Config, TreeUsed};
use pcg_core::Verdict;

const SAMPLE_RATE: u32 = 2000;

fn write_wav(path: &Path, samples: &[i16]) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn write_kernel(path: &Path, taps: &[f64]) {
    let text: String = taps.iter().map(|t| format!("{t}\n")).collect();
    std::fs::write(path, text).unwrap();
}

/// Writes `rest.txt` and two placeholder `s1s2.txt`/`ev.txt` files so
/// `classify` can resolve any of the three names the pipeline might pick.
fn write_params_dir(dir: &Path, rest_tree: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("rest.txt"), rest_tree).unwrap();
    std::fs::write(dir.join("ev.txt"), rest_tree).unwrap();
    std::fs::write(dir.join("s1s2.txt"), rest_tree).unwrap();
}

/// A tree whose sole marker samples quiescent background every 3s: it
/// succeeds even with no retrigger clusters at all.
fn untrigged_tree(split_value: f64, left_class: i64, right_class: i64) -> String {
    format!("1\t3\nabs_untrigged_-_all_0_0\t{split_value}\t0\t{left_class}\t{right_class}\n")
}

#[test]
fn silence_evaluates_against_the_rest_tree() {
    let dir = TempDir::new().unwrap();
    let wav_path = dir.path().join("a0001.wav");
    write_wav(&wav_path, &vec![0i16; 5000]);

    let kernel_path = dir.path().join("kernel.csv");
    write_kernel(&kernel_path, &[0.2, 0.2, 0.2, 0.2, 0.2]);

    let params_dir = dir.path().join("params");
    // split_value 1.0 >= primary value 0.0: takes the left branch.
    write_params_dir(&params_dir, &untrigged_tree(1.0, -2, -3));

    let output = pcg::classify(&wav_path, &kernel_path, &params_dir, &Config::default()).unwrap();

    assert_eq!(output.stats.tree_used, TreeUsed::Rest);
    assert_eq!(output.stats.crude_event_count, 0);
    assert!(!output.stats.paired);
    assert_eq!(output.verdict, Verdict::Abnormal);
}

#[test]
fn marker_needing_events_falls_back_to_unknown_on_silence() {
    let dir = TempDir::new().unwrap();
    let wav_path = dir.path().join("a0002.wav");
    write_wav(&wav_path, &vec![0i16; 5000]);

    let kernel_path = dir.path().join("kernel.csv");
    write_kernel(&kernel_path, &[0.2, 0.2, 0.2, 0.2, 0.2]);

    let params_dir = dir.path().join("params");
    let tree = "1\t3\nabs_s1_-_all_0_0\t0.0\t0\t-2\t-3\n";
    write_params_dir(&params_dir, tree);

    let output = pcg::classify(&wav_path, &kernel_path, &params_dir, &Config::default()).unwrap();

    // No crude-trigger events at all, so the s1 region has no events to
    // window: the marker fails and the tree must default to unknown
    // rather than decoding either leaf.
    assert_eq!(output.verdict, Verdict::Unknown);
}

#[test]
fn missing_waveform_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let kernel_path = dir.path().join("kernel.csv");
    write_kernel(&kernel_path, &[1.0]);
    let params_dir = dir.path().join("params");
    write_params_dir(&params_dir, &untrigged_tree(0.0, -2, -3));

    let result = pcg::classify(
        dir.path().join("does-not-exist.wav"),
        &kernel_path,
        &params_dir,
        &Config::default(),
    );

    assert!(result.is_err());
}

#[test]
fn malformed_kernel_file_is_a_corrupt_artifact_error() {
    let dir = TempDir::new().unwrap();
    let wav_path = dir.path().join("a0003.wav");
    write_wav(&wav_path, &vec![0i16; 5000]);

    let kernel_path = dir.path().join("kernel.csv");
    std::fs::write(&kernel_path, "0.2\nnot-a-number\n0.2\n").unwrap();

    let params_dir = dir.path().join("params");
    write_params_dir(&params_dir, &untrigged_tree(0.0, -2, -3));

    let result = pcg::classify(&wav_path, &kernel_path, &params_dir, &Config::default());

    assert!(matches!(result, Err(pcg_core::PcgError::CorruptArtifact { .. })));
}

#[test]
fn malformed_tree_header_is_a_malformed_tree_error() {
    let dir = TempDir::new().unwrap();
    let wav_path = dir.path().join("a0004.wav");
    write_wav(&wav_path, &vec![0i16; 5000]);

    let kernel_path = dir.path().join("kernel.csv");
    write_kernel(&kernel_path, &[0.2, 0.2, 0.2, 0.2, 0.2]);

    let params_dir = dir.path().join("params");
    write_params_dir(&params_dir, "not a valid tree header\n");

    let result = pcg::classify(&wav_path, &kernel_path, &params_dir, &Config::default());

    assert!(matches!(result, Err(pcg_core::PcgError::MalformedTree { .. })));
}

#[test]
fn a_long_clipped_run_is_flagged_as_saturated() {
    let dir = TempDir::new().unwrap();
    let wav_path = dir.path().join("a0005.wav");

    let n = 6000usize;
    let mut samples: Vec<i16> = (0..n).map(|i| (i % 100) as i16).collect();
    for s in samples.iter_mut().skip(2000).take(200) {
        *s = 20000;
    }
    write_wav(&wav_path, &samples);

    let kernel_path = dir.path().join("kernel.csv");
    write_kernel(&kernel_path, &[0.2, 0.2, 0.2, 0.2, 0.2]);

    let params_dir = dir.path().join("params");
    write_params_dir(&params_dir, &untrigged_tree(1e10, -2, -3));

    let output = pcg::classify(&wav_path, &kernel_path, &params_dir, &Config::default()).unwrap();

    assert!(output.stats.saturation.too_saturated);
    assert_eq!(output.stats.saturation.tot_n_saturated, 1);
    assert_eq!(output.stats.saturation.tot_len_saturated, 200);
}
