use std::fs;
use std::path::Path;

use pcg_core::{PcgError, PcgResult};

/// Load the convolution kernel: one real value per line, ASCII, cached by
/// the source file's inode.
pub fn read_kernel(path: impl AsRef<Path>) -> PcgResult<Vec<f64>> {
    let path = path.as_ref();
    crate::cache::load_or_compute(path, &cache_name(path), || parse_kernel(path))
}

fn cache_name(path: &Path) -> String {
    let stem = path.file_name().and_then(|s| s.to_str()).unwrap_or("kernel");
    format!("kernel-{stem}.bin")
}

fn parse_kernel(path: &Path) -> PcgResult<Vec<f64>> {
    let text = fs::read_to_string(path).map_err(|source| PcgError::io(path, source))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.trim().parse::<f64>().map_err(|_| PcgError::CorruptArtifact {
                path: path.to_path_buf(),
                reason: format!("non-numeric kernel line: {line:?}"),
            })
        })
        .collect()
}
