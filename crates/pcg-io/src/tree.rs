use std::fs;
use std::path::Path;

use pcg_core::{PcgError, PcgResult};
use pcg_tree::Tree;

/// Load a decision tree's text file, cached by the source file's inode.
pub fn read_tree(path: impl AsRef<Path>) -> PcgResult<Tree> {
    let path = path.as_ref();
    let owned = path.to_path_buf();
    crate::cache::load_or_compute(path, &cache_name(path), move || parse_tree(&owned))
}

fn cache_name(path: &Path) -> String {
    let stem = path.file_name().and_then(|s| s.to_str()).unwrap_or("tree");
    format!("tree-{stem}.bin")
}

fn parse_tree(path: &Path) -> PcgResult<Tree> {
    let text = fs::read_to_string(path).map_err(|source| PcgError::io(path, source))?;
    pcg_tree::parse_text(&text, path)
}
