use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use pcg_core::{PcgError, PcgResult};
use serde::{de::DeserializeOwned, Serialize};

/// A binary cache entry keyed by the source file's inode number. A stale
/// inode (the source file was replaced) is treated as a cache miss, not a
/// corruption.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Entry<T> {
    source_ino: u64,
    value: T,
}

fn cache_dir() -> PcgResult<PathBuf> {
    let base = dirs::cache_dir().ok_or_else(|| PcgError::CorruptArtifact {
        path: PathBuf::from("<cache_dir>"),
        reason: "no OS cache directory is available on this platform".to_string(),
    })?;
    let dir = base.join("pcg-classify");
    fs::create_dir_all(&dir).map_err(|source| PcgError::io(dir.clone(), source))?;
    Ok(dir)
}

fn cache_path(cache_name: &str) -> PcgResult<PathBuf> {
    Ok(cache_dir()?.join(cache_name))
}

fn source_ino(source_path: &Path) -> PcgResult<u64> {
    let metadata = fs::metadata(source_path).map_err(|source| PcgError::io(source_path, source))?;
    Ok(metadata.ino())
}

/// Load a cached value for `source_path` under `cache_name`, verifying the
/// source file's inode still matches. Falls through to `compute` on any
/// cache miss (absent file, stale inode, or corrupt bytes); a corrupt cache
/// is deleted so the next run starts clean rather than failing forever.
pub fn load_or_compute<T, F>(source_path: &Path, cache_name: &str, compute: F) -> PcgResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> PcgResult<T>,
{
    let ino = source_ino(source_path)?;
    let path = cache_path(cache_name)?;

    if let Ok(bytes) = fs::read(&path) {
        match bincode::deserialize::<Entry<T>>(&bytes) {
            Ok(entry) if entry.source_ino == ino => return Ok(entry.value),
            Ok(_) => {
                tracing::debug!(cache = cache_name, "cache inode stale, recomputing");
            }
            Err(err) => {
                tracing::warn!(cache = cache_name, %err, "corrupt cache entry, deleting and recomputing");
                let _ = fs::remove_file(&path);
            }
        }
    }

    let value = compute()?;
    let entry = Entry { source_ino: ino, value };
    if let Ok(bytes) = bincode::serialize(&entry) {
        if let Err(err) = fs::write(&path, bytes) {
            tracing::warn!(cache = cache_name, %err, "failed to persist cache entry");
        }
    }
    Ok(entry.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn recomputes_when_cache_directory_is_unwritable_but_source_exists() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "1.0\n2.0\n3.0").unwrap();
        let calls = std::cell::Cell::new(0);
        let value: Vec<f64> = load_or_compute(tmp.path(), "pcg-io-test-kernel", || {
            calls.set(calls.get() + 1);
            Ok(vec![1.0, 2.0, 3.0])
        })
        .unwrap();
        assert_eq!(value, vec![1.0, 2.0, 3.0]);
        assert!(calls.get() >= 1);
    }
}
