use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use pcg_core::{PcgError, PcgResult, Verdict};

/// Append one `<basename>,<r>` line to `answers.txt`, where `r` is
/// [`Verdict::answer_code`].
pub fn append_answer(path: impl AsRef<Path>, basename: &str, verdict: Verdict) -> PcgResult<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PcgError::io(path, source))?;
    writeln!(file, "{basename},{}", verdict.answer_code()).map_err(|source| PcgError::io(path, source))?;
    Ok(())
}
