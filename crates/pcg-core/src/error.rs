use std::path::PathBuf;

/// Error taxonomy shared by every pipeline stage.
///
/// `Io` and `CorruptArtifact` are fatal: they propagate to the CLI and set a
/// non-zero exit code. Everything else describes a condition the pipeline
/// recovers from by downgrading the verdict to [`Verdict::Unknown`](crate::Verdict::Unknown)
/// rather than aborting.
#[derive(Debug, thiserror::Error)]
pub enum PcgError {
    /// Missing, unreadable, or truncated file.
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cached artifact (Blackman window, kernel, tree) does not match the
    /// shape its source file implies.
    #[error("corrupt cached artifact at {path}: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },

    /// The decision tree text file is malformed.
    #[error("malformed tree file {path} at line {line}: {reason}")]
    MalformedTree {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Fewer than 3 self-correlating events passed the acceptance threshold;
    /// the candidate template is not viable as a cluster center.
    #[error("insufficient self-correlating events for cluster formation")]
    InsufficientClusterEvents,

    /// `s1`/`s2` was requested but the retrigger engine only produced the
    /// primary `ev` cluster.
    #[error("paired s1/s2 clusters are not available; only the primary cluster was found")]
    PairedClusterUnavailable,

    /// A marker name did not parse as `what_where_to_how_f_lo_f_hi`.
    #[error("malformed marker name {name:?}: {reason}")]
    MalformedMarkerName { name: String, reason: String },

    /// A windowed reduction (std, min/max, width, ...) had no events whose
    /// window fit inside the signal bounds.
    #[error("empty reduction: no events had a fully in-bounds window")]
    EmptyReduction,
}

impl PcgError {
    /// Build an [`PcgError::Io`] from a path and the underlying error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
