use pcg_core::{PcgError, PcgResult, RetrigCluster};

/// The retrigger engine's three named cluster slots: `ev` is always
/// present (possibly empty), `s1`/`s2` only when a sibling cluster was
/// successfully paired.
#[derive(Debug, Clone, Default)]
pub struct RetriggerOutput {
    ev: RetrigCluster,
    paired: Option<(RetrigCluster, RetrigCluster)>,
}

impl RetriggerOutput {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn unpaired(ev: RetrigCluster) -> Self {
        Self { ev, paired: None }
    }

    pub(crate) fn paired(ev: RetrigCluster, s1: RetrigCluster, s2: RetrigCluster) -> Self {
        Self {
            ev,
            paired: Some((s1, s2)),
        }
    }

    /// The primary cluster; empty if the crude trigger or clustering stages
    /// found nothing self-consistent enough to keep.
    pub fn ev(&self) -> &RetrigCluster {
        &self.ev
    }

    /// Whether a sibling cluster was paired into `s1`/`s2`.
    pub fn is_paired(&self) -> bool {
        self.paired.is_some()
    }

    pub fn s1(&self) -> PcgResult<&RetrigCluster> {
        self.paired
            .as_ref()
            .map(|(s1, _)| s1)
            .ok_or(PcgError::PairedClusterUnavailable)
    }

    pub fn s2(&self) -> PcgResult<&RetrigCluster> {
        self.paired
            .as_ref()
            .map(|(_, s2)| s2)
            .ok_or(PcgError::PairedClusterUnavailable)
    }
}
