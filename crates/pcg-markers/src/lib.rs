//! The marker-extraction engine: a small expression language over
//! windowed waveform statistics, keyed by a structured marker name.

mod eval;
mod saturation;
mod spec;
mod stats;
mod windows;

pub use eval::{evaluate, EvalContext};
pub use saturation::{check_saturation, SaturationReport};
pub use spec::{How, MarkerSpec, What, WhereRegion};
pub use windows::Clusters;
