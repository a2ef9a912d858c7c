//! Pipeline-wide configuration: every tunable named in the reference
//! classifier's constructor/`main` wiring, collected into one struct built
//! once per recording.

use pcg_dsp::crude_trigger::CrudeTriggerConfig;
use pcg_retrigger::RetriggerConfig;

/// The main IIR bandpass applied before energy estimation and retrigger
/// correlation (distinct from a marker's own per-name `f_lo`/`f_hi` band).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandpassConfig {
    pub f_lo: f64,
    pub f_hi: f64,
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self { f_lo: 10.0, f_hi: 500.0 }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub sample_rate_hz: f64,
    pub bandpass: BandpassConfig,
    /// Blackman window length for energy smoothing, in seconds.
    pub energy_window_s: f64,
    pub crude_trigger: CrudeTriggerConfig,
    pub lookaround_s: (f64, f64),
    pub correlation_s: (f64, f64),
    pub correlation_limit: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate_hz: pcg_core::SAMPLE_RATE_HZ,
            bandpass: BandpassConfig::default(),
            energy_window_s: 0.25,
            crude_trigger: CrudeTriggerConfig::default(),
            lookaround_s: (0.05, 0.025),
            correlation_s: (0.25, 0.125),
            correlation_limit: 0.8,
        }
    }
}

impl Config {
    pub fn energy_window_len(&self) -> usize {
        (self.energy_window_s * self.sample_rate_hz) as usize
    }

    pub fn retrigger_config(&self) -> RetriggerConfig {
        RetriggerConfig {
            sample_rate_hz: self.sample_rate_hz,
            lookaround: pcg_core::Window::from_seconds(self.lookaround_s.0, self.lookaround_s.1, self.sample_rate_hz),
            correlation: pcg_core::Window::from_seconds(self.correlation_s.0, self.correlation_s.1, self.sample_rate_hz),
            correlation_limit: self.correlation_limit,
        }
    }
}
