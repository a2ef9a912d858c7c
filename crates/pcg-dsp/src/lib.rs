//! External DSP collaborators that the retrigger, energy, and marker engines
//! treat as given: a cascaded-biquad bandpass filter bank and the crude
//! amplitude-threshold trigger that seeds the first coarse event list.

mod biquad;
mod chebyshev;
pub mod crude_trigger;

pub use biquad::{BiquadCoefficients, CascadedBiquadFilter};
pub use chebyshev::design_bandpass;

/// Band-pass filter a signal in place using a freshly designed order-4
/// Chebyshev Type I filter with 0.5 dB passband ripple.
///
/// `f_lo`/`f_hi` are given in Hz; a `f_hi <= f_lo` or `f_lo <= 0.0` band is
/// rejected by [`design_bandpass`] rather than silently passed through.
pub fn bandpass_filter(signal: &mut [f32], sample_rate_hz: f64, f_lo: f64, f_hi: f64) {
    let mut filter = design_bandpass(sample_rate_hz, f_lo, f_hi);
    filter.process_in_place(signal);
}
