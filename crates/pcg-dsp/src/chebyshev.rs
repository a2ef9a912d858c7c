//! Order-4 Chebyshev Type I bandpass design, 0.5 dB passband ripple,
//! realized as a cascade of four digital biquad sections.
//!
//! All-pole analog prototype poles are computed, transformed to an analog
//! bandpass pair per prototype pole, then mapped to the digital domain with
//! the bilinear transform. Zeros sit at `z = 1` and `z = -1` in every
//! section, the standard placement for a bandpass filter derived from an
//! all-pole lowpass prototype (the prototype's zero at the origin and at
//! infinity map there under the bilinear transform).

use std::f64::consts::PI;

use crate::biquad::{BiquadCoefficients, CascadedBiquadFilter};

const ORDER: usize = 4;
const RIPPLE_DB: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }

    fn sub(self, other: Self) -> Self {
        Self::new(self.re - other.re, self.im - other.im)
    }

    fn scale(self, k: f64) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }

    fn div(self, other: Self) -> Self {
        let denom = other.re * other.re + other.im * other.im;
        Self::new(
            (self.re * other.re + self.im * other.im) / denom,
            (self.im * other.re - self.re * other.im) / denom,
        )
    }

    fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Principal square root of a complex number.
    fn sqrt(self) -> Self {
        let r = self.abs();
        let re = ((r + self.re) / 2.0).max(0.0).sqrt();
        let mut im = ((r - self.re) / 2.0).max(0.0).sqrt();
        if self.im < 0.0 {
            im = -im;
        }
        Self::new(re, im)
    }
}

/// The `ORDER` lowpass prototype poles with positive imaginary part, one per
/// conjugate pair (`ORDER` is even, so exactly `ORDER / 2` of them exist).
fn lowpass_prototype_half_poles() -> Vec<Complex> {
    let epsilon = (10f64.powf(RIPPLE_DB / 10.0) - 1.0).sqrt();
    let v0 = (1.0 / epsilon).asinh() / ORDER as f64;
    let (sinh_v0, cosh_v0) = (v0.sinh(), v0.cosh());

    (0..ORDER / 2)
        .map(|k| {
            let theta = (2 * k + 1) as f64 * PI / (2.0 * ORDER as f64);
            Complex::new(-sinh_v0 * theta.sin(), cosh_v0 * theta.cos())
        })
        .collect()
}

/// Transform one lowpass prototype pole (cutoff `1 rad/s`) into the two
/// analog bandpass poles it maps to, given angular center `w0` and
/// bandwidth `bw` (both in rad/s): roots of `s^2 - bw*p*s + w0^2 = 0`.
fn lowpass_pole_to_bandpass_pair(p: Complex, w0: f64, bw: f64) -> (Complex, Complex) {
    let bp = p.scale(bw);
    let discriminant = bp.mul(bp).sub(Complex::new(4.0 * w0 * w0, 0.0));
    let root = discriminant.sqrt();
    (bp.add(root).scale(0.5), bp.sub(root).scale(0.5))
}

/// Bilinear-transform one analog pole to the digital domain, given the
/// `2 * sample_rate_hz` prewarping constant `c`.
fn bilinear(s: Complex, c: f64) -> Complex {
    Complex::new(c, 0.0).add(s).div(Complex::new(c, 0.0).sub(s))
}

/// Build the real biquad section whose poles are `z` and `conj(z)`, with
/// zeros at `+1`/`-1`, normalized to unity gain at `z0` (the digital point
/// evaluated at the passband center frequency).
fn section_from_conjugate_pole(z: Complex, z0: Complex) -> BiquadCoefficients {
    let a1 = -2.0 * z.re;
    let a2 = z.re * z.re + z.im * z.im;

    let num_at_z0 = z0.mul(z0).sub(Complex::new(1.0, 0.0));
    let den_at_z0 = z0
        .mul(z0)
        .add(Complex::new(a1, 0.0).mul(z0))
        .add(Complex::new(a2, 0.0));
    let unity_gain = den_at_z0.div(num_at_z0).abs();

    BiquadCoefficients {
        b0: unity_gain,
        b1: 0.0,
        b2: -unity_gain,
        a1,
        a2,
    }
}

/// Design an order-4, 0.5 dB-ripple Chebyshev Type I bandpass filter for the
/// given sample rate and passband edges (Hz), realized as 4 cascaded
/// biquad sections.
///
/// Panics if `f_lo <= 0.0`, `f_hi <= f_lo`, or `f_hi >= sample_rate_hz / 2.0`
/// (a malformed passband is a caller bug, not a runtime condition).
pub fn design_bandpass(sample_rate_hz: f64, f_lo: f64, f_hi: f64) -> CascadedBiquadFilter {
    assert!(f_lo > 0.0, "bandpass low edge must be positive");
    assert!(f_hi > f_lo, "bandpass high edge must exceed low edge");
    assert!(
        f_hi < sample_rate_hz / 2.0,
        "bandpass high edge must stay under Nyquist"
    );

    let c = 2.0 * sample_rate_hz;
    let prewarp = |f: f64| c * (PI * f / sample_rate_hz).tan();
    let w1 = prewarp(f_lo);
    let w2 = prewarp(f_hi);
    let bw = w2 - w1;
    let w0 = (w1 * w2).sqrt();

    let center_hz = (f_lo * f_hi).sqrt();
    let z0 = Complex::new(0.0, 2.0 * PI * center_hz / sample_rate_hz).exp_unit_circle();

    let mut sections = Vec::with_capacity(ORDER);
    for p in lowpass_prototype_half_poles() {
        let (s1, s2) = lowpass_pole_to_bandpass_pair(p, w0, bw);
        sections.push(section_from_conjugate_pole(bilinear(s1, c), z0));
        sections.push(section_from_conjugate_pole(bilinear(s2, c), z0));
    }

    CascadedBiquadFilter::new(sections)
}

impl Complex {
    /// `e^{j * self.im}`, used only to place `z0` on the unit circle at a
    /// given digital angular frequency.
    fn exp_unit_circle(self) -> Self {
        Self::new(self.im.cos(), self.im.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_lowpass_poles_halve_to_two_conjugate_representatives() {
        assert_eq!(lowpass_prototype_half_poles().len(), ORDER / 2);
        for p in lowpass_prototype_half_poles() {
            assert!(p.re < 0.0, "prototype poles must be stable");
            assert!(p.im > 0.0);
        }
    }

    #[test]
    fn design_bandpass_produces_four_sections() {
        let filter = design_bandpass(2000.0, 45.0, 80.0);
        assert_eq!(filter.len(), ORDER);
    }

    #[test]
    fn passband_center_passes_near_unity_gain() {
        let sample_rate = 2000.0;
        let f_lo: f64 = 45.0;
        let f_hi: f64 = 80.0;
        let center = (f_lo * f_hi).sqrt();
        let n = 4000;
        let mut signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * center * i as f64 / sample_rate).sin() as f32)
            .collect();

        let mut filter = design_bandpass(sample_rate, f_lo, f_hi);
        filter.process_in_place(&mut signal);

        let settled = &signal[n / 2..];
        let peak = settled.iter().cloned().fold(0.0f32, f32::max);
        assert!(
            (0.5..=1.5).contains(&peak),
            "expected near-unity passband gain, got peak {peak}"
        );
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn rejects_non_positive_low_edge() {
        design_bandpass(2000.0, 0.0, 80.0);
    }

    #[test]
    #[should_panic(expected = "exceed")]
    fn rejects_inverted_band() {
        design_bandpass(2000.0, 80.0, 45.0);
    }

    proptest::proptest! {
        /// Any in-range passband must design to finite, stable coefficients
        /// and keep a bounded input signal bounded: a design bug here would
        /// otherwise only show up as `NaN` verdicts several stages later.
        #[test]
        fn any_valid_passband_stays_finite(f_lo in 1.0f64..400.0, gap in 1.0f64..400.0) {
            let f_hi = f_lo + gap;
            proptest::prop_assume!(f_hi < 999.0);
            let mut filter = design_bandpass(2000.0, f_lo, f_hi);
            let mut signal: Vec<f32> = (0..500).map(|i| (i as f32 * 0.01).sin()).collect();
            filter.process_in_place(&mut signal);
            proptest::prop_assert!(signal.iter().all(|x| x.is_finite()));
        }
    }
}
