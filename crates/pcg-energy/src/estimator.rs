/// Two-pass energy estimator: convolve the filtered signal `a` with kernel
/// `k`, then smooth the squared convolution through the Blackman window
/// `w`, producing an envelope of the same length as `a`.
///
/// Indices for which a pass's centered window would run outside the valid
/// region are left as negative zero (`-0.0`), the sentinel for "unset but
/// in range" used throughout this crate; everywhere else behaves as an
/// ordinary `0.0`.
pub fn estimate_energy(a: &[f32], k: &[f64], w: &[f64]) -> Vec<f32> {
    let n = a.len();
    let m = k.len();
    let q = w.len();

    let mut c = vec![-0.0f32; n];
    let lo = half(m);
    if let Some(hi) = n.checked_sub(half(m)) {
        for i in lo..hi.max(lo) {
            let base = i - half(m);
            let mut acc = 0.0f64;
            for (j, &kj) in k.iter().enumerate() {
                acc += a[base + j] as f64 * kj;
            }
            c[i] = (acc / m as f64) as f32;
        }
    }

    let mut e = vec![-0.0f32; n];
    let lo = half(q);
    if let Some(hi) = n.checked_sub(half(q)) {
        for i in lo..hi.max(lo) {
            let base = i - half(q);
            let mut acc = 0.0f64;
            for (j, &wj) in w.iter().enumerate() {
                let sample = c[base + j] as f64 * wj;
                acc += sample * sample;
            }
            e[i] = acc as f32;
        }
    }

    e
}

fn half(len: usize) -> usize {
    len / 2
}
