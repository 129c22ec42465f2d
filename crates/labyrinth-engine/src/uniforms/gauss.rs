/// Number of taps in the blur kernel.
pub const GAUSS_TAPS: usize = 11;

/// Standard deviation of the blur kernel, in texels.
pub const GAUSS_SIGMA: f32 = 4.0;

/// Discrete Gaussian kernel as `(offset, weight)` pairs.
///
/// Offsets run from `-(GAUSS_TAPS / 2)` to `+(GAUSS_TAPS / 2)`. Weights are
/// sampled from the normal density and rescaled so that they sum to one; a
/// window of 11 taps at sigma 4 would otherwise lose about 17% of the mass and
/// darken every blurred pixel.
pub fn gauss_kernel(sigma: f32) -> [[f32; 2]; GAUSS_TAPS] {
    let half = (GAUSS_TAPS / 2) as f32;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut taps = [[0.0f32; 2]; GAUSS_TAPS];
    for (i, tap) in taps.iter_mut().enumerate() {
        let x = i as f32 - half;
        tap[0] = x;
        tap[1] = (-(x * x) / two_sigma_sq).exp();
    }

    let total: f32 = taps.iter().map(|t| t[1]).sum();
    for tap in &mut taps {
        tap[1] /= total;
    }
    taps
}
