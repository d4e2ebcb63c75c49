use std::f32::consts::PI;

/// Apply a Hanning window to a frame, returning a new Vec.
///
/// Tapers the frame to zero at both edges so the FFT (spectrograms) and the
/// autocorrelation (pitch detection) don't see the discontinuity of a hard
/// cut. w(n) = 0.5 * (1 - cos(2π n / (N - 1))).
pub fn hanning(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n <= 1 {
        return samples.to_vec();
    }

    let scale = 2.0 * PI / (n - 1) as f32;
    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| s * 0.5 * (1.0 - (scale * i as f32).cos()))
        .collect()
}
