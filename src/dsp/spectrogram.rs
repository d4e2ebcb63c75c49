use rustfft::{num_complex::Complex, FftPlanner};

use super::windowing;

/// Floor for dB conversion, matching the usual 80 dB display range.
const DB_FLOOR: f32 = -80.0;

/// Configuration for spectrogram computation.
pub struct SpectrogramConfig {
    /// FFT size in samples. 2048 at 44.1 kHz gives ~21.5 Hz per bin.
    pub fft_size: usize,
    /// Hop between frames in samples.
    pub hop_size: usize,
    /// Bins above this frequency are discarded; the vocal energy that
    /// matters for the comparison figure lives below 2 kHz.
    pub max_frequency_hz: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
            max_frequency_hz: 2000.0,
        }
    }
}

/// STFT magnitude spectrogram in dB relative to its own peak.
pub struct Spectrogram {
    /// frames[t][b] = level in dB, in [DB_FLOOR, 0.0]. All frames have the
    /// same bin count.
    pub frames: Vec<Vec<f32>>,
    /// Frequency width of one bin in Hz.
    pub bin_hz: f32,
    /// Time between adjacent frames in seconds.
    pub hop_secs: f32,
}

/// Compute a magnitude spectrogram: Hanning window, FFT, magnitude, then
/// dB relative to the loudest cell, floored at -80 dB.
///
/// Returns None when the track is shorter than one FFT frame.
pub fn compute(samples: &[f32], sample_rate: u32, config: &SpectrogramConfig) -> Option<Spectrogram> {
    let fft_size = config.fft_size;
    let hop_size = config.hop_size.max(1);

    if fft_size == 0 || samples.len() < fft_size {
        return None;
    }

    let sr = sample_rate as f32;
    let bin_hz = sr / fft_size as f32;
    let keep_bins = ((config.max_frequency_hz / bin_hz).ceil() as usize).min(fft_size / 2);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut magnitudes: Vec<Vec<f32>> = Vec::new();
    let mut peak = 0.0f32;
    let mut pos = 0;

    while pos + fft_size <= samples.len() {
        let windowed = windowing::hanning(&samples[pos..pos + fft_size]);

        let mut buffer: Vec<Complex<f32>> = windowed
            .iter()
            .map(|&s| Complex { re: s, im: 0.0 })
            .collect();
        fft.process(&mut buffer);

        let frame: Vec<f32> = buffer[..keep_bins].iter().map(|c| c.norm()).collect();
        for &m in &frame {
            peak = peak.max(m);
        }
        magnitudes.push(frame);

        pos += hop_size;
    }

    if magnitudes.is_empty() || peak <= 0.0 {
        return None;
    }

    let frames = magnitudes
        .into_iter()
        .map(|frame| {
            frame
                .into_iter()
                .map(|m| {
                    if m > 0.0 {
                        (20.0 * (m / peak).log10()).max(DB_FLOOR)
                    } else {
                        DB_FLOOR
                    }
                })
                .collect()
        })
        .collect();

    Some(Spectrogram {
        frames,
        bin_hz,
        hop_secs: hop_size as f32 / sr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_wave(freq_hz: f32, sample_rate: u32, duration_secs: f32) -> Vec<f32> {
        let num_samples = (sample_rate as f32 * duration_secs) as usize;
        (0..num_samples)
            .map(|i| (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn sine_energy_lands_in_the_right_bin() {
        let samples = sine_wave(440.0, 44100, 0.5);
        let spec = compute(&samples, 44100, &SpectrogramConfig::default()).unwrap();

        // Find the loudest bin of a middle frame.
        let mid = &spec.frames[spec.frames.len() / 2];
        let (loudest_bin, _) = mid
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();

        let bin_freq = loudest_bin as f32 * spec.bin_hz;
        assert!(
            (bin_freq - 440.0).abs() < 2.0 * spec.bin_hz,
            "peak at {bin_freq:.0} Hz, expected ~440 Hz"
        );
    }

    #[test]
    fn peak_level_is_zero_db() {
        let samples = sine_wave(440.0, 44100, 0.5);
        let spec = compute(&samples, 44100, &SpectrogramConfig::default()).unwrap();

        let max = spec
            .frames
            .iter()
            .flatten()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((max - 0.0).abs() < 1e-3, "levels are relative to the peak");
    }

    #[test]
    fn bins_are_capped_at_max_frequency() {
        let samples = sine_wave(440.0, 44100, 0.5);
        let config = SpectrogramConfig::default();
        let spec = compute(&samples, 44100, &config).unwrap();

        let top_hz = spec.frames[0].len() as f32 * spec.bin_hz;
        assert!(top_hz <= config.max_frequency_hz + spec.bin_hz);
    }

    #[test]
    fn short_track_yields_none() {
        let samples = sine_wave(440.0, 44100, 0.01);
        assert!(compute(&samples, 44100, &SpectrogramConfig::default()).is_none());
    }

    #[test]
    fn silence_yields_none() {
        // All-zero input has no peak to normalize against.
        let samples = vec![0.0; 44100];
        assert!(compute(&samples, 44100, &SpectrogramConfig::default()).is_none());
    }
}
