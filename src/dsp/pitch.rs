use anyhow::Result;
use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

use super::windowing;
use crate::compare::{PitchFrame, PitchSeries};

/// Configuration for pitch extraction from a vocal track.
pub struct PitchConfig {
    /// Minimum detectable frequency in Hz. 65 Hz ≈ C2, the bottom of the
    /// sung range we care about.
    pub pitch_floor_hz: f32,

    /// Maximum detectable frequency in Hz. 2100 Hz ≈ C7 covers soprano
    /// territory with headroom.
    pub pitch_ceiling_hz: f32,

    /// Analysis window duration in milliseconds.
    pub frame_size_ms: f32,

    /// How far to advance between frames, in milliseconds. 25 ms keeps a
    /// full song's contour small enough that the O(n·m) alignment downstream
    /// stays within its memory ceiling.
    pub hop_size_ms: f32,

    /// McLeod power threshold; filters out low-energy frames (noise).
    pub power_threshold: f64,

    /// McLeod clarity threshold; how confident the detector must be before
    /// a frame counts as voiced. Range 0.0-1.0.
    pub clarity_threshold: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            pitch_floor_hz: 65.0,
            pitch_ceiling_hz: 2100.0,
            frame_size_ms: 30.0,
            hop_size_ms: 25.0,
            power_threshold: 0.15,
            clarity_threshold: 0.5,
        }
    }
}

/// Extract a pitch contour from a vocal track.
///
/// Slides a window across the audio, runs the McLeod pitch detector on each
/// frame, and collects one voiced-or-unvoiced observation per hop. The
/// McLeod method finds the period of repetition via normalized
/// autocorrelation; it is robust to harmonics, which matters for sung vowels.
///
/// Detections outside [floor, ceiling] are treated as unvoiced; sub-bass
/// rumble and whistle-register artifacts are not pitches we want to grade.
pub fn extract_pitch_series(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchConfig,
) -> Result<PitchSeries> {
    let sr = sample_rate as f32;

    let frame_size = (config.frame_size_ms / 1000.0 * sr) as usize;
    let hop_size = ((config.hop_size_ms / 1000.0 * sr) as usize).max(1);

    // The detector buffer must hold at least 2 full cycles of the lowest
    // detectable frequency; round up to a power of two for the FFT inside.
    let min_buffer = (2.0 * sr / config.pitch_floor_hz).ceil() as usize;
    let detector_size = min_buffer.next_power_of_two().max(frame_size);
    let padding = detector_size / 2;

    if samples.len() < detector_size {
        anyhow::bail!(
            "track too short for pitch analysis: {} samples, need at least {}",
            samples.len(),
            detector_size
        );
    }

    let mut detector = McLeodDetector::new(detector_size, padding);
    let mut frames = Vec::new();
    let mut pos = 0;

    while pos + detector_size <= samples.len() {
        let time = pos as f32 / sr;

        let windowed = windowing::hanning(&samples[pos..pos + detector_size]);
        let padded: Vec<f64> = windowed.iter().map(|&s| s as f64).collect();

        let pitch = detector.get_pitch(
            &padded,
            sample_rate as usize,
            config.power_threshold,
            config.clarity_threshold,
        );

        let frequency = pitch
            .map(|p| p.frequency as f32)
            .filter(|&f| f >= config.pitch_floor_hz && f <= config.pitch_ceiling_hz);

        frames.push(PitchFrame { time, frequency });
        pos += hop_size;
    }

    // Timestamps are strictly increasing by construction and any detected
    // frequency is positive, so this only fails on an empty contour.
    Ok(PitchSeries::new(frames)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Pure sine wave at a known frequency; ground truth for the detector.
    fn sine_wave(freq_hz: f32, sample_rate: u32, duration_secs: f32) -> Vec<f32> {
        let num_samples = (sample_rate as f32 * duration_secs) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * PI * freq_hz * t).sin()
            })
            .collect()
    }

    #[test]
    fn detects_220hz_sine() {
        let samples = sine_wave(220.0, 44100, 1.0);
        let series = extract_pitch_series(&samples, 44100, &PitchConfig::default()).unwrap();

        let voiced: Vec<f32> = series
            .frames()
            .iter()
            .filter_map(|f| f.frequency)
            .collect();
        assert!(!voiced.is_empty(), "should detect pitch in a pure sine");

        let mean: f32 = voiced.iter().sum::<f32>() / voiced.len() as f32;
        assert!(
            (mean - 220.0).abs() < 5.0,
            "mean pitch should be ~220 Hz, got {mean:.1}"
        );
    }

    #[test]
    fn silence_is_unvoiced() {
        let samples = vec![0.0; 44100];
        let series = extract_pitch_series(&samples, 44100, &PitchConfig::default()).unwrap();
        assert!(
            series.voiced_fraction() < 0.1,
            "silence should be mostly unvoiced"
        );
    }

    #[test]
    fn too_short_track_is_rejected() {
        let samples = sine_wave(220.0, 44100, 0.01);
        let result = extract_pitch_series(&samples, 44100, &PitchConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn timestamps_strictly_increase() {
        let samples = sine_wave(220.0, 44100, 0.5);
        let series = extract_pitch_series(&samples, 44100, &PitchConfig::default()).unwrap();

        for pair in series.frames().windows(2) {
            assert!(pair[1].time > pair[0].time);
        }
    }

    #[test]
    fn out_of_range_detections_become_unvoiced() {
        // 30 Hz is below the 65 Hz floor; whatever the detector reports
        // must not surface as a voiced frame.
        let samples = sine_wave(30.0, 44100, 1.0);
        let series = extract_pitch_series(&samples, 44100, &PitchConfig::default()).unwrap();

        for frame in series.frames() {
            if let Some(f) = frame.frequency {
                assert!((65.0..=2100.0).contains(&f), "got out-of-range {f} Hz");
            }
        }
    }
}
