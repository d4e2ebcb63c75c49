use serde::{Deserialize, Serialize};

use super::error::{CompareError, Result};

/// A single point in a pitch contour: a timestamp and an optional frequency.
/// `None` means the frame was unvoiced (silence, noise, consonants).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PitchFrame {
    /// Time in seconds from the start of the audio.
    pub time: f32,

    /// Detected fundamental frequency in Hz, or None if unvoiced.
    pub frequency: Option<f32>,
}

/// A validated, immutable pitch contour for one track.
///
/// Construction is the only place invariants are checked; after that the
/// frames are read-only, so the aligner and classifier can index freely
/// without re-validating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchSeries {
    frames: Vec<PitchFrame>,
}

impl PitchSeries {
    /// Build a series from raw frames, enforcing the contour invariants:
    /// at least one frame, strictly increasing timestamps, and strictly
    /// positive frequencies wherever a frame is voiced.
    pub fn new(frames: Vec<PitchFrame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(CompareError::InvalidInput(
                "pitch series has no frames".into(),
            ));
        }

        for (i, frame) in frames.iter().enumerate() {
            if let Some(hz) = frame.frequency {
                if !(hz > 0.0) {
                    return Err(CompareError::InvalidInput(format!(
                        "frame {i} is voiced with non-positive frequency {hz} Hz"
                    )));
                }
            }
        }

        for pair in frames.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(CompareError::InvalidInput(format!(
                    "timestamps not strictly increasing: {:.4}s then {:.4}s",
                    pair[0].time, pair[1].time
                )));
            }
        }

        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[PitchFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Frequency at a frame index, None when unvoiced.
    pub fn frequency(&self, index: usize) -> Option<f32> {
        self.frames[index].frequency
    }

    pub fn time(&self, index: usize) -> f32 {
        self.frames[index].time
    }

    /// Fraction of frames with a detected pitch. 0.0 is possible; a series
    /// may validate fine and still be entirely unvoiced.
    pub fn voiced_fraction(&self) -> f32 {
        let voiced = self.frames.iter().filter(|f| f.frequency.is_some()).count();
        voiced as f32 / self.frames.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: f32, freq: Option<f32>) -> PitchFrame {
        PitchFrame {
            time,
            frequency: freq,
        }
    }

    #[test]
    fn valid_series() {
        let series = PitchSeries::new(vec![
            frame(0.0, Some(220.0)),
            frame(0.025, None),
            frame(0.05, Some(221.5)),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.frequency(1), None);
        assert!((series.voiced_fraction() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_series_rejected() {
        let err = PitchSeries::new(vec![]).unwrap_err();
        assert!(matches!(err, CompareError::InvalidInput(_)));
    }

    #[test]
    fn non_positive_frequency_rejected() {
        let err = PitchSeries::new(vec![frame(0.0, Some(0.0))]).unwrap_err();
        assert!(matches!(err, CompareError::InvalidInput(_)));

        let err = PitchSeries::new(vec![frame(0.0, Some(-440.0))]).unwrap_err();
        assert!(matches!(err, CompareError::InvalidInput(_)));
    }

    #[test]
    fn non_increasing_timestamps_rejected() {
        let err = PitchSeries::new(vec![
            frame(0.0, Some(220.0)),
            frame(0.0, Some(220.0)),
        ])
        .unwrap_err();
        assert!(matches!(err, CompareError::InvalidInput(_)));
    }

    #[test]
    fn single_frame_is_valid() {
        let series = PitchSeries::new(vec![frame(0.0, Some(440.0))]).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn all_unvoiced_is_valid() {
        // Unvoiced-only input is structurally fine; scoring it fails later
        // with NoVoicedOverlap, not here.
        let series = PitchSeries::new(vec![frame(0.0, None), frame(0.025, None)]).unwrap();
        assert_eq!(series.voiced_fraction(), 0.0);
    }
}
