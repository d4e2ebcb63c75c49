use serde::{Deserialize, Serialize};

use super::cents::cents_deviation;
use super::dtw::AlignedPair;
use super::series::PitchSeries;
use super::CompareConfig;

/// Accuracy tier for one scored frame pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// |deviation| < 25 cents; inaudible to most listeners.
    Accurate,
    /// 25 <= |deviation| < 50 cents; audibly off.
    Slight,
    /// |deviation| >= 50 cents; half a semitone or worse.
    Severe,
}

/// The scored (or excluded) outcome for one aligned frame pair.
///
/// `cents` and `bucket` are either both present or both absent: absent means
/// the pair had an unvoiced side and is excluded from every statistic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviationRecord {
    pub reference_index: usize,
    pub student_index: usize,
    /// Signed deviation: positive = student sharp, negative = flat.
    pub cents: Option<f32>,
    pub bucket: Option<Bucket>,
}

impl DeviationRecord {
    pub fn is_excluded(&self) -> bool {
        self.cents.is_none()
    }
}

/// Place an absolute deviation into its accuracy tier.
///
/// Boundaries are inclusive at the low end of each tier: exactly 25 cents is
/// slight, exactly 50 is severe. These cut points are fixed output-format
/// constants; reports from different runs stay comparable.
fn bucket_for(abs_cents: f32, config: &CompareConfig) -> Bucket {
    if abs_cents < config.accurate_below_cents {
        Bucket::Accurate
    } else if abs_cents < config.severe_from_cents {
        Bucket::Slight
    } else {
        Bucket::Severe
    }
}

/// Walk the warp path and score each aligned pair.
///
/// Pairs where either frame is unvoiced become excluded records; they keep
/// their place in the sequence (the charts still want to show the gap) but
/// carry no deviation.
pub fn classify(
    pairs: &[AlignedPair],
    reference: &PitchSeries,
    student: &PitchSeries,
    config: &CompareConfig,
) -> Vec<DeviationRecord> {
    pairs
        .iter()
        .map(|pair| {
            let scored = match (
                reference.frequency(pair.reference),
                student.frequency(pair.student),
            ) {
                (Some(ref_hz), Some(student_hz)) => {
                    let d = cents_deviation(ref_hz, student_hz);
                    Some((d, bucket_for(d.abs(), config)))
                }
                _ => None,
            };

            DeviationRecord {
                reference_index: pair.reference,
                student_index: pair.student,
                cents: scored.map(|(d, _)| d),
                bucket: scored.map(|(_, b)| b),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::series::PitchFrame;

    fn series(freqs: &[Option<f32>]) -> PitchSeries {
        let frames = freqs
            .iter()
            .enumerate()
            .map(|(i, &frequency)| PitchFrame {
                time: i as f32 * 0.025,
                frequency,
            })
            .collect();
        PitchSeries::new(frames).unwrap()
    }

    fn pair(reference: usize, student: usize) -> AlignedPair {
        AlignedPair { reference, student }
    }

    #[test]
    fn buckets_at_the_documented_boundaries() {
        let config = CompareConfig::default();
        assert_eq!(bucket_for(0.0, &config), Bucket::Accurate);
        assert_eq!(bucket_for(24.99, &config), Bucket::Accurate);
        assert_eq!(bucket_for(25.0, &config), Bucket::Slight, "25 itself is slight");
        assert_eq!(bucket_for(49.99, &config), Bucket::Slight);
        assert_eq!(bucket_for(50.0, &config), Bucket::Severe, "50 itself is severe");
        assert_eq!(bucket_for(99.4, &config), Bucket::Severe);
    }

    #[test]
    fn voiced_pairs_are_scored_signed() {
        let reference = series(&[Some(220.0)]);
        let student = series(&[Some(233.0)]);

        let records = classify(
            &[pair(0, 0)],
            &reference,
            &student,
            &CompareConfig::default(),
        );

        assert_eq!(records.len(), 1);
        let d = records[0].cents.unwrap();
        // 1200 * log2(233/220) ≈ 99.4 cents sharp
        assert!((d - 99.4).abs() < 0.1, "expected ≈99.4 cents, got {d}");
        assert_eq!(records[0].bucket, Some(Bucket::Severe));
    }

    #[test]
    fn unvoiced_side_is_excluded() {
        let reference = series(&[Some(220.0), None]);
        let student = series(&[None, Some(220.0)]);

        let records = classify(
            &[pair(0, 0), pair(1, 1)],
            &reference,
            &student,
            &CompareConfig::default(),
        );

        assert!(records.iter().all(|r| r.is_excluded()));
        assert!(records.iter().all(|r| r.bucket.is_none()));
    }

    #[test]
    fn every_scored_record_has_exactly_one_bucket() {
        let reference = series(&[Some(220.0), Some(220.0), Some(220.0), None]);
        let student = series(&[Some(221.0), Some(224.0), Some(300.0), Some(220.0)]);

        let pairs: Vec<AlignedPair> = (0..4).map(|i| pair(i, i)).collect();
        let records = classify(&pairs, &reference, &student, &CompareConfig::default());

        let scored = records.iter().filter(|r| !r.is_excluded()).count();
        let bucketed = records.iter().filter(|r| r.bucket.is_some()).count();
        assert_eq!(scored, 3);
        assert_eq!(scored, bucketed, "every scored record gets a bucket");
    }
}
