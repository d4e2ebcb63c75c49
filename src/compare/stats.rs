use serde::{Deserialize, Serialize};

use super::classify::{Bucket, DeviationRecord};
use super::error::{CompareError, Result};
use super::CompareConfig;

/// Which way the student's pitch leans overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    /// Mean deviation below -epsilon: singing under the reference.
    Flat,
    /// Mean deviation above +epsilon: singing over the reference.
    Sharp,
    /// Mean within the epsilon band around zero.
    Balanced,
}

/// Aggregate pitch-accuracy statistics over all scored frame pairs.
/// Computed once per comparison; excluded records never contribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean of signed deviations, in cents.
    pub mean_cents: f32,
    /// Population standard deviation (denominator = count, not count - 1).
    pub std_dev_cents: f32,
    /// Median signed deviation; average of the two middle values when the
    /// count is even.
    pub median_cents: f32,

    pub accurate_count: usize,
    pub slight_count: usize,
    pub severe_count: usize,
    /// Bucket shares of the scored total, in percent.
    pub accurate_percent: f32,
    pub slight_percent: f32,
    pub severe_percent: f32,

    /// Number of scored (mutually voiced) pairs.
    pub scored_count: usize,
    /// Number of pairs excluded because one side was unvoiced.
    pub excluded_count: usize,

    pub bias: Bias,
}

/// Reduce a deviation sequence to its summary statistics.
///
/// Fails with NoVoicedOverlap when nothing was scored; an all-unvoiced
/// comparison has no meaningful statistics, and pretending the student was
/// 0 cents off would be worse than failing.
pub fn aggregate(records: &[DeviationRecord], config: &CompareConfig) -> Result<SummaryStatistics> {
    let deviations: Vec<f32> = records.iter().filter_map(|r| r.cents).collect();
    let excluded_count = records.len() - deviations.len();

    if deviations.is_empty() {
        return Err(CompareError::NoVoicedOverlap);
    }

    let count = deviations.len();
    let mean = deviations.iter().sum::<f32>() / count as f32;

    let variance = deviations
        .iter()
        .map(|d| {
            let diff = d - mean;
            diff * diff
        })
        .sum::<f32>()
        / count as f32;
    let std_dev = variance.sqrt();

    let median = {
        let mut sorted = deviations.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mid = count / 2;
        if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    };

    let mut accurate_count = 0;
    let mut slight_count = 0;
    let mut severe_count = 0;
    for record in records {
        match record.bucket {
            Some(Bucket::Accurate) => accurate_count += 1,
            Some(Bucket::Slight) => slight_count += 1,
            Some(Bucket::Severe) => severe_count += 1,
            None => {}
        }
    }

    let percent = |n: usize| 100.0 * n as f32 / count as f32;

    // The epsilon band keeps a near-zero mean from flipping between sharp
    // and flat on measurement noise.
    let bias = if mean > config.bias_epsilon_cents {
        Bias::Sharp
    } else if mean < -config.bias_epsilon_cents {
        Bias::Flat
    } else {
        Bias::Balanced
    };

    Ok(SummaryStatistics {
        mean_cents: mean,
        std_dev_cents: std_dev,
        median_cents: median,
        accurate_count,
        slight_count,
        severe_count,
        accurate_percent: percent(accurate_count),
        slight_percent: percent(slight_count),
        severe_percent: percent(severe_count),
        scored_count: count,
        excluded_count,
        bias,
    })
}
