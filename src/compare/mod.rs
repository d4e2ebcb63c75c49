//! The alignment-and-scoring core: two pitch contours in, a warp path,
//! per-frame deviations, summary statistics, and a verdict out.
//!
//! Everything in here is pure and synchronous. Inputs are immutable once
//! constructed, every function is deterministic, and failures surface as
//! `CompareError` rather than panics; a host comparing many recordings can
//! treat each call as an isolated unit of work.

pub mod cents;
pub mod classify;
pub mod dtw;
pub mod error;
pub mod series;
pub mod stats;
pub mod verdict;

use serde::{Deserialize, Serialize};

pub use classify::DeviationRecord;
pub use dtw::AlignedPair;
pub use error::{CompareError, Result};
pub use series::{PitchFrame, PitchSeries};
pub use stats::SummaryStatistics;
pub use verdict::Verdict;

/// Tuning for the comparison core, threaded explicitly into the aligner,
/// classifier, and verdict generator. One immutable value per run with no
/// module-level state, so tests can vary thresholds without interfering.
///
/// The defaults are the documented contract; the bucket boundaries and tier
/// cut points in particular are fixed output-format constants, not knobs to
/// tune per recording.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// DTW local cost for any pair with an unvoiced side, in cents.
    /// One semitone: big enough to steer the path toward voiced↔voiced
    /// matches, finite so the path never becomes infeasible.
    pub unvoiced_penalty_cents: f32,

    /// Ceiling on n×m cells for the DTW matrix. 100M cells ≈ 800 MB of f64,
    /// roughly two four-minute tracks at the default 25 ms hop. Anything
    /// bigger is rejected rather than swapping the machine to death.
    pub max_dtw_cells: usize,

    /// |deviation| below this is "accurate" (about a quarter semitone).
    pub accurate_below_cents: f32,
    /// |deviation| at or above this is "severe"; between the two is "slight".
    pub severe_from_cents: f32,

    /// Half-width of the "balanced" band around a zero mean deviation.
    pub bias_epsilon_cents: f32,

    /// Accurate-percentage cut points for the proficiency tiers (strict >).
    pub tier_excellent_percent: f32,
    pub tier_good_percent: f32,
    pub tier_practice_percent: f32,

    /// |mean deviation| above this triggers a raise/lower suggestion.
    pub advice_threshold_cents: f32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            unvoiced_penalty_cents: 100.0,
            max_dtw_cells: 100_000_000,
            accurate_below_cents: 25.0,
            severe_from_cents: 50.0,
            bias_epsilon_cents: 1.0,
            tier_excellent_percent: 80.0,
            tier_good_percent: 60.0,
            tier_practice_percent: 40.0,
            advice_threshold_cents: 30.0,
        }
    }
}

/// Everything one comparison produces. The fields are plain serializable
/// records; the report layer formats them but never recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub pairs: Vec<AlignedPair>,
    pub records: Vec<DeviationRecord>,
    pub statistics: SummaryStatistics,
    pub verdict: Verdict,
}

/// Run the full core pipeline: align, classify, aggregate, judge.
///
/// Either the whole Comparison comes back or an error does; there is no
/// partial-result mode.
pub fn run(
    reference: &PitchSeries,
    student: &PitchSeries,
    config: &CompareConfig,
) -> Result<Comparison> {
    let pairs = dtw::align(reference, student, config)?;
    let records = classify::classify(&pairs, reference, student, config);
    let statistics = stats::aggregate(&records, config)?;
    let verdict = verdict::verdict(&statistics, config);

    Ok(Comparison {
        pairs,
        records,
        statistics,
        verdict,
    })
}
