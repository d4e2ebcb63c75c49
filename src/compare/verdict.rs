use serde::{Deserialize, Serialize};

use super::stats::{Bias, SummaryStatistics};
use super::CompareConfig;

/// Overall proficiency tier, derived from the accurate-bucket percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyTier {
    Excellent,
    Good,
    NeedsPractice,
    NeedsExtensivePractice,
}

/// Qualitative judgment of a performance: a tier plus an optional
/// directional suggestion. Pure label generation over SummaryStatistics -
/// nothing here recomputes a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub tier: ProficiencyTier,
    /// One-sentence overall assessment.
    pub summary: String,
    /// Raise/lower suggestion, present only when the mean deviation is large
    /// enough to act on.
    pub advice: Option<String>,
}

/// Map summary statistics to a verdict.
///
/// Tier cut points (strict, on the accurate percentage): above 80 excellent,
/// above 60 good, above 40 needs practice, otherwise needs extensive
/// practice. A directional suggestion appears when |mean| exceeds
/// `config.advice_threshold_cents`.
pub fn verdict(stats: &SummaryStatistics, config: &CompareConfig) -> Verdict {
    let accurate = stats.accurate_percent;

    let (tier, summary) = if accurate > config.tier_excellent_percent {
        (
            ProficiencyTier::Excellent,
            format!("Excellent! {accurate:.0}% of frames are on pitch."),
        )
    } else if accurate > config.tier_good_percent {
        (
            ProficiencyTier::Good,
            format!("Good. {accurate:.0}% of frames are on pitch, with room to improve."),
        )
    } else if accurate > config.tier_practice_percent {
        (
            ProficiencyTier::NeedsPractice,
            format!("Needs practice. Only {accurate:.0}% of frames are on pitch."),
        )
    } else {
        (
            ProficiencyTier::NeedsExtensivePractice,
            format!("Needs extensive practice. Just {accurate:.0}% of frames are on pitch."),
        )
    };

    let advice = if stats.mean_cents.abs() > config.advice_threshold_cents {
        match stats.bias {
            Bias::Sharp => Some(
                "Overall tendency: sharp. Try relaxing the throat and easing the pitch down."
                    .to_string(),
            ),
            Bias::Flat => Some(
                "Overall tendency: flat. Try adding breath support and lifting the pitch."
                    .to_string(),
            ),
            // A large mean with a balanced bias can't happen with the default
            // epsilon, but a test config could construct it; stay quiet then.
            Bias::Balanced => None,
        }
    } else {
        None
    };

    Verdict {
        tier,
        summary,
        advice,
    }
}
