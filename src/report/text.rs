use crate::compare::stats::Bias;
use crate::compare::Comparison;

/// Render the textual accuracy report.
///
/// Returns the report as a String; the caller decides where to save it.
/// Numbers come straight off the summary record; nothing is recomputed here.
pub fn generate_report(comparison: &Comparison) -> String {
    let stats = &comparison.statistics;
    let verdict = &comparison.verdict;
    let mut out = String::new();

    out.push_str("Pitch Accuracy Report\n");
    out.push_str("=====================\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    ));

    let lean = match stats.bias {
        Bias::Sharp => "leaning sharp",
        Bias::Flat => "leaning flat",
        Bias::Balanced => "balanced",
    };

    out.push_str("Overall statistics:\n");
    out.push_str(&format!(
        "- Mean deviation:   {:+.1} cents ({lean})\n",
        stats.mean_cents
    ));
    out.push_str(&format!(
        "- Std deviation:    {:.1} cents\n",
        stats.std_dev_cents
    ));
    out.push_str(&format!(
        "- Median deviation: {:+.1} cents\n",
        stats.median_cents
    ));
    out.push_str(&format!(
        "- Scored frames:    {} ({} excluded as unvoiced)\n\n",
        stats.scored_count, stats.excluded_count
    ));

    out.push_str("Accuracy distribution:\n");
    out.push_str(&format!(
        "- Accurate     (< 25 cents):  {} frames ({:.1}%)\n",
        stats.accurate_count, stats.accurate_percent
    ));
    out.push_str(&format!(
        "- Slightly off (25-50 cents): {} frames ({:.1}%)\n",
        stats.slight_count, stats.slight_percent
    ));
    out.push_str(&format!(
        "- Severely off (>= 50 cents): {} frames ({:.1}%)\n\n",
        stats.severe_count, stats.severe_percent
    ));

    out.push_str("Reference points:\n");
    out.push_str("- 25 cents ≈ a quarter semitone, hard for most listeners to notice\n");
    out.push_str("- 50 cents = half a semitone, clearly audible\n");
    out.push_str("- 100 cents = a full semitone off\n\n");

    out.push_str("Verdict:\n");
    out.push_str(&verdict.summary);
    out.push('\n');
    if let Some(advice) = &verdict.advice {
        out.push_str(advice);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{run, CompareConfig, PitchFrame, PitchSeries};

    fn series(freqs: &[f32]) -> PitchSeries {
        let frames = freqs
            .iter()
            .enumerate()
            .map(|(i, &f)| PitchFrame {
                time: i as f32 * 0.025,
                frequency: Some(f),
            })
            .collect();
        PitchSeries::new(frames).unwrap()
    }

    #[test]
    fn report_contains_the_key_numbers() {
        let reference = series(&[220.0, 220.0, 220.0]);
        let student = series(&[220.0, 233.0, 220.0, 220.0]);
        let comparison = run(&reference, &student, &CompareConfig::default()).unwrap();

        let report = generate_report(&comparison);

        assert!(report.contains("Pitch Accuracy Report"));
        assert!(report.contains("Accurate"));
        assert!(report.contains("Severely off"));
        assert!(report.contains("Verdict:"));
        // 3 accurate + 1 severe out of 4 scored
        assert!(report.contains("3 frames (75.0%)"), "report was:\n{report}");
        assert!(report.contains("1 frames (25.0%)"));
    }

    #[test]
    fn advice_appears_when_present() {
        // Student consistently a half semitone flat: mean ≈ -50 cents.
        let reference = series(&[440.0, 440.0, 440.0, 440.0]);
        let flat = 440.0 * 2.0_f32.powf(-50.0 / 1200.0);
        let student = series(&[flat, flat, flat, flat]);
        let comparison = run(&reference, &student, &CompareConfig::default()).unwrap();

        let report = generate_report(&comparison);
        assert!(report.contains("flat"), "report was:\n{report}");
    }
}
