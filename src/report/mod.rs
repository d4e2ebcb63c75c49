pub mod charts;
pub mod text;

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use crate::compare::{Comparison, PitchSeries};
use crate::dsp::spectrogram::Spectrogram;

/// Everything the report layer needs from one finished comparison run.
pub struct ReportInputs<'a> {
    pub reference_file: &'a Path,
    pub student_file: &'a Path,
    pub reference: &'a PitchSeries,
    pub student: &'a PitchSeries,
    pub comparison: &'a Comparison,
    /// Spectrograms are best-effort: a track too short for one FFT frame
    /// still gets the rest of the report.
    pub reference_spectrogram: Option<&'a Spectrogram>,
    pub student_spectrogram: Option<&'a Spectrogram>,
}

/// JSON envelope around the core's serializable records, for downstream
/// tooling (or an LLM) to consume without parsing the text report.
#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    reference_file: String,
    student_file: String,
    #[serde(flatten)]
    comparison: &'a Comparison,
}

/// Write all report artifacts into `output_dir` and print where they went.
pub fn write_all(output_dir: &Path, inputs: &ReportInputs) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

    let text_path = output_dir.join("analysis.txt");
    let report = text::generate_report(inputs.comparison);
    std::fs::write(&text_path, &report)
        .with_context(|| format!("Failed to write {}", text_path.display()))?;
    print_saved(&text_path);

    let json_path = output_dir.join("analysis.json");
    let envelope = JsonReport {
        generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        reference_file: inputs.reference_file.display().to_string(),
        student_file: inputs.student_file.display().to_string(),
        comparison: inputs.comparison,
    };
    let json = serde_json::to_string_pretty(&envelope)?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;
    print_saved(&json_path);

    let pitch_path = output_dir.join("pitch_comparison.png");
    charts::pitch_comparison(inputs.reference, inputs.student, inputs.comparison, &pitch_path)?;
    print_saved(&pitch_path);

    if let (Some(ref_spec), Some(student_spec)) =
        (inputs.reference_spectrogram, inputs.student_spectrogram)
    {
        let spec_path = output_dir.join("spectrogram_comparison.png");
        charts::spectrogram_comparison(ref_spec, student_spec, &spec_path)?;
        print_saved(&spec_path);
    } else {
        println!(
            "  {} spectrograms skipped (track too short)",
            style("SKIP").yellow()
        );
    }

    let rhythm_path = output_dir.join("rhythm_alignment.png");
    charts::rhythm_alignment(
        inputs.reference,
        inputs.student,
        &inputs.comparison.pairs,
        &rhythm_path,
    )?;
    print_saved(&rhythm_path);

    Ok(())
}

fn print_saved(path: &Path) {
    println!("  {} {}", style("saved").green(), path.display());
}
