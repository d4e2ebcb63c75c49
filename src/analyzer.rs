use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::audio::{separation, wav};
use crate::cli::Cli;
use crate::compare::{self, stats::Bias, CompareConfig, PitchSeries};
use crate::config;
use crate::dsp::pitch::{self, PitchConfig};
use crate::dsp::spectrogram::{self, SpectrogramConfig};
use crate::report::{self, ReportInputs};

/// Run one full comparison: load, (optionally) separate, extract, align,
/// score, and write the report artifacts.
pub fn run(cli: &Cli) -> Result<()> {
    let app_config = config::load_config(cli.config.as_deref())?;

    println!(
        "Comparing {} against {}",
        style(cli.student.display()).cyan(),
        style(cli.reference.display()).cyan()
    );
    println!();

    // demucs writes into a temp dir that lives until the pitch contours
    // have been extracted from its output files.
    let work_dir = tempfile::tempdir().context("Failed to create temp dir")?;

    let (reference_vocals, student_vocals) = if cli.no_separation {
        (cli.reference.clone(), cli.student.clone())
    } else {
        (
            separation::separate_vocals(&cli.reference, work_dir.path())?,
            separation::separate_vocals(&cli.student, work_dir.path())?,
        )
    };

    let pitch_config: PitchConfig = (&app_config.analysis).into();
    let (reference, ref_samples, ref_sr) =
        load_track("reference", &reference_vocals, &pitch_config)?;
    let (student, student_samples, student_sr) =
        load_track("student", &student_vocals, &pitch_config)?;

    warn_if_barely_voiced("reference", &reference);
    warn_if_barely_voiced("student", &student);

    println!("  {} aligning and scoring", style(">>").cyan());
    let compare_config: CompareConfig = (&app_config.comparison).into();
    let comparison = compare::run(&reference, &student, &compare_config)?;

    let spec_config = SpectrogramConfig::default();
    let ref_spectrogram = spectrogram::compute(&ref_samples, ref_sr, &spec_config);
    let student_spectrogram = spectrogram::compute(&student_samples, student_sr, &spec_config);

    println!();
    report::write_all(
        &cli.output,
        &ReportInputs {
            reference_file: &cli.reference,
            student_file: &cli.student,
            reference: &reference,
            student: &student,
            comparison: &comparison,
            reference_spectrogram: ref_spectrogram.as_ref(),
            student_spectrogram: student_spectrogram.as_ref(),
        },
    )?;

    println!();
    print_summary(&comparison);

    Ok(())
}

/// Load a WAV file and extract its pitch contour, with progress output.
fn load_track(
    name: &str,
    path: &Path,
    pitch_config: &PitchConfig,
) -> Result<(PitchSeries, Vec<f32>, u32)> {
    println!("  {} {name}: {}", style(">>").cyan(), path.display());

    let (samples, sample_rate) = wav::load_mono(path)
        .with_context(|| format!("Failed to load {name} track"))?;

    let duration = samples.len() as f32 / sample_rate as f32;
    println!("     loaded: {duration:.1}s, {sample_rate} Hz");

    let series = pitch::extract_pitch_series(&samples, sample_rate, pitch_config)
        .with_context(|| format!("Failed to extract pitch from {name} track"))?;

    println!(
        "     pitch frames: {} ({:.0}% voiced)",
        series.len(),
        series.voiced_fraction() * 100.0
    );

    Ok((series, samples, sample_rate))
}

fn warn_if_barely_voiced(name: &str, series: &PitchSeries) {
    if series.voiced_fraction() < 0.05 {
        println!(
            "  {} {name} track is almost entirely unvoiced; check the recording",
            style("WARN").yellow()
        );
    }
}

/// Print the styled console summary of one finished comparison.
fn print_summary(comparison: &compare::Comparison) {
    let stats = &comparison.statistics;

    println!("{}", style("=== Pitch Accuracy ===").bold());
    println!();
    println!(
        "  Mean deviation:   {:+.1} cents {}",
        stats.mean_cents,
        bias_label(stats.bias)
    );
    println!("  Std deviation:    {:.1} cents", stats.std_dev_cents);
    println!("  Median deviation: {:+.1} cents", stats.median_cents);
    println!();
    println!(
        "  Accurate:     {:>5} frames ({})",
        stats.accurate_count,
        style(format!("{:.1}%", stats.accurate_percent)).green()
    );
    println!(
        "  Slightly off: {:>5} frames ({})",
        stats.slight_count,
        style(format!("{:.1}%", stats.slight_percent)).yellow()
    );
    println!(
        "  Severely off: {:>5} frames ({})",
        stats.severe_count,
        style(format!("{:.1}%", stats.severe_percent)).red()
    );
    println!();
    println!("  {}", style(&comparison.verdict.summary).bold());
    if let Some(advice) = &comparison.verdict.advice {
        println!("  {advice}");
    }
}

fn bias_label(bias: Bias) -> String {
    match bias {
        Bias::Sharp => style("(sharp)").yellow().to_string(),
        Bias::Flat => style("(flat)").yellow().to_string(),
        Bias::Balanced => style("(balanced)").green().to_string(),
    }
}
