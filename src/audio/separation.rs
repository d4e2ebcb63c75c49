use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use console::style;

/// The demucs model name; determines the output directory layout.
const DEMUCS_MODEL: &str = "htdemucs";

/// Isolate the vocal stem of a recording by shelling out to demucs.
///
/// Runs `demucs --two-stems vocals -o <work_dir> <input>` and returns the
/// path of the separated vocals WAV inside `work_dir`. The caller owns
/// `work_dir` (typically a tempfile::TempDir) and its cleanup.
pub fn separate_vocals(input: &Path, work_dir: &Path) -> Result<PathBuf> {
    println!(
        "  {} separating vocals: {}",
        style(">>").cyan(),
        input.display()
    );

    let output = Command::new("demucs")
        .arg("--two-stems")
        .arg("vocals")
        .arg("-o")
        .arg(work_dir)
        .arg(input)
        .output()
        .context("Failed to run demucs; is it installed and on PATH?")?;

    if !output.status.success() {
        anyhow::bail!(
            "demucs failed with {}:\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let vocals = vocals_output_path(work_dir, input)?;
    if !vocals.exists() {
        anyhow::bail!(
            "demucs reported success but produced no vocals file at {}",
            vocals.display()
        );
    }

    Ok(vocals)
}

/// Where demucs puts the vocal stem: <work_dir>/<model>/<input stem>/vocals.wav
fn vocals_output_path(work_dir: &Path, input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("Input path has no file name: {}", input.display()))?;
    Ok(work_dir.join(DEMUCS_MODEL).join(stem).join("vocals.wav"))
}
