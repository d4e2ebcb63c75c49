use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "pitchgrade")]
#[command(about = "Compare a student's singing against a reference track and grade pitch accuracy")]
pub struct Cli {
    /// Reference performance (WAV)
    pub reference: PathBuf,

    /// Student performance (WAV)
    pub student: PathBuf,

    /// Directory for the report and charts
    #[arg(long, short, default_value = "output")]
    pub output: PathBuf,

    /// Skip vocal separation (inputs are already isolated vocals)
    #[arg(long)]
    pub no_separation: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
