mod analyzer;
mod audio;
mod cli;
mod compare;
mod config;
mod dsp;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    analyzer::run(&cli)
}
