//! certbuilder - NG9-1-1 certificate builder
//!
//! Keeps the settings for one certificate between runs and issues it on
//! request.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use certbuilder::cli::args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    certbuilder::cli::run(cli)
}
