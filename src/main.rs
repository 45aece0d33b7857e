use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jukebox_labels::{DEFAULT_OUTPUT, RunConfig, generate_labels, load_releases};

#[derive(Parser, Debug)]
#[command(name = "jukebox-labels", version, about = "Print jukebox labels for vinyl singles as PDF sheets")]
struct Cli {
    /// YAML configuration (label geometry, template, colours, fonts).
    #[arg(long)]
    config: PathBuf,

    /// JSON array of release records.
    #[arg(long)]
    releases: PathBuf,

    /// Output PDF path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Render at most this many releases (overrides `test_count`).
    #[arg(long)]
    limit: Option<usize>,
}

fn run(cli: Cli) -> Result<(), jukebox_labels::Error> {
    let mut config = RunConfig::load(&cli.config)?;
    if cli.limit.is_some() {
        config.limit = cli.limit;
    }

    let releases = load_releases(&cli.releases)?;
    if releases.is_empty() {
        log::warn!("No releases found in {}", cli.releases.display());
        return Ok(());
    }
    log::info!("Found {} releases", releases.len());

    generate_labels(&config, &releases, &cli.output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
