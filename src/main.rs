use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pomcov::cli::Args;
use pomcov::workflow;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    workflow::run(&args.into_run_options())
}
