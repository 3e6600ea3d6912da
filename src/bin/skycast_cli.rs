//! Skycast interactive CLI.
//!
//! Wires the console prompt, the Open-Meteo client, and the recommendation
//! catalog into one advisory session.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skycast::advisor::{Advisor, SessionConfig, SessionContext, SessionOutcome};
use skycast::sources::{CatalogKnowledgeBase, ConsolePrompt, OpenMeteoSource};

/// Weather-aware activity advisor.
#[derive(Debug, Parser)]
#[command(name = "skycast-cli", version, about)]
struct Cli {
    /// Recommendation catalog file (defaults to the bundled catalog).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Cold-branch observation dataset for model learning.
    #[arg(long, default_value = "data/dataset_cold.json")]
    cold_dataset: PathBuf,

    /// Hot-branch observation dataset for model learning.
    #[arg(long, default_value = "data/dataset_hot.json")]
    hot_dataset: PathBuf,

    /// Log filter (e.g. "skycast=debug").
    #[arg(long, default_value = "skycast=warn")]
    log: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(SessionOutcome::Completed | SessionOutcome::Aborted) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<SessionOutcome, Box<dyn std::error::Error>> {
    let knowledge = match &cli.catalog {
        Some(path) => CatalogKnowledgeBase::from_path(path)?,
        None => CatalogKnowledgeBase::builtin()?,
    };

    let ctx = SessionContext::new(
        Box::new(ConsolePrompt::new()),
        Box::new(OpenMeteoSource::new()?),
        Box::new(knowledge),
    )
    .with_config(SessionConfig {
        cold_dataset: cli.cold_dataset,
        hot_dataset: cli.hot_dataset,
    });

    Ok(Advisor::new(ctx).run()?)
}
