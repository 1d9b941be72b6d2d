use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ragtour::cli;
use ragtour::config::{self, TourConfig};
use ragtour::steps::{build_walkthrough, Toolbox};
use ragtour::tui;

#[derive(Parser)]
#[command(name = "ragtour")]
#[command(about = "A guided, runnable tour of a retrieval-augmented generation pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the tour's source documents
    #[arg(long, default_value = "data")]
    docs_dir: PathBuf,

    /// Directory the tour persists its index to
    #[arg(long, default_value = "index")]
    index_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive TUI (the default)
    Tui,

    /// Render one pass to stdout with the given steps triggered on
    Run {
        /// Step numbers to run, 1-based
        #[arg(value_name = "STEP")]
        steps: Vec<usize>,
    },

    /// List the steps without running anything
    Steps,
}

fn main() -> anyhow::Result<()> {
    config::load_dotenv();

    // Initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragtour=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = TourConfig {
        docs_dir: cli.docs_dir,
        index_dir: cli.index_dir,
        ..TourConfig::default()
    };

    let toolbox = Arc::new(Toolbox::from_config(&config)?);
    let runner = build_walkthrough(toolbox);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => tui::run_tui(runner),
        Commands::Run { steps } => cli::run_pass(&runner, &steps),
        Commands::Steps => {
            cli::list_steps(&runner);
            Ok(())
        }
    }
}
