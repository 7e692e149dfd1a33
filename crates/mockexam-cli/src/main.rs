//! mockexam CLI: take AI-generated mock exams from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mockexam", version, about = "AI-generated multiple-choice mock exams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exam, answer it from stdin and print the score
    Take {
        /// Curriculum TOML file
        #[arg(long)]
        curriculum: PathBuf,

        /// Grade id or label (e.g. "m1" or "중학교 1학년")
        #[arg(long)]
        grade: String,

        /// Topic id within the grade
        #[arg(long)]
        topic: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the score report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a curriculum file
    Validate {
        /// Curriculum TOML file
        #[arg(long)]
        curriculum: PathBuf,
    },

    /// List the grades, subjects and topics of a curriculum
    Topics {
        /// Curriculum TOML file
        #[arg(long)]
        curriculum: PathBuf,
    },

    /// List models the configured endpoint can generate with
    ListModels {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Find the first candidate model that answers
    Probe {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example curriculum
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mockexam=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            curriculum,
            grade,
            topic,
            config,
            json,
        } => commands::take::execute(curriculum, grade, topic, config, json).await,
        Commands::Validate { curriculum } => commands::validate::execute(curriculum),
        Commands::Topics { curriculum } => commands::topics::execute(curriculum),
        Commands::ListModels { config } => commands::list_models::execute(config).await,
        Commands::Probe { config } => commands::probe::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
