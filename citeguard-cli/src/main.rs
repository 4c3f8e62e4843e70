//! Citeguard CLI — collect a Wikipedia corpus, build the vector index, and
//! ask questions whose answers are verified against the corpus before they
//! are shown.

mod commands;
mod topics;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Citeguard: verified question answering over your own document corpus
#[derive(Parser, Debug)]
#[command(name = "citeguard", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (location of .citeguard/config.toml)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Collect Wikipedia articles for a topic into the data directory
    Collect {
        /// Topic collection: machine_learning, artificial_intelligence, data_science
        #[arg(long)]
        topic: String,

        /// Maximum number of articles to collect
        #[arg(long, default_value_t = 15)]
        max_articles: usize,
    },
    /// Build the vector index from collected articles
    Build,
    /// Ask a single question
    Ask {
        /// The question to answer
        question: String,
    },
    /// Interactive question loop sharing one conversation
    Chat,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a default config file into the workspace
    Init,
    /// Print the resolved configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    match cli.command {
        Commands::Collect {
            topic,
            max_articles,
        } => commands::collect(&workspace, &topic, max_articles).await,
        Commands::Build => commands::build(&workspace).await,
        Commands::Ask { question } => commands::ask(&workspace, &question).await,
        Commands::Chat => commands::chat(&workspace).await,
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config_init(&workspace),
            ConfigAction::Show => commands::config_show(&workspace),
        },
    }
}
