//! chromaquiz CLI — the terminal front end.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use chromaquiz_core::model::{Difficulty, Mode};

mod commands;

#[derive(Parser)]
#[command(name = "chromaquiz", version, about = "Timed color-memory quiz")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play in the terminal
    Play {
        /// easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// normal or trick
        #[arg(long)]
        mode: Option<Mode>,

        /// Disable the terminal bell on feedback
        #[arg(long)]
        no_sound: bool,

        /// Stats file (default: ~/.config/chromaquiz/stats.json)
        #[arg(long)]
        stats_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show lifetime stats
    Stats {
        /// Stats file (default: ~/.config/chromaquiz/stats.json)
        #[arg(long)]
        stats_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the colors of a difficulty tier
    Palette {
        /// Only this tier
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },

    /// Create a starter chromaquiz.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chromaquiz=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            difficulty,
            mode,
            no_sound,
            stats_file,
            config,
        } => {
            let overrides = commands::Overrides {
                difficulty,
                mode,
                no_sound,
                stats_file,
            };
            commands::play::execute(overrides, config).await
        }
        Commands::Stats { stats_file, config } => {
            let overrides = commands::Overrides {
                stats_file,
                ..Default::default()
            };
            commands::stats::execute(overrides, config).await
        }
        Commands::Palette { difficulty } => commands::palette::execute(difficulty),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
