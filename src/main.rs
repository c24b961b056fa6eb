//! TikZGraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "tikzgraph")]
#[command(about = "Edit and export TikZ diagram graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the diagram as TikZ
    Tikz {
        /// Diagram snapshot (JSON)
        file: PathBuf,
    },
    /// Print the bounds of all nodes
    Bounds { file: PathBuf },
    /// Print a path cover of the edges, one chain per line
    Paths { file: PathBuf },
    /// Flip every node and print the result as TikZ
    Flip {
        file: PathBuf,

        /// Flip top-to-bottom instead of left-to-right
        #[arg(long)]
        vertical: bool,
    },
    /// Shift every node and print the result as TikZ
    Shift {
        file: PathBuf,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dx: f64,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: f64,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "tikzgraph={log_level},tikzgraph_core={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Tikz { file } => commands::tikz(&file, &config),
        Commands::Bounds { file } => commands::bounds(&file),
        Commands::Paths { file } => commands::paths(&file),
        Commands::Flip { file, vertical } => commands::flip(&file, vertical, &config),
        Commands::Shift { file, dx, dy } => commands::shift(&file, dx, dy, &config),
        Commands::Version => {
            println!("tikzgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
