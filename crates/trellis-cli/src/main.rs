//! Trellis CLI - Command-line interface for Trellis
//!
//! Scans a source tree for one language, builds its call graph and
//! writes the run's JSON, CSV and PNG artifacts.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author = "Trellis Contributors")]
#[command(version)]
#[command(about = "Build a static call graph of a source tree", long_about = None)]
struct Cli {
    /// Root directory to scan
    root: PathBuf,

    /// Language to extract (python, java, go, js, cpp, c, php)
    #[arg(short, long, default_value = "python")]
    language: String,

    /// Directory the run artifacts are written to
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Follow symbolic links while walking the root
    #[arg(long)]
    follow_symlinks: bool,

    /// Skip rendering the PNG
    #[arg(long)]
    no_image: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let args = commands::AnalyzeArgs {
        root: cli.root,
        language: cli.language,
        output: cli.output,
        follow_symlinks: cli.follow_symlinks,
        render_image: !cli.no_image,
    };

    if let Err(e) = commands::analyze(&args) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
