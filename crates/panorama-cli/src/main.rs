mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "panorama", about = "Stitch eight photos into a 360° equirectangular panorama")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch eight overlapping images into an equirectangular panorama
    Stitch(commands::stitch::StitchArgs),
    /// Reproject an already stitched image to equirectangular
    Project(commands::project::ProjectArgs),
    /// Print the default configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Stitch(args) => commands::stitch::run(args),
        Commands::Project(args) => commands::project::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
