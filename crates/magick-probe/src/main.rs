//! magick-probe CLI - structured image metadata from ImageMagick, in parallel.
//!
//! Runs `convert <files...> json:-` over large sets of images, batching files
//! per invocation and isolating the inputs convert chokes on.
//!
//! # Usage
//!
//! ```bash
//! # Describe a directory tree as a JSON array
//! magick-probe process ./photos/ --output details.json
//!
//! # Stream JSON lines with 8 workers and 10 files per convert call
//! magick-probe process ./photos/ --format jsonl --workers 8 --batch-size 10
//!
//! # Summarize previously captured convert output
//! magick-probe parse captured.json
//!
//! # Run the configured convert command directly
//! magick-probe convert -- -version
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// magick-probe - parallel ImageMagick metadata extraction.
#[derive(Parser, Debug)]
#[command(name = "magick-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe image files and directories with convert
    Process(cli::process::ProcessArgs),

    /// Decode previously captured `convert ... json:-` output
    Parse(cli::parse::ParseArgs),

    /// Run the configured convert command with arbitrary arguments
    Convert(cli::convert::ConvertArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match magick_probe_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `magick-probe config path`."
            );
            magick_probe_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("magick-probe v{}", magick_probe_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Parse(args) => cli::parse::execute(args, config).await,
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
