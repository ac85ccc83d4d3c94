//! The `magick-probe process` command for describing images in bulk.

mod collect;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use magick_probe_core::pipeline::{feed_files, FileDiscovery};
use magick_probe_core::{Config, MagickProbe, OutputFormat as CoreOutputFormat, OutputWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use collect::{collect_outputs, create_progress_bar, print_summary};

/// Arguments for the `process` command.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Image files or directories to process
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to output.format from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print the JSON array output
    #[arg(long)]
    pub pretty: bool,

    /// Number of parallel workers (one convert process each)
    #[arg(short, long, value_parser = parse_positive)]
    pub workers: Option<usize>,

    /// Number of files per convert invocation
    #[arg(short, long, value_parser = parse_positive)]
    pub batch_size: Option<usize>,

    /// The convert executable to run
    #[arg(long, env = "MAGICK_PROBE_CONVERT")]
    pub convert_command: Option<String>,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &ProcessArgs) {
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
    if let Some(batch_size) = args.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    if let Some(command) = &args.convert_command {
        config.convert.command = command.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format.to_string();
    }
    if args.pretty {
        config.output.pretty = true;
    }
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    let format = CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json);

    let discovery = FileDiscovery::new(config.discovery.clone());
    let files = discovery.discover_all(&args.inputs);
    if files.is_empty() {
        tracing::warn!("No image files found in {:?}", args.inputs);
        return Ok(());
    }
    tracing::info!(
        "Found {} image(s) to process ({} workers, {} per batch)",
        files.len(),
        config.pipeline.workers,
        config.pipeline.batch_size
    );

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut writer = OutputWriter::new(sink, format, config.output.pretty);

    let total_bytes = FileDiscovery::total_size(&files);
    let paths: Vec<String> = files
        .iter()
        .map(|f| f.path.to_string_lossy().into_owned())
        .collect();

    let progress = create_progress_bar(paths.len() as u64);
    let start_time = Instant::now();

    let probe = MagickProbe::new(config);
    let (files_rx, _feeder) = feed_files(paths, &probe.config().pipeline);
    let run = probe.spawn(files_rx);

    let outcome = collect_outputs(run, &mut writer, &progress).await?;
    writer.finish()?;
    progress.finish_and_clear();

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    print_summary(files.len() as u64, total_bytes, &outcome, start_time.elapsed());

    Ok(())
}
