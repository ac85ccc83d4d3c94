//! magick-probe core - structured image metadata from ImageMagick.
//!
//! Runs `convert <files...> json:-`, repairs the NaN/infinity literals some
//! builds print, and decodes the output into typed [`ImageResult`]s. Large
//! file sets go through a parallel pipeline that batches files per convert
//! call and isolates bad inputs when a batch fails.
//!
//! # Architecture
//!
//! ```text
//! paths → workers → batch → convert json:- → sanitize → decode → results
//!                     └── on failure: retry each file alone ──→ errors
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use magick_probe_core::{Config, MagickProbe};
//!
//! #[tokio::main]
//! async fn main() -> magick_probe_core::Result<()> {
//!     let probe = MagickProbe::new(Config::load()?);
//!
//!     let results = probe.details(&["./image.jpg".to_string()]).await?;
//!     let image = &results[0].image;
//!     println!("{} {:?}", image.format, image.geometry);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

use std::sync::Arc;
use tokio::sync::mpsc;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, DecodeError, ParserError, ProbeError, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    BatchRunner, CommandOutput, CommandRunner, Invoker, ParallelPipeline, PipelineRun,
    PipelineStats, SystemRunner,
};
pub use types::{
    ChannelStatistics, Dimensions, Geometry, ImageDetails, ImageResult, Point, PointFloat,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point bundling a configuration with a command runner.
#[derive(Debug, Clone)]
pub struct MagickProbe {
    config: Config,
    pipeline: ParallelPipeline,
}

impl MagickProbe {
    /// Create a probe that runs the real convert binary.
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Create a probe that spawns commands through `runner`.
    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        tracing::debug!("Initializing magick-probe v{}", VERSION);
        let pipeline = ParallelPipeline::from_config(&config, runner);
        Self { config, pipeline }
    }

    /// Create a probe from the configuration file, or defaults if there is none.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Config::load()?))
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The parallel pipeline configured for this probe.
    pub fn pipeline(&self) -> &ParallelPipeline {
        &self.pipeline
    }

    /// Describe `files` with one convert invocation.
    pub async fn details(&self, files: &[String]) -> std::result::Result<Vec<ImageResult>, ParserError> {
        self.batch_runner().run_batch(files).await
    }

    /// Decode JSON captured from an earlier `convert <files> json:-` run.
    pub fn details_from_json(raw: &[u8]) -> std::result::Result<Vec<ImageResult>, DecodeError> {
        pipeline::details_from_json(raw)
    }

    /// Run convert with arbitrary arguments, returning `(stdout, stderr)`.
    pub async fn convert(&self, args: &[String]) -> std::result::Result<(Vec<u8>, Vec<u8>), ParserError> {
        self.batch_runner().invoker().convert(args).await
    }

    /// Start the parallel pipeline on `files`. See [`ParallelPipeline::spawn`].
    pub fn spawn(&self, files: mpsc::Receiver<String>) -> PipelineRun {
        self.pipeline.spawn(files)
    }

    fn batch_runner(&self) -> &BatchRunner {
        self.pipeline.runner()
    }
}
