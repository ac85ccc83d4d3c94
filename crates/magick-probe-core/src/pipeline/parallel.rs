//! Parallel batch pipeline with per-file fallback.
//!
//! A fixed pool of workers pulls file paths from one shared queue, groups
//! them into batches and runs each batch through a single convert call.
//! When a multi-file batch fails, its files are retried one at a time so a
//! single bad input only costs its own result:
//!
//! ```text
//! files ─┬─ worker 0 ─ [a b c d] ─ ok ────────────────┬─► results
//!        ├─ worker 1 ─ [e f g h] ─ fail ─ e f g h ─────┤
//!        └─ worker N ─ ...                             └─► errors
//! ```
//!
//! The pipeline owns both output streams: they close once every worker has
//! finished, at the same moment the returned [`JoinHandle`] resolves. With
//! bounded channels, consumers must read both streams concurrently (for
//! example with `tokio::select!`), otherwise a full errors channel can stall
//! workers while the consumer waits on results.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::{Config, PipelineConfig};
use crate::error::ParserError;
use crate::types::ImageResult;

use super::batch::BatchRunner;
use super::channel::bounded_channel;
use super::invoke::{CommandRunner, Invoker};

type SharedFiles = Arc<Mutex<mpsc::Receiver<String>>>;

/// Counters reported when a pipeline run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Batches pulled from the input queue
    pub batches: usize,
    /// Convert invocations, including per-file retries
    pub invocations: usize,
    /// Failed multi-file batches that were retried file by file
    pub fallbacks: usize,
    /// Image records produced
    pub results: usize,
    /// Errors produced
    pub errors: usize,
}

impl PipelineStats {
    fn merge(&mut self, other: &PipelineStats) {
        self.batches += other.batches;
        self.invocations += other.invocations;
        self.fallbacks += other.fallbacks;
        self.results += other.results;
        self.errors += other.errors;
    }
}

/// Receiving ends of a pipeline started with [`ParallelPipeline::spawn`].
#[derive(Debug)]
pub struct PipelineRun {
    pub results: mpsc::Receiver<ImageResult>,
    pub errors: mpsc::Receiver<ParserError>,
    /// Resolves once all workers are done and both streams are closed
    pub handle: JoinHandle<PipelineStats>,
}

/// Describes files in parallel batches of convert invocations.
///
/// Each instance carries its own configuration, so several pipelines can
/// run side by side with different commands or batch sizes.
#[derive(Debug, Clone)]
pub struct ParallelPipeline {
    runner: BatchRunner,
    config: PipelineConfig,
}

impl ParallelPipeline {
    /// Create a pipeline from a batch runner and pipeline settings.
    ///
    /// Zero batch sizes or worker counts are raised to 1.
    pub fn new(runner: BatchRunner, mut config: PipelineConfig) -> Self {
        config.batch_size = config.batch_size.max(1);
        config.workers = config.workers.max(1);
        Self { runner, config }
    }

    /// Create a pipeline for the configured convert command, spawning
    /// processes through `runner`.
    pub fn from_config(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        let invoker = Invoker::new(config.convert_command(), runner);
        Self::new(
            BatchRunner::new(invoker, config.convert.output_marker.clone()),
            config.pipeline.clone(),
        )
    }

    /// The batch runner each worker uses.
    pub fn runner(&self) -> &BatchRunner {
        &self.runner
    }

    /// The pipeline settings in effect.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start the workers on caller-provided channels.
    ///
    /// Files are read from `files` until the sender side is closed and the
    /// queue is empty. Every file ends up as its image record(s) on `results`
    /// or as exactly one [`ParserError`] on `errors`. The pipeline drops its
    /// senders when done, so both streams close when the handle resolves
    /// (provided the caller kept no sender clones of its own).
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(
        &self,
        files: mpsc::Receiver<String>,
        results: mpsc::Sender<ImageResult>,
        errors: mpsc::Sender<ParserError>,
    ) -> JoinHandle<PipelineStats> {
        let files: SharedFiles = Arc::new(Mutex::new(files));
        let runner = self.runner.clone();
        let batch_size = self.config.batch_size;
        let workers = self.config.workers;

        tokio::spawn(async move {
            tracing::debug!(
                "Starting {} workers with batch size {} ({})",
                workers,
                batch_size,
                runner.invoker().command()
            );

            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    let worker = Worker {
                        id,
                        runner: runner.clone(),
                        batch_size,
                        files: Arc::clone(&files),
                        results: Output::new("results", results.clone()),
                        errors: Output::new("errors", errors.clone()),
                        stats: PipelineStats::default(),
                    };
                    tokio::spawn(worker.run())
                })
                .collect();

            // Only the workers hold senders from here on.
            drop(results);
            drop(errors);

            let mut stats = PipelineStats::default();
            for handle in handles {
                match handle.await {
                    Ok(worker_stats) => stats.merge(&worker_stats),
                    Err(e) => tracing::error!("Pipeline worker panicked: {e}"),
                }
            }

            tracing::debug!(
                "Pipeline finished: {} results, {} errors, {} invocations ({} fallbacks)",
                stats.results,
                stats.errors,
                stats.invocations,
                stats.fallbacks
            );
            stats
        })
    }

    /// Start the workers with fresh bounded output channels.
    pub fn spawn(&self, files: mpsc::Receiver<String>) -> PipelineRun {
        let (results_tx, results) = bounded_channel(&self.config);
        let (errors_tx, errors) = bounded_channel(&self.config);
        let handle = self.run(files, results_tx, errors_tx);
        PipelineRun {
            results,
            errors,
            handle,
        }
    }
}

/// One outbound stream as seen by a worker.
struct Output<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
    closed: bool,
}

impl<T> Output<T> {
    fn new(name: &'static str, tx: mpsc::Sender<T>) -> Self {
        Self {
            name,
            tx,
            closed: false,
        }
    }

    /// Send an item, remembering when the consumer has gone away.
    async fn send(&mut self, worker: usize, item: T) {
        if self.closed {
            return;
        }
        if self.tx.send(item).await.is_err() {
            tracing::warn!(
                "Worker {worker}: {} receiver dropped, discarding further {}",
                self.name,
                self.name
            );
            self.closed = true;
        }
    }
}

struct Worker {
    id: usize,
    runner: BatchRunner,
    batch_size: usize,
    files: SharedFiles,
    results: Output<ImageResult>,
    errors: Output<ParserError>,
    stats: PipelineStats,
}

impl Worker {
    async fn run(mut self) -> PipelineStats {
        loop {
            let batch = self.next_batch().await;
            if batch.is_empty() {
                break;
            }
            self.process(batch).await;

            if self.results.closed && self.errors.closed {
                tracing::warn!("Worker {}: all receivers dropped, stopping", self.id);
                break;
            }
        }
        self.stats
    }

    /// Pull up to `batch_size` files, fewer only when the input is exhausted.
    ///
    /// The queue stays locked while the batch fills, so batches are
    /// contiguous runs of the input and only the last one can be short.
    async fn next_batch(&self) -> Vec<String> {
        let mut files = self.files.lock().await;
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match files.recv().await {
                Some(file) => batch.push(file),
                None => break,
            }
        }
        batch
    }

    async fn process(&mut self, batch: Vec<String>) {
        self.stats.batches += 1;
        self.stats.invocations += 1;
        tracing::debug!("Worker {}: batch of {} file(s)", self.id, batch.len());

        match self.runner.run_batch(&batch).await {
            Ok(results) => self.emit_results(results).await,
            Err(err) if batch.len() == 1 => self.emit_error(err).await,
            Err(err) => {
                self.stats.fallbacks += 1;
                tracing::warn!(
                    "Worker {}: batch of {} failed, retrying file by file: {}",
                    self.id,
                    batch.len(),
                    err.msg()
                );
                for file in batch {
                    self.stats.invocations += 1;
                    match self.runner.run_batch(std::slice::from_ref(&file)).await {
                        Ok(results) => self.emit_results(results).await,
                        Err(err) => self.emit_error(err).await,
                    }
                }
            }
        }
    }

    async fn emit_results(&mut self, results: Vec<ImageResult>) {
        self.stats.results += results.len();
        for result in results {
            self.results.send(self.id, result).await;
        }
    }

    async fn emit_error(&mut self, err: ParserError) {
        tracing::debug!("Worker {}: {}", self.id, err.msg());
        self.stats.errors += 1;
        self.errors.send(self.id, err).await;
    }
}
