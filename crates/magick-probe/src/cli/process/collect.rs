//! Consuming pipeline output: streaming results, logging errors, progress.

use indicatif::{ProgressBar, ProgressStyle};
use magick_probe_core::{OutputWriter, PipelineRun, PipelineStats};
use std::io::Write;
use std::time::Duration;

/// What a pipeline run produced.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Image records written
    pub results: u64,
    /// Files that failed
    pub errors: u64,
    pub stats: PipelineStats,
}

/// Drain both pipeline streams until they close.
///
/// Results are written as they arrive; errors are logged with the file and
/// command that failed. Both streams are read concurrently so neither
/// bounded channel can stall the workers.
pub async fn collect_outputs<W: Write>(
    mut run: PipelineRun,
    writer: &mut OutputWriter<W>,
    progress: &ProgressBar,
) -> anyhow::Result<Outcome> {
    let mut outcome = Outcome::default();
    let (mut results_open, mut errors_open) = (true, true);

    while results_open || errors_open {
        tokio::select! {
            result = run.results.recv(), if results_open => match result {
                Some(result) => {
                    writer.write(&result)?;
                    outcome.results += 1;
                    progress.inc(1);
                }
                None => results_open = false,
            },
            err = run.errors.recv(), if errors_open => match err {
                Some(err) => {
                    outcome.errors += 1;
                    progress.inc(1);
                    tracing::error!("Failed: {} - {}", err.file(), err.msg());
                    if !err.cmd().is_empty() {
                        tracing::debug!("  Command: {}", err.cmd());
                    }
                    let stderr = String::from_utf8_lossy(err.stderr());
                    if !stderr.trim().is_empty() {
                        tracing::debug!("  Stderr: {}", stderr.trim());
                    }
                }
                None => errors_open = false,
            },
        }

        let elapsed = progress.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (outcome.results + outcome.errors) as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    }

    outcome.stats = run.handle.await?;
    Ok(outcome)
}

/// Create a progress bar for batch processing.
///
/// Multi-frame files advance the bar once per frame.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    match ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        Ok(style) => pb.set_style(style.progress_chars("##-")),
        Err(e) => tracing::debug!("Progress template rejected: {e}"),
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after processing.
pub fn print_summary(files: u64, total_bytes: u64, outcome: &Outcome, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { files as f64 / secs } else { 0.0 };
    let throughput = if secs > 0.0 {
        total_bytes as f64 / 1_000_000.0 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Files:        {:>8}", files);
    eprintln!("    Records:      {:>8}", outcome.results);
    if outcome.errors > 0 {
        eprintln!("    Failed:       {:>8}", outcome.errors);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Invocations:  {:>8}", outcome.stats.invocations);
    if outcome.stats.fallbacks > 0 {
        eprintln!("    Fallbacks:    {:>8}", outcome.stats.fallbacks);
    }
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Throughput:   {:>7.1} MB/sec", throughput);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use magick_probe_core::config::PipelineConfig;
    use magick_probe_core::pipeline::feed_files;
    use magick_probe_core::{
        BatchRunner, CommandOutput, CommandRunner, Invoker, OutputFormat, ParallelPipeline,
    };
    use std::sync::Arc;

    /// Describes every file except those containing "corrupt".
    struct ScriptedRunner;

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, _program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
            let files = &args[..args.len() - 1];
            if files.iter().any(|f| f.contains("corrupt")) {
                return Ok(CommandOutput {
                    success: false,
                    code: Some(1),
                    stdout: Vec::new(),
                    stderr: b"convert: corrupt image".to_vec(),
                });
            }
            let records: Vec<String> = files
                .iter()
                .map(|f| format!(r#"{{"image": {{"name": "{f}", "format": "PNG"}}}}"#))
                .collect();
            Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout: format!("[{}]", records.join(",")).into_bytes(),
                stderr: Vec::new(),
            })
        }
    }

    fn pipeline() -> ParallelPipeline {
        ParallelPipeline::new(
            BatchRunner::new(Invoker::new("convert", Arc::new(ScriptedRunner)), "json:-"),
            PipelineConfig {
                batch_size: 2,
                workers: 2,
                buffer_size: 1,
            },
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_collect_outputs_writes_results_and_counts_errors() {
        let pipeline = pipeline();
        let files = vec![
            "a.png".to_string(),
            "b.png".to_string(),
            "corrupt.png".to_string(),
            "d.png".to_string(),
            "e.png".to_string(),
        ];
        let (files_rx, _feeder) = feed_files(files, pipeline.config());
        let run = pipeline.spawn(files_rx);

        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        let progress = ProgressBar::hidden();
        let outcome = collect_outputs(run, &mut writer, &progress).await.unwrap();

        assert_eq!(outcome.results, 4);
        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.stats.fallbacks, 1);
        assert_eq!(progress.position(), 5);

        let output = writer.finish().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let mut names: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["image"]["name"].as_str().unwrap())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a.png", "b.png", "d.png", "e.png"]);
    }

    #[tokio::test]
    async fn test_collect_outputs_with_no_files() {
        let pipeline = pipeline();
        let (files_rx, _feeder) = feed_files(Vec::<String>::new(), pipeline.config());
        let run = pipeline.spawn(files_rx);

        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, false);
        let outcome = collect_outputs(run, &mut writer, &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(outcome.results, 0);
        assert_eq!(outcome.stats, PipelineStats::default());
        assert!(writer.finish().unwrap().is_empty());
    }
}
