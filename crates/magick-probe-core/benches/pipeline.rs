//! Benchmarks for the magick-probe metadata pipeline.
//!
//! Run with: cargo bench -p magick-probe-core

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use magick_probe_core::config::PipelineConfig;
use magick_probe_core::pipeline::{decode, details_from_json, feed_files, sanitize};
use magick_probe_core::{BatchRunner, CommandOutput, CommandRunner, Invoker, ParallelPipeline};
use std::path::Path;
use std::sync::Arc;

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures/json")
        .join(name)
}

fn load_fixture(name: &str) -> Option<Vec<u8>> {
    match std::fs::read(fixture_path(name)) {
        Ok(data) => Some(data),
        Err(_) => {
            eprintln!("Skipping benchmark: fixture {name} not found");
            None
        }
    }
}

/// Answers every invocation with the same captured convert output.
struct CannedRunner {
    output: Vec<u8>,
}

#[async_trait]
impl CommandRunner for CannedRunner {
    async fn run(&self, _program: &str, _args: &[String]) -> std::io::Result<CommandOutput> {
        Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout: self.output.clone(),
            stderr: Vec::new(),
        })
    }
}

fn benchmark_sanitize(c: &mut Criterion) {
    let Some(raw) = load_fixture("bug72278.json") else {
        return;
    };
    let clean = sanitize(&raw).into_owned();

    c.bench_function("sanitize_with_nan", |b| {
        b.iter(|| sanitize(black_box(&raw)).len())
    });
    c.bench_function("sanitize_clean", |b| {
        b.iter(|| sanitize(black_box(&clean)).len())
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let Some(raw) = load_fixture("bug72278.json") else {
        return;
    };
    let clean = sanitize(&raw).into_owned();

    c.bench_function("decode_single_image", |b| {
        b.iter(|| decode(black_box(&clean)))
    });
    c.bench_function("details_from_json", |b| {
        b.iter(|| details_from_json(black_box(&raw)))
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let Some(raw) = load_fixture("multi_frame.json") else {
        return;
    };
    let rt = tokio::runtime::Runtime::new().unwrap();
    let runner = Arc::new(CannedRunner { output: raw });
    let config = PipelineConfig {
        batch_size: 10,
        workers: 4,
        buffer_size: 64,
    };
    let pipeline = ParallelPipeline::new(
        BatchRunner::new(Invoker::new("convert", runner), "json:-"),
        config.clone(),
    );

    c.bench_function("pipeline_200_files", |b| {
        b.iter(|| {
            rt.block_on(async {
                let files: Vec<String> = (0..200).map(|i| format!("{i}.gif")).collect();
                let (files_rx, _feeder) = feed_files(files, &config);
                let mut run = pipeline.spawn(files_rx);
                let mut count = 0usize;
                while run.results.recv().await.is_some() {
                    count += 1;
                }
                let _ = run.handle.await;
                black_box(count)
            })
        })
    });
}

criterion_group!(
    benches,
    benchmark_sanitize,
    benchmark_decode,
    benchmark_pipeline
);
criterion_main!(benches);
