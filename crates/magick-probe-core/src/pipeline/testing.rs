//! Scripted command runner for tests.

use async_trait::async_trait;
use serde_json::json;
use std::io;
use std::sync::Mutex;

use super::invoke::{CommandOutput, CommandRunner};

type Behavior = dyn Fn(&[String]) -> io::Result<CommandOutput> + Send + Sync;

/// Records every run and answers with the output of a script closure.
pub(crate) struct MockRunner {
    behavior: Box<Behavior>,
    runs: Mutex<Vec<Vec<String>>>,
}

impl MockRunner {
    pub(crate) fn new<F>(behavior: F) -> Self
    where
        F: Fn(&[String]) -> io::Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            behavior: Box::new(behavior),
            runs: Mutex::new(Vec::new()),
        }
    }

    /// Succeeds with one image record per input file.
    pub(crate) fn echo() -> Self {
        Self::new(|argv| Ok(success(records_for(argv))))
    }

    /// Like [`MockRunner::echo`], but any invocation that includes one of
    /// `bad` fails with exit status 1.
    pub(crate) fn failing_on(bad: &[&str]) -> Self {
        let bad = args(bad);
        Self::new(move |argv| {
            if argv.iter().any(|a| bad.contains(a)) {
                Ok(failure(1, Vec::new(), b"convert: improper image header".to_vec()))
            } else {
                Ok(success(records_for(argv)))
            }
        })
    }

    pub(crate) fn runs(&self) -> Vec<Vec<String>> {
        self.runs.lock().unwrap().clone()
    }

    pub(crate) fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, _program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self.runs.lock().unwrap().push(args.to_vec());
        // Let other workers interleave like real processes would.
        tokio::task::yield_now().await;
        (self.behavior)(args)
    }
}

pub(crate) fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn success(stdout: Vec<u8>) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout,
        stderr: Vec::new(),
    }
}

pub(crate) fn failure(code: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(code),
        stdout,
        stderr,
    }
}

/// A JSON array with one record per file argument (the trailing output
/// marker is skipped). Statistics use `-nan` like a real Linux build.
pub(crate) fn records_for(argv: &[String]) -> Vec<u8> {
    let files = &argv[..argv.len().saturating_sub(1)];
    let records: Vec<String> = files
        .iter()
        .map(|file| {
            let image = json!({
                "image": {
                    "name": file,
                    "baseName": file,
                    "format": "JPEG",
                    "geometry": { "width": 300, "height": 300, "x": 0, "y": 0 },
                    "filesize": "45720B",
                    "numberPixels": "90000",
                    "channelStatistics": { "Red": { "min": 255, "max": 255, "entropy": "NAN" } }
                }
            });
            image.to_string().replace(r#":"NAN""#, ": -nan")
        })
        .collect();
    format!("[{}]", records.join(",")).into_bytes()
}
