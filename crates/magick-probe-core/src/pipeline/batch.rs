//! One convert invocation over a group of files.

use crate::error::ParserError;
use crate::types::ImageResult;

use super::decode::details_from_json;
use super::invoke::Invoker;

/// Runs convert over a batch of files and decodes the JSON it prints.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    invoker: Invoker,
    output_marker: String,
}

impl BatchRunner {
    /// Create a batch runner. `output_marker` is the trailing argument that
    /// makes convert print JSON to stdout (normally `json:-`).
    pub fn new(invoker: Invoker, output_marker: impl Into<String>) -> Self {
        Self {
            invoker,
            output_marker: output_marker.into(),
        }
    }

    /// The underlying invoker.
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Describe every file in `paths` with a single convert invocation.
    ///
    /// Either all results are returned, or one error covering the whole
    /// batch. An undecodable output yields an error with the decode message
    /// and the file list but no command line or captured output.
    pub async fn run_batch(&self, paths: &[String]) -> Result<Vec<ImageResult>, ParserError> {
        let mut args = Vec::with_capacity(paths.len() + 1);
        args.extend(paths.iter().cloned());
        args.push(self.output_marker.clone());

        let output = self.invoker.invoke(paths, &args).await?;

        details_from_json(&output.stdout).map_err(|e| {
            tracing::debug!("Undecodable output for {} file(s): {}", paths.len(), e);
            ParserError::from_decode(&e, paths)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{args, success, MockRunner};
    use std::sync::Arc;

    fn runner_with(mock: Arc<MockRunner>) -> BatchRunner {
        BatchRunner::new(Invoker::new("convert", mock), "json:-")
    }

    #[tokio::test]
    async fn test_run_batch_appends_output_marker() {
        let mock = Arc::new(MockRunner::echo());
        let runner = runner_with(mock.clone());

        let results = runner.run_batch(&args(&["a.jpg", "b.jpg"])).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].image.name, "a.jpg");
        assert_eq!(results[1].image.name, "b.jpg");
        assert_eq!(mock.runs(), vec![args(&["a.jpg", "b.jpg", "json:-"])]);
    }

    #[tokio::test]
    async fn test_run_batch_sanitizes_before_decoding() {
        let mock = Arc::new(MockRunner::echo());
        let results = runner_with(mock).run_batch(&args(&["a.jpg"])).await.unwrap();
        assert_eq!(results[0].image.channel_statistics["Red"].entropy, None);
    }

    #[tokio::test]
    async fn test_run_batch_invocation_failure() {
        let mock = Arc::new(MockRunner::failing_on(&["bad.jpg"]));
        let err = runner_with(mock)
            .run_batch(&args(&["a.jpg", "bad.jpg"]))
            .await
            .unwrap_err();
        assert_eq!(err.file(), "a.jpg, bad.jpg");
        assert_eq!(err.cmd(), "convert a.jpg bad.jpg json:-");
        assert_eq!(err.stderr(), b"convert: improper image header");
    }

    #[tokio::test]
    async fn test_run_batch_decode_failure() {
        let mock = Arc::new(MockRunner::new(|_| Ok(success(b"[{\"image\": ".to_vec()))));
        let err = runner_with(mock)
            .run_batch(&args(&["a.jpg", "b.jpg"]))
            .await
            .unwrap_err();
        assert!(err.msg().starts_with("Unable to decode ImageMagick JSON: "));
        assert_eq!(err.file(), "a.jpg, b.jpg");
        assert!(err.cmd().is_empty());
        assert!(err.stdout().is_empty());
        assert!(err.stderr().is_empty());
    }

    #[tokio::test]
    async fn test_run_batch_empty_output_array() {
        let mock = Arc::new(MockRunner::new(|_| Ok(success(b"[]".to_vec()))));
        let results = runner_with(mock).run_batch(&args(&["a.jpg"])).await.unwrap();
        assert!(results.is_empty());
    }
}
