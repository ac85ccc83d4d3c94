//! Bounded channels for backpressure in the batch pipeline.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full the sender waits, so a slow consumer throttles
/// the workers instead of letting results pile up in memory.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}

/// Feed `files` into a new bounded channel from a background task.
///
/// The channel closes once every file has been sent, which is what tells the
/// pipeline's workers that the input is exhausted. Feeding stops early if the
/// receiver is dropped.
pub fn feed_files<I>(files: I, config: &PipelineConfig) -> (mpsc::Receiver<String>, JoinHandle<usize>)
where
    I: IntoIterator<Item = String> + Send + 'static,
    I::IntoIter: Send,
{
    let (tx, rx) = bounded_channel(config);
    let handle = tokio::spawn(async move {
        let mut sent = 0;
        for file in files {
            if tx.send(file).await.is_err() {
                // Pipeline gone, stop feeding
                tracing::warn!("File receiver closed after {sent} file(s)");
                break;
            }
            sent += 1;
        }
        sent
    });
    (rx, handle)
}
