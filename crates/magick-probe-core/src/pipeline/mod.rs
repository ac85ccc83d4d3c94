//! Metadata extraction pipeline components.
//!
//! - **invoke**: Run the convert command through a pluggable [`CommandRunner`]
//! - **sanitize**: Repair NaN/infinity literals in convert's JSON
//! - **decode**: Decode the JSON into [`ImageResult`](crate::types::ImageResult)s
//! - **batch**: One convert invocation over a group of files
//! - **parallel**: Worker pool with per-file fallback for failed batches
//! - **discovery**: Find image files in directories
//! - **channel**: Bounded channels for backpressure

pub mod batch;
pub mod channel;
pub mod decode;
pub mod discovery;
pub mod invoke;
pub mod parallel;
pub mod sanitize;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use batch::BatchRunner;
pub use channel::{bounded_channel, feed_files};
pub use decode::{decode, details_from_json};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use invoke::{CommandOutput, CommandRunner, Invoker, SystemRunner};
pub use parallel::{ParallelPipeline, PipelineRun, PipelineStats};
pub use sanitize::sanitize;
