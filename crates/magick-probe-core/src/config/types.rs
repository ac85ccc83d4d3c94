//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// External convert command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// The `convert` executable (name on PATH or full path, `~` allowed)
    pub command: String,

    /// Output argument that makes convert print JSON to stdout
    pub output_marker: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            command: "convert".to_string(),
            output_marker: "json:-".to_string(),
        }
    }
}

/// Parallel pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of files passed to a single convert invocation
    pub batch_size: usize,

    /// Number of concurrent workers (one convert process each)
    pub workers: usize,

    /// Max items buffered on the results and errors channels
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            workers: default_workers(),
            buffer_size: 100,
        }
    }
}

/// One worker per available CPU.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Input file discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions handed to convert. An empty list accepts every file.
    pub extensions: Vec<String>,

    /// Follow symbolic links while walking directories
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: [
                "jpg", "jpeg", "png", "gif", "webp", "tif", "tiff", "bmp", "heic", "jp2", "psd",
                "cr2", "nef", "arw", "dng",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
            follow_links: true,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
