//! Input discovery: expands files and directories into image paths.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;

/// Finds image files to hand to convert.
pub struct FileDiscovery {
    config: DiscoveryConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Discover all candidate image files at a path.
    ///
    /// An explicitly named file is returned as long as it exists, whatever
    /// its extension; convert decides whether it can read it. Directories are
    /// walked recursively and filtered by extension.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            return match std::fs::metadata(path) {
                Ok(meta) => vec![DiscoveredFile {
                    path: path.to_path_buf(),
                    size: meta.len(),
                }],
                Err(e) => {
                    tracing::warn!("Cannot read {:?}: {}", path, e);
                    vec![]
                }
            };
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path).follow_links(self.config.follow_links) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let entry_path = entry.path();
            if entry.file_type().is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Discover files under every input path, in input order.
    pub fn discover_all<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<DiscoveredFile> {
        paths
            .iter()
            .flat_map(|p| self.discover(p.as_ref()))
            .collect()
    }

    /// Check if a file has a configured extension. No extensions means any file.
    fn is_supported(&self, path: &Path) -> bool {
        if self.config.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
