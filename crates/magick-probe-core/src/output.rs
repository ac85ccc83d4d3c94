//! Streaming output for JSON and JSONL.
//!
//! Results come off the pipeline one at a time, so the JSON array is
//! written incrementally: the opening bracket with the first item, a comma
//! before every later item, and the closing bracket on [`OutputWriter::finish`].

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A writer that streams items as a JSON array or as JSON lines.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON array format; JSONL is always compact.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let separator: &[u8] = match (self.items_written, self.pretty) {
                    (0, true) => b"[\n",
                    (0, false) => b"[",
                    (_, true) => b",\n",
                    (_, false) => b",",
                };
                self.writer.write_all(separator)?;
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Close the JSON array (if any), flush, and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            match (self.items_written, self.pretty) {
                (0, _) => self.writer.write_all(b"[]\n")?,
                (_, true) => self.writer.write_all(b"\n]\n")?,
                (_, false) => self.writer.write_all(b"]\n")?,
            }
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
