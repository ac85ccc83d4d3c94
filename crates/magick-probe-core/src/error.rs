//! Error types for the magick-probe library.
//!
//! Invocation and decode failures for individual files are reported as
//! [`ParserError`] values, which carry everything needed to diagnose the
//! failure: the message, the file(s) involved, the exact command line and
//! both captured output streams. Everything else goes through [`ProbeError`].

use std::fmt;
use thiserror::Error;

/// Top-level error type for magick-probe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A convert invocation or its output failed
    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// The convert output could not be decoded, even after sanitization.
#[derive(Error, Debug)]
#[error("Unable to decode ImageMagick JSON: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// A failed convert invocation or an undecodable convert output.
///
/// `file` is the comma-separated list of files passed to the invocation.
/// `cmd`, `stdout` and `stderr` are empty when the command itself succeeded
/// but its output could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    msg: String,
    file: String,
    cmd: String,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ParserError {
    /// Create a new `ParserError`.
    pub fn new(
        msg: impl Into<String>,
        file: impl Into<String>,
        cmd: impl Into<String>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> Self {
        Self {
            msg: msg.into(),
            file: file.into(),
            cmd: cmd.into(),
            stdout,
            stderr,
        }
    }

    /// Build the error for a decode failure: message and files only.
    pub fn from_decode(err: &DecodeError, files: &[String]) -> Self {
        Self::new(err.to_string(), files.join(", "), "", Vec::new(), Vec::new())
    }

    /// The error message.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// The file(s) that caused the error, if any.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The command line that failed, if any.
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Standard output produced by the failed command, if any.
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Standard error produced by the failed command, if any.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Display adapter for an optional error. `None` renders as `<nil>`.
    ///
    /// ```
    /// use magick_probe_core::ParserError;
    ///
    /// let absent: Option<&ParserError> = None;
    /// assert_eq!(ParserError::display_opt(absent).to_string(), "<nil>");
    /// ```
    pub fn display_opt(err: Option<&ParserError>) -> MaybeParserError<'_> {
        MaybeParserError(err)
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error: {}; File: {:?}; Cmd: {:?}; StdOut: {:?}; StdErr: {:?}",
            self.msg,
            self.file,
            self.cmd,
            String::from_utf8_lossy(&self.stdout),
            String::from_utf8_lossy(&self.stderr),
        )
    }
}

impl std::error::Error for ParserError {}

/// See [`ParserError::display_opt`].
#[derive(Debug, Clone, Copy)]
pub struct MaybeParserError<'a>(Option<&'a ParserError>);

impl fmt::Display for MaybeParserError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => err.fmt(f),
            None => f.write_str("<nil>"),
        }
    }
}

/// Convenience type alias for magick-probe results.
pub type Result<T> = std::result::Result<T, ProbeError>;
