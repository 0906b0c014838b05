//! Centralized error handling for artfetch

use std::io;
use thiserror::Error;

/// Error type shared by every probe and loader
#[derive(Debug, Error)]
pub enum FetchError {
    /// I/O errors (pseudo-file reads, art files, spawning commands)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A command ran but exited unsuccessfully
    #[error("command '{program}' failed with exit code {code:?}")]
    Command { program: String, code: Option<i32> },

    /// Output did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),

    /// The value could not be found by any method
    #[error("detection error: {0}")]
    Detection(String),

    /// The category is not probed on this platform
    #[error("not supported on {0}")]
    Unsupported(&'static str),
}

impl FetchError {
    pub fn parse(msg: impl Into<String>) -> Self {
        FetchError::Parse(msg.into())
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        FetchError::Detection(msg.into())
    }
}

/// Type alias for Results in artfetch
pub type Result<T> = std::result::Result<T, FetchError>;
