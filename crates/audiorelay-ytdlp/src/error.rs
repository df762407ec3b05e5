//! Error types for audiorelay-ytdlp.

use std::process::ExitStatus;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the extractor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The process could not be started.
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("{tool} exited with {status}")]
    Failed {
        tool: String,
        status: ExitStatus,
        /// Captured diagnostic output. Never shown to HTTP clients.
        stderr: String,
    },

    /// The process did not finish within its time limit and was killed.
    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// The process succeeded but printed nothing useful.
    #[error("{tool} produced no output")]
    EmptyOutput { tool: String },

    /// A pipe the extractor needed was not available on the child.
    #[error("{tool} is missing its {pipe} pipe")]
    MissingPipe { tool: String, pipe: &'static str },

    /// An I/O error occurred while talking to the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a launch error.
    pub fn launch(tool: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            tool: tool.into(),
            source,
        }
    }

    /// Create a timeout error.
    pub fn timeout(tool: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            tool: tool.into(),
            timeout,
        }
    }

    /// Diagnostic output captured from a failed run, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }

    /// Whether the process never got as far as running.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::ToolNotFound { .. })
    }
}
