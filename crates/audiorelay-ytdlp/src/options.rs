//! Extractor options and argument construction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How the extractor is located and which flags every invocation carries.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExtractorOptions {
    /// Explicit path to the executable. Takes precedence over `program`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Program name looked up on `PATH` when no explicit path is set.
    #[serde(default = "default_program")]
    pub program: String,

    /// Pass `--no-check-certificates`.
    #[serde(default = "default_true")]
    pub no_check_certificates: bool,

    /// Value for `--remote-components`, or `None` to omit the flag.
    #[serde(default = "default_remote_components")]
    pub remote_components: Option<String>,

    /// Format selector passed to `-f`.
    #[serde(default = "default_format")]
    pub format: String,

    /// Time limit for resolving a direct URL.
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,

    /// Time limit for the version query.
    #[serde(default = "default_version_timeout")]
    pub version_timeout_secs: u64,
}

fn default_program() -> String {
    "yt-dlp".to_string()
}

fn default_true() -> bool {
    true
}

fn default_remote_components() -> Option<String> {
    Some("ejs:github".to_string())
}

fn default_format() -> String {
    "bestaudio/best".to_string()
}

fn default_resolve_timeout() -> u64 {
    120
}

fn default_version_timeout() -> u64 {
    15
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            path: None,
            program: default_program(),
            no_check_certificates: default_true(),
            remote_components: default_remote_components(),
            format: default_format(),
            resolve_timeout_secs: default_resolve_timeout(),
            version_timeout_secs: default_version_timeout(),
        }
    }
}

impl ExtractorOptions {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }

    /// Flags shared by the resolve and stream modes.
    fn selection_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.no_check_certificates {
            args.push("--no-check-certificates".to_string());
        }
        if let Some(ref components) = self.remote_components {
            args.push("--remote-components".to_string());
            args.push(components.clone());
        }
        args.push("-f".to_string());
        args.push(self.format.clone());
        args
    }

    /// Arguments that make the extractor print the direct media URL.
    pub fn resolve_args(&self, url: &str) -> Vec<String> {
        let mut args = self.selection_args();
        args.push("--get-url".to_string());
        args.push("--no-playlist".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments that make the extractor write the selected media to stdout.
    pub fn stream_args(&self, url: &str) -> Vec<String> {
        let mut args = self.selection_args();
        args.push("-o".to_string());
        args.push("-".to_string());
        args.push(url.to_string());
        args
    }

    pub fn version_args(&self) -> Vec<String> {
        vec!["--version".to_string()]
    }
}
