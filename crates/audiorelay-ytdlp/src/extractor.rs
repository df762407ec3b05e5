//! The three extractor modes: resolve, stream, and version.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::command::ToolCommand;
use crate::tools::get_tool_path;
use crate::{Error, ExtractorOptions, Result};

/// Handle to a configured extractor executable.
#[derive(Debug, Clone)]
pub struct Extractor {
    program: PathBuf,
    options: ExtractorOptions,
}

/// A running extractor writing media to its stdout.
///
/// The child is spawned with `kill_on_drop`, so dropping this (or the child
/// after splitting it off) terminates the process.
#[derive(Debug)]
pub struct MediaProcess {
    pub child: Child,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

impl Extractor {
    pub fn new(program: PathBuf, options: ExtractorOptions) -> Self {
        Self { program, options }
    }

    /// Locate the executable from the options.
    ///
    /// A missing tool is not fatal here: the bare program name is kept so
    /// that each invocation fails with a launch error instead.
    pub fn from_options(options: ExtractorOptions) -> Self {
        let program = match get_tool_path(&options.program, options.path.as_deref()) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}; requests will fail until it is installed", e);
                options
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&options.program))
            }
        };
        Self::new(program, options)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the direct media URL for `url`.
    ///
    /// Waits for the process to finish. On failure the diagnostic output is
    /// logged here; callers only get the error kind.
    pub async fn resolve_url(&self, url: &str) -> Result<String> {
        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(self.options.resolve_args(url))
            .timeout(self.options.resolve_timeout());

        let output = match cmd.execute().await {
            Ok(output) => output,
            Err(e) => {
                match e.diagnostics() {
                    Some(stderr) => {
                        tracing::error!(url, stderr = %stderr.trim(), "{}", e)
                    }
                    None => tracing::error!(url, "{}", e),
                }
                return Err(e);
            }
        };

        let resolved = output.stdout.trim();
        if resolved.is_empty() {
            return Err(Error::EmptyOutput {
                tool: cmd.program_name(),
            });
        }

        tracing::debug!(url, "resolved direct media URL");
        Ok(resolved.to_string())
    }

    /// Query the extractor's version string.
    pub async fn version(&self) -> Result<String> {
        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(self.options.version_args())
            .timeout(self.options.version_timeout());

        let output = cmd.execute().await?;
        let version = output.stdout.trim();
        if version.is_empty() {
            return Err(Error::EmptyOutput {
                tool: cmd.program_name(),
            });
        }
        Ok(version.to_string())
    }

    /// Start the extractor writing the selected media for `url` to stdout.
    ///
    /// Returns as soon as the process is running; nothing is read yet.
    pub fn spawn_stream(&self, url: &str) -> Result<MediaProcess> {
        let tool = self.tool_name();

        let mut child = Command::new(&self.program)
            .args(self.options.stream_args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::launch(&tool, e))?;

        let stdout = child.stdout.take().ok_or_else(|| Error::MissingPipe {
            tool: tool.clone(),
            pipe: "stdout",
        })?;
        let stderr = child.stderr.take().ok_or(Error::MissingPipe {
            tool,
            pipe: "stderr",
        })?;

        tracing::debug!(url, pid = child.id(), "extractor stream started");

        Ok(MediaProcess {
            child,
            stdout,
            stderr,
        })
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

/// Log everything the extractor writes to stderr until the pipe closes.
///
/// Output is split on newlines so multi-byte characters are never cut in
/// half. Must keep running for the life of the process: an undrained stderr
/// pipe fills up and stalls the extractor.
pub fn drain_diagnostics(stderr: ChildStderr, source: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).split(b'\n');
        loop {
            match lines.next_segment().await {
                Ok(Some(line)) => {
                    let text = String::from_utf8_lossy(&line);
                    let text = text.trim();
                    if !text.is_empty() {
                        tracing::warn!(url = %source, "{}", text);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(url = %source, "failed to read extractor stderr: {}", e);
                    break;
                }
            }
        }
    })
}
