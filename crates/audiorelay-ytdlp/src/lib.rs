//! # audiorelay-ytdlp
//!
//! Invocation layer for the yt-dlp extractor.
//!
//! This crate provides functionality for:
//! - Resolving a source URL to a direct, time-limited media URL
//! - Spawning the extractor with media written to stdout for relaying
//! - Querying the extractor version
//! - Detecting the extractor and its helpers on the system
//!
//! Every run is bounded: synchronous modes carry a timeout, and streaming
//! processes are killed when their handle is dropped.
//!
//! ## Example
//!
//! ```no_run
//! use audiorelay_ytdlp::{Extractor, ExtractorOptions};
//!
//! # async fn example() -> audiorelay_ytdlp::Result<()> {
//! let extractor = Extractor::from_options(ExtractorOptions::default());
//! let direct = extractor
//!     .resolve_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!     .await?;
//! println!("{direct}");
//! # Ok(())
//! # }
//! ```

mod command;
mod error;
mod extractor;
mod options;
pub mod tools;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use extractor::{drain_diagnostics, Extractor, MediaProcess};
pub use options::ExtractorOptions;
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
