//! Relaying extractor stdout as an HTTP response body.

use audiorelay_ytdlp::{drain_diagnostics, MediaProcess};
use axum::body::Body;
use bytes::Bytes;
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::process::Child;
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::io::ReaderStream;

/// Logs when a relay is dropped before the extractor's output ended.
struct RelayGuard {
    source: String,
    finished: bool,
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(url = %self.source, "Client went away, extractor killed");
        }
    }
}

/// Turn a running extractor into a streaming body.
///
/// Stderr is drained on its own task for as long as the process lives. The
/// body owns the child: if the client disconnects the body is dropped and the
/// process is killed. A read error on stdout ends the body early instead of
/// failing the already-started response.
pub fn relay_body(
    process: MediaProcess,
    source: String,
    permit: Option<OwnedSemaphorePermit>,
) -> Body {
    let MediaProcess {
        child,
        stdout,
        stderr,
    } = process;

    drain_diagnostics(stderr, source.clone());
    relay_output(stdout, child, source, permit)
}

/// Stream `output` until it ends or fails, then reap `child`.
fn relay_output<R>(
    output: R,
    mut child: Child,
    source: String,
    permit: Option<OwnedSemaphorePermit>,
) -> Body
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let stream = async_stream::stream! {
        let _permit = permit;
        let mut guard = RelayGuard { source, finished: false };
        let mut chunks = ReaderStream::new(output);
        let mut sent: u64 = 0;
        let mut broken = false;

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    sent += bytes.len() as u64;
                    yield Ok::<Bytes, std::io::Error>(bytes);
                }
                Err(e) => {
                    tracing::error!(url = %guard.source, "Streaming error: {}", e);
                    broken = true;
                    break;
                }
            }
        }
        drop(chunks);

        if broken {
            if let Err(e) = child.start_kill() {
                tracing::debug!(url = %guard.source, "Extractor already gone: {}", e);
            }
        }

        match child.wait().await {
            Ok(status) if status.success() => {
                tracing::info!(url = %guard.source, bytes = sent, "Relay finished");
            }
            Ok(status) => {
                tracing::warn!(url = %guard.source, bytes = sent, %status, "Extractor exited unsuccessfully");
            }
            Err(e) => {
                tracing::error!(url = %guard.source, "Failed to reap extractor: {}", e);
            }
        }
        guard.finished = true;
    };

    Body::from_stream(stream)
}
