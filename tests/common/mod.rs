//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which writes a fake `yt-dlp` shell script into a
//! temporary directory and builds a full [`AppContext`] pointing at it.
//! Requests are driven through the router with `tower::ServiceExt::oneshot`.
//! [`capture_logs`] records tracing output for assertions on what was logged.

#![allow(dead_code)]

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use audiorelay::config::Config;
use audiorelay::server::{create_router, AppContext};
use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Direct URL the fake extractor prints in `--get-url` mode.
pub const DIRECT_URL: &str = "https://rr1---sn-fake.googlevideo.com/videoplayback?expire=1700000000&itag=251";

/// Bytes the fake extractor writes in `-o -` mode.
pub const AUDIO_BYTES: &[u8] = b"\x1aE\xdf\xa3fake-webm-opus-payload-0123456789";

/// Text the fake extractor writes to stderr when a source URL contains `fail`.
pub const SECRET_DIAGNOSTIC: &str = "ERROR: [youtube] abc: Sign in to confirm you're not a bot";

/// Version the fake extractor reports.
pub const VERSION: &str = "2025.01.15";

/// Behaviour keyed on the last argument (the source URL):
/// - contains `fail`: diagnostics on stderr, exit 1
/// - contains `hang`: sleeps past any test timeout
/// - contains `slow`: stream mode writes one chunk and then stalls
fn fake_extractor_script() -> String {
    let audio: String = AUDIO_BYTES.iter().map(|b| format!("\\{:03o}", b)).collect();
    format!(
        r#"#!/bin/sh
for arg in "$@"; do last="$arg"; done
if [ "$1" = "--version" ]; then
  printf '  {VERSION}  \n'
  exit 0
fi
case "$last" in
  *fail*) echo "{SECRET_DIAGNOSTIC}" >&2; exit 1 ;;
  *hang*) sleep 30; exit 0 ;;
esac
for arg in "$@"; do
  if [ "$arg" = "--get-url" ]; then
    printf '\n  %s  \n' '{DIRECT_URL}'
    exit 0
  fi
done
echo "[youtube] Extracting URL: $last" >&2
case "$last" in
  *slow*) printf 'first-chunk'; sleep 30 ;;
  *) printf '{audio}' ;;
esac
echo "[download] 100% of 34.00B" >&2
exit 0
"#
    )
}

/// Test harness wrapping a fully constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub extractor_path: PathBuf,
    _dir: TempDir,
}

impl TestHarness {
    /// Create a harness with default configuration and the fake extractor.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a harness with a custom configuration and the fake extractor.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("yt-dlp");
        std::fs::write(&path, fake_extractor_script()).expect("failed to write fake extractor");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to mark fake extractor executable");

        config.extractor.path = Some(path.clone());
        let ctx = AppContext::new(config);

        Self {
            ctx,
            extractor_path: path,
            _dir: dir,
        }
    }

    /// Create a harness whose extractor does not exist.
    pub fn without_extractor() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("missing-yt-dlp");

        let mut config = Config::default();
        config.extractor.path = Some(path.clone());
        config.extractor.program = "nonexistent_extractor_xyz_12345".to_string();
        let ctx = AppContext::new(config);

        Self {
            ctx,
            extractor_path: path,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Send a GET request through a fresh router.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        send(self.router(), get_request(uri)).await
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

/// Collect the whole response body.
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

/// Tracing output collected by [`capture_logs`].
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Wait until `needle` shows up, for output logged by background tasks.
    pub async fn wait_for(&self, needle: &str, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            if self.contents().contains(needle) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.contents().contains(needle)
    }
}

pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(self.0.clone())
    }
}

/// Route tracing output on this thread into a buffer until the guard drops.
///
/// Tests use the current-thread runtime, so spawned tasks log here too.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
