//! Error-to-HTTP response conversion.
//!
//! Every handler returns `Result<_, ApiError>`; this is the only place where
//! failures are turned into status codes and bodies. Extractor diagnostics
//! are logged here and never copied into a response.

use crate::server::limiter::SlotTimeout;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failure kinds a request can end in.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The required `url` query parameter was missing or empty.
    #[error("URL parameter is required")]
    MissingUrl,

    /// The extractor ran but could not produce a direct URL.
    #[error("resolution failed: {0}")]
    Resolution(#[source] audiorelay_ytdlp::Error),

    /// The extractor could not be started.
    #[error("launch failed: {0}")]
    Launch(#[source] audiorelay_ytdlp::Error),

    /// The extractor did not finish in time.
    #[error("timed out: {0}")]
    Timeout(#[source] audiorelay_ytdlp::Error),

    /// Every extractor slot stayed busy past the deadline.
    #[error("server busy: {0}")]
    Busy(#[from] SlotTimeout),

    /// The proxied response could not be set up.
    #[error("stream setup failed: {0}")]
    Stream(String),

    /// The resolved URL cannot be used as a `Location` header.
    #[error("resolved URL is not a valid Location header")]
    InvalidLocation,

    /// The version query failed for any reason.
    #[error("version query failed: {0}")]
    Version(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingUrl => "URL parameter is required",
            Self::Version(_) => "Failed to get version",
            _ => "Internal server error",
        }
    }
}

impl From<audiorelay_ytdlp::Error> for ApiError {
    fn from(e: audiorelay_ytdlp::Error) -> Self {
        match e {
            e if e.is_launch_failure() => Self::Launch(e),
            e @ audiorelay_ytdlp::Error::Timeout { .. } => Self::Timeout(e),
            e => Self::Resolution(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = json!({ "error": self.public_message() });

        (status, Json(body)).into_response()
    }
}
