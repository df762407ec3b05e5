use crate::config::Config;
use anyhow::{Context, Result};
use audiorelay_ytdlp::Extractor;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod limiter;
pub mod relay;
pub mod routes_info;
pub mod routes_stream;

pub use error::ApiError;
pub use limiter::ProcessLimiter;

/// Public endpoints and what they do, as listed by `GET /` and at startup.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("/", "API information"),
    ("/stream/proxy?url=<youtube_url>", "Proxy the audio stream through this server"),
    ("/stream/direct?url=<youtube_url>", "Redirect to the direct audio stream URL"),
    ("/stream-url?url=<youtube_url>", "Return the direct audio stream URL as JSON"),
    ("/version", "yt-dlp version information"),
];

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub extractor: Arc<Extractor>,
    /// Cap on concurrent extractor processes
    pub processes: ProcessLimiter,
}

impl AppContext {
    /// Build the context, locating the extractor from the config.
    pub fn new(config: Config) -> Self {
        let extractor = Extractor::from_options(config.extractor.clone());
        Self::with_extractor(config, extractor)
    }

    pub fn with_extractor(config: Config, extractor: Extractor) -> Self {
        Self {
            processes: ProcessLimiter::new(config.server.max_processes),
            extractor: Arc::new(extractor),
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes_info::info_routes())
        .merge(routes_stream::stream_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve(listener, AppContext::new(config)).await
}

/// Serve on an already bound listener. The listener is released on return.
pub async fn serve(listener: TcpListener, ctx: AppContext) -> Result<()> {
    let addr = listener.local_addr()?;

    tracing::info!("Server is running on http://{}", addr);
    tracing::info!("Extractor: {}", ctx.extractor.program().display());
    tracing::info!("Format selector: {}", ctx.config.extractor.format);
    match ctx.processes.available() {
        Some(n) => tracing::info!("Extractor process limit: {}", n),
        None => tracing::info!("Extractor process limit: unlimited"),
    }
    tracing::info!("Endpoints:");
    for (path, description) in ENDPOINTS {
        tracing::info!("   GET {:<34} - {}", path, description);
    }

    let app = create_router(ctx);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
