use crate::server::error::ApiError;
use crate::server::{AppContext, ENDPOINTS};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};

pub fn info_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(index))
        .route("/version", get(version))
}

async fn index() -> impl IntoResponse {
    let endpoints: Map<String, Value> = ENDPOINTS
        .iter()
        .map(|(path, description)| (path.to_string(), Value::from(*description)))
        .collect();

    Json(serde_json::json!({
        "status": "ok",
        "message": "YouTube Audio Streaming API",
        "endpoints": endpoints,
    }))
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

async fn version(State(ctx): State<AppContext>) -> Result<Json<VersionResponse>, ApiError> {
    let limit = ctx.config.extractor.version_timeout();
    let _permit = ctx
        .processes
        .acquire_within(limit)
        .await
        .map_err(|e| ApiError::Version(e.into()))?;
    let version = ctx
        .extractor
        .version()
        .await
        .map_err(|e| ApiError::Version(e.into()))?;
    Ok(Json(VersionResponse { version }))
}
