use crate::server::error::ApiError;
use crate::server::relay::relay_body;
use crate::server::AppContext;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

/// Content type announced for proxied media. The extractor picks the actual
/// container; with the default format selector this is almost always WebM.
const PROXY_CONTENT_TYPE: &str = "audio/webm";

pub fn stream_routes() -> Router<AppContext> {
    Router::new()
        .route("/stream/direct", get(stream_direct))
        .route("/stream/proxy", get(stream_proxy))
        .route("/stream-url", get(stream_url))
}

/// The source URL from the `url` query parameter.
///
/// The first `url` value wins and later duplicates are ignored. A missing,
/// empty or unparseable query is rejected as [`ApiError::MissingUrl`].
#[derive(Debug)]
pub struct SourceUrl(pub String);

impl SourceUrl {
    fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, ApiError> {
        pairs
            .into_iter()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value)
            .filter(|u| !u.is_empty())
            .map(Self)
            .ok_or(ApiError::MissingUrl)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SourceUrl
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|_| ApiError::MissingUrl)?;
        Self::from_pairs(pairs)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamUrlResponse {
    pub stream_url: String,
    pub original_url: String,
}

async fn resolve(ctx: &AppContext, source: &str) -> Result<String, ApiError> {
    let _permit = ctx
        .processes
        .acquire_within(ctx.config.extractor.resolve_timeout())
        .await?;
    Ok(ctx.extractor.resolve_url(source).await?)
}

async fn stream_direct(
    State(ctx): State<AppContext>,
    SourceUrl(source): SourceUrl,
) -> Result<Response, ApiError> {
    let direct = resolve(&ctx, &source).await?;

    let location = HeaderValue::try_from(direct).map_err(|_| ApiError::InvalidLocation)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

async fn stream_proxy(
    State(ctx): State<AppContext>,
    SourceUrl(source): SourceUrl,
) -> Result<Response, ApiError> {
    let permit = ctx
        .processes
        .acquire_within(ctx.config.extractor.resolve_timeout())
        .await?;
    let process = ctx.extractor.spawn_stream(&source)?;
    tracing::info!(url = %source, "Proxying extractor output");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PROXY_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(relay_body(process, source, permit))
        .map_err(|e| ApiError::Stream(e.to_string()))
}

async fn stream_url(
    State(ctx): State<AppContext>,
    SourceUrl(source): SourceUrl,
) -> Result<Json<StreamUrlResponse>, ApiError> {
    let direct = resolve(&ctx, &source).await?;

    Ok(Json(StreamUrlResponse {
        stream_url: direct,
        original_url: source,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_url_counts_as_missing() {
        let result = SourceUrl::from_pairs(pairs(&[("url", "")]));
        assert!(matches!(result, Err(ApiError::MissingUrl)));
    }

    #[test]
    fn other_parameters_do_not_count() {
        let result = SourceUrl::from_pairs(pairs(&[("u", "https://youtu.be/x")]));
        assert!(matches!(result, Err(ApiError::MissingUrl)));
    }

    #[test]
    fn first_url_wins() {
        let source = SourceUrl::from_pairs(pairs(&[
            ("t", "1"),
            ("url", "https://youtu.be/a"),
            ("url", "https://youtu.be/b"),
        ]))
        .unwrap();
        assert_eq!(source.0, "https://youtu.be/a");
    }

    #[test]
    fn url_is_kept_verbatim() {
        let source = SourceUrl::from_pairs(pairs(&[("url", " https://youtu.be/x?t=1 ")])).unwrap();
        assert_eq!(source.0, " https://youtu.be/x?t=1 ");
    }

    #[test]
    fn stream_url_response_uses_camel_case() {
        let json = serde_json::to_value(StreamUrlResponse {
            stream_url: "https://cdn.example/a".into(),
            original_url: "https://youtu.be/x".into(),
        })
        .unwrap();
        assert_eq!(json["streamUrl"], "https://cdn.example/a");
        assert_eq!(json["originalUrl"], "https://youtu.be/x");
    }
}
