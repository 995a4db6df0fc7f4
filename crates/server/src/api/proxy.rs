//! Image relay handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;

use mangashelf_core::{ProxyError, UpstreamImage};

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// GET /proxy-image?url=...
///
/// Stream an upstream image through, keeping its status, content type and
/// length.
pub async fn proxy_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
) -> Response {
    let url = match params.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return (StatusCode::BAD_REQUEST, "Missing Url").into_response(),
    };

    match state.proxy().fetch(&url).await {
        Ok(upstream) => relay(upstream),
        Err(ProxyError::InvalidUrl(reason)) => {
            (StatusCode::BAD_REQUEST, format!("Invalid Url: {}", reason)).into_response()
        }
        Err(e) => {
            error!(url = %url, error = %e, "Image relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn relay(upstream: UpstreamImage) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut builder = Response::builder().status(status);
    if let Some(content_type) = &upstream.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
    }
    if let Some(length) = upstream.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(upstream.into_stream()))
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to build relay response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
