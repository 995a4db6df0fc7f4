//! Catalog listing and search handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;

use mangashelf_core::{ListingQuery, Manga};

use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

/// Query parameters for the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Stored column to sort by, or `Artist`
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`
    pub order: Option<String>,
    /// Comma-separated language codes
    pub language: Option<String>,
}

/// Query parameters for the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
///
/// List up to the configured page size of items, enriched with tags and artists.
pub async fn list_manga(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Manga>>, Response> {
    let query = ListingQuery::from_params(
        params.sort_by.as_deref(),
        params.order.as_deref(),
        params.language.as_deref(),
    );

    match state.catalog().list(&query).await {
        Ok(manga) => Ok(Json(manga)),
        Err(e) => {
            error!(error = %e, "Listing failed");
            Err(internal_error(e.to_string()))
        }
    }
}

/// GET /search?q=...
///
/// Run a field-scoped search (`tag:"a%b" artist:x title words`).
pub async fn search_manga(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Manga>>, Response> {
    let query = match params.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err((StatusCode::BAD_REQUEST, "Missing query").into_response()),
    };

    match state.catalog().search(&query).await {
        Ok(manga) => Ok(Json(manga)),
        Err(e) => {
            error!(query = %query, error = %e, "Search failed");
            Err(internal_error(e.to_string()))
        }
    }
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}
