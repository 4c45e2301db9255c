use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use common::errors::AppError;
use common::models::{AutocompleteRequest, AutocompleteResponse};
use std::sync::Arc;
use tracing::info;

use crate::autocomplete::AutocompleteService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AutocompleteService>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "autocomplete-service" }))
}

/// Boundary validation: the query must not be empty, then hyphens become
/// spaces. Whitespace-only input is passed on and yields no suggestions.
pub fn normalize_query(raw: &str) -> Result<String, AppError> {
    if raw.is_empty() {
        return Err(AppError::validation("Query parameter is required"));
    }
    Ok(raw.replace('-', " "))
}

#[utoipa::path(
    post,
    path = "/api/autocomplete",
    request_body = AutocompleteRequest,
    responses(
        (status = 200, description = "City suggestions for the query", body = AutocompleteResponse),
        (status = 400, description = "Missing or non-string query"),
        (status = 500, description = "Failed to retrieve suggestions")
    ),
    tag = "autocomplete"
)]
pub async fn autocomplete(
    State(state): State<AppState>,
    payload: Result<Json<AutocompleteRequest>, JsonRejection>,
) -> Result<Json<AutocompleteResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        info!(error = %e, "Rejected autocomplete payload");
        AppError::validation("Query must be a string")
    })?;

    let query = normalize_query(&request.query)?;
    info!(query = %query, "Autocomplete request received");

    let response = state.service.get_suggestions(&query).await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query_replaces_hyphens() {
        assert_eq!(normalize_query("Saint-Denis").unwrap(), "Saint Denis");
        assert_eq!(
            normalize_query("Stratford-upon-Avon").unwrap(),
            "Stratford upon Avon"
        );
    }

    #[test]
    fn test_normalize_query_rejects_empty() {
        assert!(matches!(
            normalize_query(""),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_normalize_query_keeps_blank_input() {
        assert_eq!(normalize_query("   ").unwrap(), "   ");
        assert_eq!(normalize_query("-").unwrap(), " ");
    }
}
