use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::domain::error::DomainError;

// Aggregate handlers
pub mod a001_lead_automation;
pub mod a002_whatsapp_instance;

// Dashboards
pub mod d100_sales_funnel;

pub mod indicators;

pub type ErrorBody = Json<serde_json::Value>;

/// `{"error": "..."}` with the status matching the failure kind
pub fn domain_error_response(e: DomainError) -> (StatusCode, ErrorBody) {
    let status = match &e {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {}", e);
    } else {
        tracing::warn!("Request rejected: {}", e);
    }
    (status, Json(json!({"error": e.to_string()})))
}
