use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_lead_automation::aggregate::LeadAutomation;
use serde::Deserialize;

use super::{domain_error_response, ErrorBody};
use crate::domain::a001_lead_automation::service::{self, LeadAutomationDto};
use crate::shared::data::db::get_connection;

#[derive(Deserialize)]
pub struct LeadAutomationListParams {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

/// GET /api/a001/lead_automation?user_id=...
pub async fn list_by_user(
    Query(params): Query<LeadAutomationListParams>,
) -> Result<Json<Vec<LeadAutomation>>, (StatusCode, ErrorBody)> {
    service::list_by_user(get_connection(), &params.user_id)
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// GET /api/a001/lead_automation/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<LeadAutomation>, (StatusCode, ErrorBody)> {
    service::get_by_id(get_connection(), &id)
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// POST /api/a001/lead_automation
pub async fn create(
    Json(dto): Json<LeadAutomationDto>,
) -> Result<Json<LeadAutomation>, (StatusCode, ErrorBody)> {
    service::create(get_connection(), dto)
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// PUT /api/a001/lead_automation/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<LeadAutomationDto>,
) -> Result<Json<LeadAutomation>, (StatusCode, ErrorBody)> {
    service::update(get_connection(), &id, dto)
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// POST /api/a001/lead_automation/:id/transition
pub async fn transition(
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<LeadAutomation>, (StatusCode, ErrorBody)> {
    service::transition(get_connection(), &id, &req.status)
        .await
        .map(Json)
        .map_err(domain_error_response)
}
