use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_whatsapp_instance::aggregate::{InstanceEvent, WhatsappInstance};

use super::{domain_error_response, ErrorBody};
use crate::domain::a002_whatsapp_instance::service::{self, CreateInstanceDto};
use crate::shared::data::db::get_connection;

/// GET /api/a002/whatsapp_instance
pub async fn list_all() -> Result<Json<Vec<WhatsappInstance>>, (StatusCode, ErrorBody)> {
    service::list_all(get_connection())
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// GET /api/a002/whatsapp_instance/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<WhatsappInstance>, (StatusCode, ErrorBody)> {
    service::get_by_id(get_connection(), &id)
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// POST /api/a002/whatsapp_instance
pub async fn create(
    Json(dto): Json<CreateInstanceDto>,
) -> Result<Json<WhatsappInstance>, (StatusCode, ErrorBody)> {
    service::create(get_connection(), dto)
        .await
        .map(Json)
        .map_err(domain_error_response)
}

/// POST /api/a002/whatsapp_instance/:id/event
///
/// Body: `{"type": "qr_issued", "qr_code": "..."}`
pub async fn apply_event(
    Path(id): Path<String>,
    Json(event): Json<InstanceEvent>,
) -> Result<Json<WhatsappInstance>, (StatusCode, ErrorBody)> {
    service::apply_event(get_connection(), &id, event)
        .await
        .map(Json)
        .map_err(domain_error_response)
}
