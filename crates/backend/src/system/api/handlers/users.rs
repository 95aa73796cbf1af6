use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::system::users::{CreateUserDto, UpdateUserDto, User};

use crate::shared::data::db::get_connection;
use crate::system::users::service;

/// GET /api/system/users
pub async fn list() -> Result<Json<Vec<User>>, StatusCode> {
    let users = service::list_all(get_connection()).await.map_err(|e| {
        tracing::error!("Failed to list users: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(users))
}

/// GET /api/system/users/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<User>, StatusCode> {
    let user = service::get_by_id(get_connection(), &id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user))
}

/// POST /api/system/users
pub async fn create(Json(dto): Json<CreateUserDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let user_id = service::create(get_connection(), dto).await.map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    Ok(Json(serde_json::json!({"id": user_id})))
}

/// PUT /api/system/users/:id
pub async fn update(
    Path(id): Path<String>,
    Json(mut dto): Json<UpdateUserDto>,
) -> Result<StatusCode, StatusCode> {
    dto.id = id;

    service::update(get_connection(), dto).await.map_err(|e| {
        tracing::error!("Failed to update user: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    Ok(StatusCode::OK)
}
