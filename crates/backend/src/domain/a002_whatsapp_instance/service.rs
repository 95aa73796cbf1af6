use contracts::domain::a002_whatsapp_instance::aggregate::{InstanceEvent, WhatsappInstance};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repository;
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInstanceDto {
    pub name: String,
    pub user_id: String,
}

pub async fn create(db: &DatabaseConnection, dto: CreateInstanceDto) -> DomainResult<WhatsappInstance> {
    let mut instance =
        WhatsappInstance::new_for_insert(dto.name.trim().to_string(), dto.user_id.trim().to_string());
    instance.validate().map_err(DomainError::Validation)?;
    instance.before_write();

    repository::insert(db, &instance).await?;
    tracing::info!("WhatsApp instance '{}' registered ({})", instance.name, instance.id);
    Ok(instance)
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> DomainResult<WhatsappInstance> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| DomainError::Validation(format!("Invalid id '{}': {}", id, e)))?;
    repository::get_by_id(db, &uuid)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("WhatsApp instance {}", id)))
}

pub async fn list_all(db: &DatabaseConnection) -> DomainResult<Vec<WhatsappInstance>> {
    Ok(repository::list_all(db).await?)
}

/// Feed one connection event into the instance state machine and persist the result.
pub async fn apply_event(
    db: &DatabaseConnection,
    id: &str,
    event: InstanceEvent,
) -> DomainResult<WhatsappInstance> {
    let mut instance = get_by_id(db, id).await?;
    let previous = instance.status;

    instance.apply(&event).map_err(DomainError::Conflict)?;

    let expected_version = instance.version;
    instance.before_write();
    if !repository::update(db, &instance, expected_version).await? {
        return Err(DomainError::Conflict(format!(
            "WhatsApp instance {} was modified concurrently",
            instance.id
        )));
    }

    if let InstanceEvent::Fail { reason } = &event {
        tracing::warn!("WhatsApp instance {} failed: {}", instance.id, reason);
    }
    tracing::info!(
        "WhatsApp instance {}: {} --{}--> {}",
        instance.id,
        previous.as_str(),
        event.name(),
        instance.status.as_str()
    );
    Ok(instance)
}
