use contracts::domain::a001_lead_automation::aggregate::{LeadAutomation, LeadAutomationStatus};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repository;
use crate::domain::error::{DomainError, DomainResult};

/// DTO for creating/updating a lead automation through the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadAutomationDto {
    pub user_id: String,
    pub name: String,
    pub greeting_message: String,
    pub follow_up_message: Option<String>,
    pub follow_up_delay_hours: Option<u32>,
    pub max_follow_ups: Option<u32>,
}

fn apply_dto(automation: &mut LeadAutomation, dto: LeadAutomationDto) {
    automation.name = dto.name.trim().to_string();
    automation.greeting_message = dto.greeting_message;
    automation.follow_up_message = dto.follow_up_message;
    if let Some(delay) = dto.follow_up_delay_hours {
        automation.follow_up_delay_hours = delay;
    }
    if let Some(max) = dto.max_follow_ups {
        automation.max_follow_ups = max;
    }
}

fn parse_id(id: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| DomainError::Validation(format!("Invalid id '{}': {}", id, e)))
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<DbErr>().and_then(DbErr::sql_err),
        Some(SqlErr::UniqueConstraintViolation(_))
    )
}

/// Optimistic write. The partial unique index on active automations is the
/// final word on the one-active-per-user rule.
async fn save(
    db: &DatabaseConnection,
    automation: &mut LeadAutomation,
) -> DomainResult<()> {
    let expected_version = automation.version;
    automation.before_write();
    match repository::update(db, automation, expected_version).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(DomainError::Conflict(format!(
            "Lead automation {} was modified concurrently",
            automation.id
        ))),
        Err(e) if is_unique_violation(&e) => Err(DomainError::Conflict(format!(
            "User {} already has an active lead automation",
            automation.user_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Create a new automation in `Draft`
pub async fn create(db: &DatabaseConnection, dto: LeadAutomationDto) -> DomainResult<LeadAutomation> {
    let mut automation = LeadAutomation::new_for_insert(
        dto.user_id.trim().to_string(),
        String::new(),
        String::new(),
    );
    apply_dto(&mut automation, dto);
    automation.validate().map_err(DomainError::Validation)?;
    automation.before_write();

    repository::insert(db, &automation).await?;
    tracing::info!(
        "Lead automation {} created for user {}",
        automation.id,
        automation.user_id
    );
    Ok(automation)
}

/// Edit the configuration; archived automations are read-only.
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    dto: LeadAutomationDto,
) -> DomainResult<LeadAutomation> {
    let mut automation = get_by_id(db, id).await?;
    if !automation.is_editable() {
        return Err(DomainError::Conflict(
            "Archived lead automation cannot be edited".into(),
        ));
    }
    if dto.user_id.trim() != automation.user_id {
        return Err(DomainError::Validation("user_id cannot be changed".into()));
    }

    apply_dto(&mut automation, dto);
    automation.validate().map_err(DomainError::Validation)?;
    save(db, &mut automation).await?;
    Ok(automation)
}

/// Move to another lifecycle status. A user has at most one active automation.
pub async fn transition(
    db: &DatabaseConnection,
    id: &str,
    status: &str,
) -> DomainResult<LeadAutomation> {
    let next = LeadAutomationStatus::from_str(status).map_err(DomainError::Validation)?;
    let mut automation = get_by_id(db, id).await?;
    let previous = automation.status;

    if next == LeadAutomationStatus::Active
        && repository::count_active_for_user(db, &automation.user_id).await? > 0
    {
        return Err(DomainError::Conflict(format!(
            "User {} already has an active lead automation",
            automation.user_id
        )));
    }

    automation.transition_to(next).map_err(DomainError::Conflict)?;
    save(db, &mut automation).await?;

    tracing::info!(
        "Lead automation {}: {} -> {}",
        automation.id,
        previous.as_str(),
        next.as_str()
    );
    Ok(automation)
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> DomainResult<LeadAutomation> {
    let uuid = parse_id(id)?;
    repository::get_by_id(db, &uuid)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Lead automation {}", id)))
}

pub async fn list_by_user(db: &DatabaseConnection, user_id: &str) -> DomainResult<Vec<LeadAutomation>> {
    Ok(repository::list_by_user(db, user_id).await?)
}
