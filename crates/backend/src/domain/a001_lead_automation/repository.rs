use anyhow::Result;
use contracts::domain::a001_lead_automation::aggregate::{LeadAutomation, LeadAutomationStatus};
use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryOrder, Set};
use uuid::Uuid;

mod lead_automation {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "lead_automation_configs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub user_id: String,
        pub name: String,
        pub greeting_message: String,
        pub follow_up_message: Option<String>,
        pub follow_up_delay_hours: i32,
        pub max_follow_ups: i32,
        pub status: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use lead_automation::{ActiveModel, Column, Entity};

fn to_aggregate(m: lead_automation::Model) -> Result<LeadAutomation> {
    Ok(LeadAutomation {
        id: Uuid::parse_str(&m.id)?,
        user_id: m.user_id,
        name: m.name,
        greeting_message: m.greeting_message,
        follow_up_message: m.follow_up_message,
        follow_up_delay_hours: m.follow_up_delay_hours.max(0) as u32,
        max_follow_ups: m.max_follow_ups.max(0) as u32,
        status: LeadAutomationStatus::from_str(&m.status).map_err(|e| anyhow::anyhow!(e))?,
        created_at: m.created_at,
        updated_at: m.updated_at,
        version: m.version,
    })
}

fn to_active_model(a: &LeadAutomation) -> ActiveModel {
    ActiveModel {
        id: Set(a.id.to_string()),
        user_id: Set(a.user_id.clone()),
        name: Set(a.name.clone()),
        greeting_message: Set(a.greeting_message.clone()),
        follow_up_message: Set(a.follow_up_message.clone()),
        follow_up_delay_hours: Set(a.follow_up_delay_hours as i32),
        max_follow_ups: Set(a.max_follow_ups as i32),
        status: Set(a.status.as_str().to_string()),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
        version: Set(a.version),
    }
}

pub async fn insert(db: &DatabaseConnection, automation: &LeadAutomation) -> Result<()> {
    Entity::insert(to_active_model(automation)).exec(db).await?;
    Ok(())
}

/// Optimistic update: succeeds only if the stored version is still `expected_version`.
pub async fn update(
    db: &DatabaseConnection,
    automation: &LeadAutomation,
    expected_version: i32,
) -> Result<bool> {
    let result = Entity::update_many()
        .set(to_active_model(automation))
        .filter(Column::Id.eq(automation.id.to_string()))
        .filter(Column::Version.eq(expected_version))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

pub async fn get_by_id(db: &DatabaseConnection, id: &Uuid) -> Result<Option<LeadAutomation>> {
    Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(to_aggregate)
        .transpose()
}

pub async fn list_by_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<LeadAutomation>> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::UpdatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(to_aggregate)
        .collect()
}

pub async fn count_active_for_user(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Status.eq(LeadAutomationStatus::Active.as_str()))
        .count(db)
        .await?)
}
