use anyhow::Result;
use chrono::Utc;
use contracts::enums::user_role::UserRole;
use contracts::system::users::{CreateUserDto, UpdateUserDto, User};
use sea_orm::DatabaseConnection;

use super::repository;

fn normalize_role(role: &str) -> Result<String> {
    UserRole::from_code(role)
        .map(|r| r.code().to_string())
        .ok_or_else(|| anyhow::anyhow!("Unknown role: {}", role))
}

/// Create a new user
pub async fn create(db: &DatabaseConnection, dto: CreateUserDto) -> Result<String> {
    if dto.username.trim().is_empty() {
        return Err(anyhow::anyhow!("Username cannot be empty"));
    }

    if repository::get_by_username(db, dto.username.trim()).await?.is_some() {
        return Err(anyhow::anyhow!("Username already exists"));
    }

    let now = Utc::now().to_rfc3339();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: dto.username.trim().to_string(),
        full_name: dto.full_name,
        role: normalize_role(&dto.role)?,
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    };

    repository::insert(db, &user).await?;
    tracing::info!("User {} created with role {}", user.username, user.role);

    Ok(user.id)
}

pub async fn update(db: &DatabaseConnection, dto: UpdateUserDto) -> Result<()> {
    let mut user = repository::get_by_id(db, &dto.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found"))?;

    user.full_name = dto.full_name;
    user.role = normalize_role(&dto.role)?;
    user.is_active = dto.is_active;
    user.updated_at = Utc::now().to_rfc3339();

    repository::update(db, &user).await
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    repository::get_by_id(db, id).await
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<User>> {
    repository::list_all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    fn dto(username: &str, role: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.into(),
            full_name: Some("Ana Souza".into()),
            role: role.into(),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_role() {
        let db = test_connection().await;
        let id = create(&db, dto("ana", "Broker_Senior")).await.unwrap();
        let user = get_by_id(&db, &id).await.unwrap().unwrap();
        assert_eq!(user.role, "broker-senior");
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_unknown_roles() {
        let db = test_connection().await;
        create(&db, dto("ana", "manager")).await.unwrap();
        assert!(create(&db, dto("ana", "manager")).await.is_err());
        assert!(create(&db, dto("bia", "admin")).await.is_err());
        assert!(create(&db, dto("  ", "manager")).await.is_err());
    }

    #[tokio::test]
    async fn test_deactivated_user_leaves_active_list() {
        let db = test_connection().await;
        let id = create(&db, dto("ana", "consultant")).await.unwrap();
        update(
            &db,
            UpdateUserDto {
                id: id.clone(),
                full_name: None,
                role: "consultant".into(),
                is_active: false,
            },
        )
        .await
        .unwrap();

        assert!(repository::list_active(&db).await.unwrap().is_empty());
        assert_eq!(list_all(&db).await.unwrap().len(), 1);
    }
}
