use anyhow::{Context, Result};
use contracts::system::users::User;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, QueryResult, Statement};

const USER_COLUMNS: &str = "id, username, full_name, role, is_active, created_at, updated_at";

fn user_from_row(row: &QueryResult) -> Result<User> {
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        full_name: row.try_get("", "full_name")?,
        role: row.try_get("", "role")?,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
    })
}

pub async fn insert(db: &DatabaseConnection, user: &User) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_users (id, username, full_name, role, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.username.clone().into(),
            user.full_name.clone().into(),
            user.role.clone().into(),
            (if user.is_active { 1 } else { 0 }).into(),
            user.created_at.clone().into(),
            user.updated_at.clone().into(),
        ],
    ))
    .await
    .context("Failed to insert user")?;

    Ok(())
}

pub async fn update(db: &DatabaseConnection, user: &User) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users SET full_name = ?, role = ?, is_active = ?, updated_at = ? WHERE id = ?",
        [
            user.full_name.clone().into(),
            user.role.clone().into(),
            (if user.is_active { 1 } else { 0 }).into(),
            user.updated_at.clone().into(),
            user.id.clone().into(),
        ],
    ))
    .await
    .context("Failed to update user")?;

    Ok(())
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {USER_COLUMNS} FROM sys_users WHERE id = ?"),
            [id.into()],
        ))
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn get_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<User>> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {USER_COLUMNS} FROM sys_users WHERE username = ?"),
            [username.into()],
        ))
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<User>> {
    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT {USER_COLUMNS} FROM sys_users ORDER BY username"),
        ))
        .await?;

    rows.iter().map(user_from_row).collect()
}

/// Users counted in team averages
pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<User>> {
    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT {USER_COLUMNS} FROM sys_users WHERE is_active = 1 ORDER BY username"),
        ))
        .await?;

    rows.iter().map(user_from_row).collect()
}
