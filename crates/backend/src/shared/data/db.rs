use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Build a `sqlite://` URL that also works for Windows paths (`C:/...`).
pub fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Open the CRM database and keep the connection for the process lifetime.
///
/// Schema is owned by the sqlx migrations (see `migration_runner`).
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };

    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Connecting to database: {}", absolute_path.display());

    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database connection already initialized"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Fresh in-memory database with the CRM schema applied.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    use sea_orm::ConnectionTrait;

    const MIGRATIONS: [&str; 2] = [
        include_str!("../../../../../migrations/0001_crm_schema.sql"),
        include_str!("../../../../../migrations/0002_lead_automation_single_active.sql"),
    ];

    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    // Every pooled connection would otherwise see its own empty database
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite must open");
    for sql in MIGRATIONS {
        conn.execute_unprepared(sql)
            .await
            .expect("schema must apply");
    }
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_unix_path() {
        assert_eq!(
            build_sqlite_url(Path::new("/var/crm/app.db")),
            "sqlite:///var/crm/app.db?mode=rwc"
        );
    }

    #[test]
    fn test_sqlite_url_windows_path() {
        assert_eq!(
            build_sqlite_url(Path::new("C:\\crm\\app.db")),
            "sqlite:///C:/crm/app.db?mode=rwc"
        );
    }
}
