use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Limits and tolerances for dashboard computations
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_max_window_months")]
    pub max_window_months: u32,
    #[serde(default = "default_trend_epsilon")]
    pub trend_epsilon: f64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_window_months: default_max_window_months(),
            trend_epsilon: default_trend_epsilon(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl DashboardConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_port() -> u16 {
    3000
}

fn default_max_window_months() -> u32 {
    24
}

fn default_trend_epsilon() -> f64 {
    0.01
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/crm.db"

[server]
port = 3000

[dashboard]
max_window_months = 24
trend_epsilon = 0.01
fetch_timeout_secs = 10
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Store the configuration loaded at startup
pub fn init(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already initialized, keeping the first one");
    }
}

/// Configuration loaded at startup, or the embedded default
pub fn current() -> &'static Config {
    CONFIG.get_or_init(|| {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Config {
            database: DatabaseConfig {
                path: "target/db/crm.db".into(),
            },
            server: ServerConfig::default(),
            dashboard: DashboardConfig::default(),
        })
    })
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/crm.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.dashboard.max_window_months, 24);
        assert_eq!(config.dashboard.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[database]\npath = \"crm.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!((config.dashboard.trend_epsilon - 0.01).abs() < f64::EPSILON);
    }
}
