//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Catalog (rental domain) configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// First administrator account.
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
///
/// When `url` is absent the server keeps all state in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Run pending migrations on startup.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            auto_migrate: default_auto_migrate(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_auto_migrate() -> bool {
    true
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    28800 // one working shift
}

/// Catalog configuration: which rental domain the deployment serves.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Preset name (`equipment`, `cars`, `properties`, `events`, `photography`).
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Currency label overriding the preset's.
    #[serde(default)]
    pub currency: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            currency: None,
        }
    }
}

fn default_preset() -> String {
    "equipment".to_string()
}

/// Administrator created on startup when no account exists yet.
///
/// Nothing is created unless `password` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Sign-in name.
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Display name.
    #[serde(default = "default_admin_name")]
    pub name: String,
    /// Initial password.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            name: default_admin_name(),
            password: None,
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("RENTDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Returns true when a database URL is configured.
    #[must_use]
    pub fn uses_database(&self) -> bool {
        self.database
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
