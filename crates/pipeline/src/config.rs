use std::path::{Path, PathBuf};

use imgharvest_core::resize::{TARGET_HEIGHT, TARGET_WIDTH};
use imgharvest_search::SearchCredentials;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::cli::Cli;

/// Used for the connection when set and no DB flag is given explicitly.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Errors while assembling a [`HarvestConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load environment file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
}

// ---------------------------------------------------------------------------
// Database settings
// ---------------------------------------------------------------------------

/// Connection parameters for the image database.
#[derive(Clone)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Full connection URL; takes precedence over the fields above.
    /// Only filled in when no DB flag was given on the command line.
    pub database_url: Option<String>,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "images".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            database_url: None,
        }
    }
}

impl DbSettings {
    /// Build sqlx connect options. SSL is always disabled, whatever the
    /// URL's `sslmode` says.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.database_url {
            let options: PgConnectOptions = url.parse()?;
            return Ok(options.ssl_mode(PgSslMode::Disable));
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name)
            .ssl_mode(PgSslMode::Disable);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }

    /// Key/value connection string with the password masked, for logs.
    pub fn dsn_redacted(&self) -> String {
        if self.database_url.is_some() {
            return format!("{DATABASE_URL_VAR}=<redacted>");
        }
        let password = if self.password.is_empty() { "" } else { "***" };
        format!(
            "host={} port={} user={} dbname={} password={password} sslmode=disable",
            self.host, self.port, self.user, self.name
        )
    }
}

impl std::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("dsn", &self.dsn_redacted())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Harvest config
// ---------------------------------------------------------------------------

/// Everything one run needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub query: String,
    pub max_images: usize,
    pub output_dir: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
    pub db: DbSettings,
    pub credentials: SearchCredentials,
}

impl HarvestConfig {
    /// Load the environment file named by `cli`, then assemble the config
    /// from flags and environment.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        load_env_file(&cli.env_file)?;

        let credentials = SearchCredentials::from_env();
        if credentials.is_incomplete() {
            tracing::warn!(
                "Search credentials are incomplete; the search request will be unauthenticated"
            );
        }
        let database_url = std::env::var(DATABASE_URL_VAR).ok();

        Ok(Self::from_parts(cli, credentials, database_url))
    }

    /// Assemble a config without touching the environment.
    ///
    /// Explicit DB flags win over `database_url`; unset flags fall back to
    /// the [`DbSettings`] defaults.
    pub fn from_parts(
        cli: Cli,
        credentials: SearchCredentials,
        database_url: Option<String>,
    ) -> Self {
        let database_url = database_url.filter(|url| !url.trim().is_empty());
        let database_url = match database_url {
            Some(_) if cli.has_db_flags() => {
                tracing::info!("Database flags given, ignoring {DATABASE_URL_VAR}");
                None
            }
            other => other,
        };
        let defaults = DbSettings::default();

        Self {
            query: cli.query,
            max_images: cli.max,
            output_dir: cli.out_dir,
            target_width: TARGET_WIDTH,
            target_height: TARGET_HEIGHT,
            db: DbSettings {
                host: cli.host.unwrap_or(defaults.host),
                port: cli.port.unwrap_or(defaults.port),
                name: cli.name.unwrap_or(defaults.name),
                user: cli.user.unwrap_or(defaults.user),
                password: cli.pass.unwrap_or(defaults.password),
                database_url,
            },
            credentials,
        }
    }
}

/// Load `KEY=value` pairs from `path` into the process environment.
/// Variables that are already set keep their current value.
pub fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Environment file loaded");
    Ok(())
}
