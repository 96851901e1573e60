/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (a `.env` file is honored in
/// development).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `STORE`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required when `STORE=postgres`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_CONNECT_TIMEOUT_SECONDS`: Pool acquire timeout (default: 30)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `BOOTSTRAP_ORG_NAME`, `BOOTSTRAP_ADMIN_EMAIL`, `BOOTSTRAP_ADMIN_USERNAME`,
///   `BOOTSTRAP_ADMIN_PASSWORD`: first admin for an empty directory (all four or none)
/// - `LISTING_REQUIRES_API_KEY`: `true` to authenticate and scope the listing routes (default: false)
/// - `RUST_LOG`: Log filter (default: `userdir_api=debug,userdir_shared=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use userdir_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;

use anyhow::Context;
use userdir_shared::directory::BootstrapAdmin;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    pub store: StoreBackend,

    /// Present whenever `store` is `Postgres`
    pub database: Option<DatabaseConfig>,

    pub log_format: LogFormat,

    pub bootstrap: Option<BootstrapAdmin>,

    /// Listing routes require an admin or org_admin key
    pub listing_requires_api_key: bool,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// `["*"]` allows any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,

    pub connect_timeout_seconds: u64,
}

/// Which `UserStore` implementation backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("STORE must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing while `STORE=postgres`
    /// - A numeric or enumerated variable has an invalid value
    /// - Only some of the `BOOTSTRAP_*` variables are set
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 8080u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let store = parse_or(&lookup, "STORE", StoreBackend::Postgres)?;

        let database = match store {
            StoreBackend::Postgres => Some(DatabaseConfig {
                url: lookup("DATABASE_URL")
                    .context("DATABASE_URL environment variable is required when STORE=postgres")?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?,
                connect_timeout_seconds: parse_or(&lookup, "DATABASE_CONNECT_TIMEOUT_SECONDS", 30u64)?,
            }),
            StoreBackend::Memory => None,
        };

        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;
        let bootstrap = bootstrap_from(&lookup)?;
        let listing_requires_api_key = parse_or(&lookup, "LISTING_REQUIRES_API_KEY", false)?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            store,
            database,
            log_format,
            bootstrap,
            listing_requires_api_key,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether every origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}

fn bootstrap_from<F>(lookup: &F) -> anyhow::Result<Option<BootstrapAdmin>>
where
    F: Fn(&str) -> Option<String>,
{
    let org_name = lookup("BOOTSTRAP_ORG_NAME");
    let email = lookup("BOOTSTRAP_ADMIN_EMAIL");
    let username = lookup("BOOTSTRAP_ADMIN_USERNAME");
    let password = lookup("BOOTSTRAP_ADMIN_PASSWORD");

    match (org_name, email, username, password) {
        (Some(org_name), Some(email), Some(username), Some(password)) => Ok(Some(BootstrapAdmin {
            org_name,
            email,
            username,
            password,
        })),
        (None, None, None, None) => Ok(None),
        _ => anyhow::bail!(
            "BOOTSTRAP_ORG_NAME, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_USERNAME and \
             BOOTSTRAP_ADMIN_PASSWORD must be set together"
        ),
    }
}
