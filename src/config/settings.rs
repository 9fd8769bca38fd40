//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Document store configuration (PostgreSQL, or `memory`)
    pub database: DatabaseSettings,

    /// JWT signing settings
    pub jwt: JwtSettings,

    /// Session cookie settings
    pub session: SessionSettings,

    /// List paging limits
    pub pagination: PaginationSettings,

    /// Account settings
    pub auth: AuthSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL; `memory` selects the in-process store
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Upper bound on a single store call, in seconds
    pub query_timeout_secs: u64,
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Token lifetime in seconds
    pub expiry_seconds: i64,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,

    /// Cookie lifetime in seconds; matches the token lifetime by default
    pub max_age_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    /// Page size used when a request omits `limit`
    pub default_limit: u64,

    /// Largest page size a request may ask for
    pub max_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Whether `POST /api/auth/register` is open
    pub allow_registration: bool,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Secret shipped for local development; never valid in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-secret-change-me-0123456789";

/// `database.url` value selecting the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", MEMORY_DATABASE_URL)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.query_timeout_secs", 10)?
            .set_default("jwt.expiry_seconds", 3600)?
            .set_default("session.cookie_name", "accessToken")?
            .set_default("session.max_age_seconds", 3600)?
            .set_default("pagination.default_limit", 20)?
            .set_default("pagination.max_limit", 100)?
            .set_default("auth.allow_registration", false)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }
        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            return Err(ConfigError::Message(format!(
                "pagination.default_limit must be between 1 and max_limit ({})",
                self.pagination.max_limit
            )));
        }
        if self.is_production() {
            self.validate_production()?;
        }
        Ok(())
    }

    fn validate_production(&self) -> Result<(), ConfigError> {
        if self.jwt.secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::Message(
                "The development JWT secret cannot be used in production; set JWT_SECRET".into(),
            ));
        }
        if self.uses_memory_store() {
            return Err(ConfigError::Message(
                "The in-memory store cannot be used in production; set DATABASE_URL".into(),
            ));
        }
        if self.auth.allow_registration {
            return Err(ConfigError::Message(
                "auth.allow_registration must be false in production".into(),
            ));
        }
        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Whether the in-memory store is selected.
    pub fn uses_memory_store(&self) -> bool {
        self.database.url.eq_ignore_ascii_case(MEMORY_DATABASE_URL)
    }
}

impl DatabaseSettings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl Default for Settings {
    /// Development defaults with the in-memory store.
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 3000,
            },
            database: DatabaseSettings {
                url: MEMORY_DATABASE_URL.into(),
                max_connections: 10,
                min_connections: 2,
                acquire_timeout: 30,
                query_timeout_secs: 10,
            },
            jwt: JwtSettings {
                secret: DEVELOPMENT_JWT_SECRET.into(),
                expiry_seconds: 3600,
            },
            session: SessionSettings {
                cookie_name: "accessToken".into(),
                max_age_seconds: 3600,
            },
            pagination: PaginationSettings {
                default_limit: 20,
                max_limit: 100,
            },
            auth: AuthSettings {
                allow_registration: false,
            },
            cors: CorsSettings {
                allowed_origins: vec!["http://localhost:3000".into()],
            },
            environment: "development".into(),
        }
    }
}
