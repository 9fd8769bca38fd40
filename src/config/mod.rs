//! # Configuration Module
//!
//! Application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portfolio_admin::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Server will listen on {}", settings.server_addr());
//! ```

mod settings;

pub use settings::*;
