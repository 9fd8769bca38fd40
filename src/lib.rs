//! # Portfolio Admin Library
//!
//! Authenticated CRUD backend for a personal portfolio: admins, blog
//! posts, projects, skills, education and work experience.
//!
//! - RESTful JSON API under `/api`, guarded by a session cookie
//! - Document storage in PostgreSQL (JSONB) or in memory
//! - One generic CRUD template shared by every entity
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, the resource binding and the store contract
//! - **Application Layer**: CRUD and authentication services, DTOs
//! - **Infrastructure Layer**: Document stores, migrations, metrics
//! - **Presentation Layer**: HTTP routes, handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! portfolio_admin/
//! +-- config/         Configuration management
//! +-- domain/         Entities, resources, store traits
//! +-- application/    Services and DTOs
//! +-- infrastructure/ Store implementations and metrics
//! +-- presentation/   HTTP routes, handlers, middleware
//! +-- shared/         Errors, object ids, validation, passwords
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
