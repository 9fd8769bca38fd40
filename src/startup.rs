//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;

use crate::application::services::{AuthService, AuthServiceImpl, CrudService, CrudSettings};
use crate::config::Settings;
use crate::domain::store::DocumentStore;
use crate::domain::{Admin, Resource};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryDocumentStore, PgDocumentStore};
use crate::presentation::http::handlers::health;
use crate::presentation::http::{routes, SessionCookie};
use crate::presentation::middleware::{cors, logging};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthService>,
    pub session: SessionCookie,
    pub crud_settings: CrudSettings,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire services over an opened store.
    pub fn new(store: Arc<dyn DocumentStore>, settings: Settings) -> Self {
        let crud_settings = CrudSettings::from_settings(&settings);
        let auth = Arc::new(AuthServiceImpl::new(
            store.collection(Admin::COLLECTION),
            settings.jwt.clone(),
            crud_settings.query_timeout,
        ));

        Self {
            store,
            auth,
            session: SessionCookie::from_settings(&settings),
            crud_settings,
            settings: Arc::new(settings),
        }
    }

    /// CRUD service for one resource type.
    pub fn crud<R: Resource>(&self) -> CrudService<R> {
        CrudService::new(self.store.collection(R::COLLECTION), self.crud_settings)
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    store: Arc<dyn DocumentStore>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let store = open_store(&settings).await?;

        health::init_server_start();

        let state = AppState::new(store.clone(), settings.clone());

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr())
            .await
            .with_context(|| format!("Failed to bind {}", settings.server_addr()))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            store,
        })
    }

    /// Run the server until ctrl-c, then close the store
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.store.close().await;
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Open the configured document store.
async fn open_store(settings: &Settings) -> Result<Arc<dyn DocumentStore>> {
    if settings.uses_memory_store() {
        tracing::warn!("Using the in-memory store; data will not survive a restart");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    }

    let pool = database::create_pool(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgDocumentStore::new(pool)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
