//! Document Store Implementations
//!
//! - **InMemoryDocumentStore**: process-local, for tests and `database.url = "memory"`
//! - **PgDocumentStore**: PostgreSQL JSONB table

pub mod memory_store;
pub mod pg_document_store;

pub use memory_store::InMemoryDocumentStore;
pub use pg_document_store::PgDocumentStore;
