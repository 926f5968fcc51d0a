//! SQLite storage backend for QNTX attestations
//!
//! This crate provides a persistent SQLite implementation of the qntx-core storage traits,
//! enabling native platforms (server, desktop) to store attestations on disk.
//!
//! # Features
//!
//! - Implements `AttestationStore` and `QueryStore` traits
//! - Supports in-memory databases for testing
//! - Thread-safe with proper connection handling
//! - Quota enforcement via `BoundedStore` (per-actor-per-context, per-actor, per-entity)
//! - Alias persistence for identifier equivalence
//!
//! # Example: Basic Usage
//!
//! ```rust,no_run
//! use qntx_sqlite::SqliteStore;
//! use qntx_core::{AttestationBuilder, storage::{AttestationStore, QueryStore}, AxFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create an in-memory store
//! let mut store = SqliteStore::in_memory()?;
//!
//! // Create an attestation
//! let attestation = AttestationBuilder::new()
//!     .id("AS-test-1")
//!     .subject("ALICE")
//!     .predicate("knows")
//!     .context("work")
//!     .build();
//!
//! // Store it
//! store.put(attestation)?;
//!
//! // Retrieve it
//! let retrieved = store.get("AS-test-1")?;
//! assert!(retrieved.is_some());
//!
//! // Query with filters
//! let filter = AxFilter {
//!     subjects: vec!["ALICE".to_string()],
//!     ..Default::default()
//! };
//! let results = store.query(&filter)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Bounded Storage with Quotas
//!
//! ```rust,no_run
//! use qntx_sqlite::{BoundedStore, StorageQuotas};
//! use qntx_core::{AttestationBuilder, storage::AttestationStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create store with custom quotas: L_AC, L_AS, L_EA
//! let quotas = StorageQuotas::new(100, 256, 256);
//! let mut store = BoundedStore::in_memory_with_quotas(quotas)?;
//!
//! // Attempts to exceed quotas fail with ErrQuotaActorContexts / ErrQuotaEntityActors,
//! // or trigger oldest-first eviction within a single (actor, context) bucket.
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod bounded;
pub mod error;
pub mod json;
pub mod migrate;
pub mod store;

// Re-export main types
pub use alias::{AliasStore, SqliteAliasStore};
pub use bounded::{BoundedStore, StorageQuotas};
pub use error::{Result, SqliteError};
pub use store::SqliteStore;
