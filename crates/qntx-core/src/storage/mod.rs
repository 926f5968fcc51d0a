//! Storage abstraction for attestations
//!
//! This module defines the `AttestationStore` trait that abstracts over different
//! storage backends. Implementations exist for:
//!
//! - **Memory**: In-memory storage for testing and the WASM bridge (`MemoryStore`)
//! - **SQLite**: Native SQLite via rusqlite (`qntx-sqlite` crate, native only)
//!
//! # Example
//!
//! ```rust
//! use qntx_core::storage::{AttestationStore, MemoryStore};
//! use qntx_core::attestation::AttestationBuilder;
//!
//! let mut store = MemoryStore::new();
//!
//! let attestation = AttestationBuilder::new()
//!     .id("AS-test-123")
//!     .subject("ALICE")
//!     .predicate("knows")
//!     .context("work")
//!     .actor("human:bob")
//!     .build();
//!
//! store.put(attestation).unwrap();
//! let retrieved = store.get("AS-test-123").unwrap();
//! assert!(retrieved.is_some());
//! ```
//!
//! # Backend Crates
//!
//! - `qntx-sqlite`: SQLite backend for native platforms (desktop, server)
//! - `MemoryStore` below: in-process backend for tests and the WASM bridge,
//!   where persistence is the embedding host's responsibility

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StorageWarning};
pub use memory::MemoryStore;
pub use traits::{AttestationStore, QueryStore, StorageStats};
