//! Storage error types

use std::fmt;

/// Errors that can occur during storage operations
#[derive(Debug, Clone)]
pub enum StoreError {
    /// Attestation with this ID already exists
    AlreadyExists(String),

    /// Attestation not found
    NotFound(String),

    /// Invalid attestation data
    InvalidData(String),

    /// Storage backend error (database, filesystem, etc.)
    Backend(String),

    /// Query error
    Query(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Actor would exceed its distinct-context quota (`L_AS`). Non-retryable.
    QuotaActorContexts {
        actor: String,
        current: usize,
        limit: usize,
    },

    /// Entity would exceed its distinct-actor quota (`L_EA`). Non-retryable.
    QuotaEntityActors {
        entity: String,
        current: usize,
        limit: usize,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::AlreadyExists(id) => write!(f, "attestation already exists: {}", id),
            StoreError::NotFound(id) => write!(f, "attestation not found: {}", id),
            StoreError::InvalidData(msg) => write!(f, "invalid attestation data: {}", msg),
            StoreError::Backend(msg) => write!(f, "storage backend error: {}", msg),
            StoreError::Query(msg) => write!(f, "query error: {}", msg),
            StoreError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            StoreError::QuotaActorContexts {
                actor,
                current,
                limit,
            } => write!(
                f,
                "actor '{}' would exceed distinct-context quota: {} > {}",
                actor, current, limit
            ),
            StoreError::QuotaEntityActors {
                entity,
                current,
                limit,
            } => write!(
                f,
                "entity '{}' would exceed distinct-actor quota: {} > {}",
                entity, current, limit
            ),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A non-fatal signal that a quota bucket is approaching its limit.
///
/// Returned alongside (never instead of) a successful store operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageWarning {
    pub actor: String,
    pub context: String,
    pub current: usize,
    pub limit: usize,
    /// Estimated milliseconds until the bucket hits `limit`, based on its
    /// recent insertion rate. `None` if the rate can't be estimated yet
    /// (fewer than two inserts observed in the bucket).
    pub estimated_time_to_full_ms: Option<i64>,
}

impl fmt::Display for StorageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "actor '{}' context '{}' at {}/{} capacity",
            self.actor, self.context, self.current, self.limit
        )
    }
}
