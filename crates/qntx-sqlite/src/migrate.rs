//! Database migration runner
//!
//! Applies the schema as a small ordered set of embedded SQL migrations,
//! tracked in a `schema_migrations` table so re-opening an existing database
//! is a no-op.

use rusqlite::Connection;

use crate::error::Result;

const MIGRATION_000_SCHEMA_MIGRATIONS: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TEXT NOT NULL
);
";

const MIGRATION_001_ATTESTATIONS: &str = "
CREATE TABLE attestations (
    id TEXT PRIMARY KEY,
    subjects TEXT NOT NULL,
    predicates TEXT NOT NULL,
    contexts TEXT NOT NULL,
    actors TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    source TEXT NOT NULL,
    attributes TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX idx_attestations_timestamp ON attestations (timestamp);
CREATE INDEX idx_attestations_created_at ON attestations (created_at);
";

const MIGRATION_002_ALIASES: &str = "
CREATE TABLE aliases (
    id TEXT PRIMARY KEY,
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX idx_aliases_from ON aliases (from_id);
CREATE INDEX idx_aliases_to ON aliases (to_id);
";

/// Migration files, applied in order. Only includes migrations needed for
/// core attestation and alias storage.
const MIGRATIONS: &[(&str, &str)] = &[
    ("000", MIGRATION_000_SCHEMA_MIGRATIONS),
    ("001", MIGRATION_001_ATTESTATIONS),
    ("002", MIGRATION_002_ALIASES),
];

/// Apply all pending migrations to the database
///
/// Creates the schema_migrations table if it doesn't exist,
/// then applies any migrations that haven't been applied yet.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    for (version, sql) in MIGRATIONS {
        apply_migration(conn, version, sql)?;
    }

    Ok(())
}

/// Apply a single migration if it hasn't been applied yet
fn apply_migration(conn: &Connection, version: &str, sql: &str) -> Result<()> {
    if is_migration_applied(conn, version)? {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    record_migration(&tx, version)?;
    tx.commit()?;

    Ok(())
}

/// Check if a migration has already been applied
fn is_migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let table_exists: bool = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")?
        .exists([])?;

    if !table_exists {
        return Ok(false);
    }

    let exists = conn
        .prepare("SELECT 1 FROM schema_migrations WHERE version = ?")?
        .exists([version])?;

    Ok(exists)
}

/// Record that a migration has been applied
fn record_migration(conn: &Connection, version: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?, CURRENT_TIMESTAMP)",
        [version],
    )?;
    Ok(())
}
