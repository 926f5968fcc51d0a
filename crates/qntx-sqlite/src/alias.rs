//! Identifier alias storage
//!
//! An alias is a bidirectional equivalence between two identifiers, tagged
//! with who created it and when. Resolution is one-hop: `resolve(x)` returns
//! `{x}` plus every identifier directly aliased to `x` — it does not follow
//! chains (`a~b`, `b~c` does not make `a` resolve to `c`).

use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::Result;
use crate::json::timestamp_to_sql;

/// A single alias edge, as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub created_by: String,
    pub created_at: i64,
}

/// Storage for alias edges, independent of the attestation table.
pub trait AliasStore {
    /// Record a bidirectional alias between `from_id` and `to_id`.
    fn create(&mut self, id: &str, from_id: &str, to_id: &str, created_by: &str, created_at: i64) -> Result<()>;

    /// One-hop resolution: `{x} ∪ {y : alias(x, y) exists in either direction}`.
    fn resolve(&self, id: &str) -> Result<HashSet<String>>;

    /// All alias edges, in creation order.
    fn all(&self) -> Result<Vec<Alias>>;
}

/// SQLite-backed alias store sharing a connection with [`crate::SqliteStore`].
pub struct SqliteAliasStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAliasStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AliasStore for SqliteAliasStore<'_> {
    fn create(
        &mut self,
        id: &str,
        from_id: &str,
        to_id: &str,
        created_by: &str,
        created_at: i64,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO aliases (id, from_id, to_id, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![id, from_id, to_id, created_by, timestamp_to_sql(created_at)],
        )?;
        Ok(())
    }

    fn resolve(&self, id: &str) -> Result<HashSet<String>> {
        let mut set = HashSet::new();
        set.insert(id.to_string());

        let mut stmt = self
            .conn
            .prepare("SELECT from_id, to_id FROM aliases WHERE from_id = ?1 OR to_id = ?1")?;
        let rows = stmt.query_map([id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (from_id, to_id) = row?;
            set.insert(from_id);
            set.insert(to_id);
        }

        Ok(set)
    }

    fn all(&self) -> Result<Vec<Alias>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, from_id, to_id, created_by, created_at FROM aliases ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut aliases = Vec::new();
        for row in rows {
            let (id, from_id, to_id, created_by, created_at_sql) = row?;
            let created_at = crate::json::sql_to_timestamp(&created_at_sql)?;
            aliases.push(Alias {
                id,
                from_id,
                to_id,
                created_by,
                created_at,
            });
        }
        Ok(aliases)
    }
}
