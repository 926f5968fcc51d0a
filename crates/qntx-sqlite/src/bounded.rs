//! Bounded storage wrapper enforcing per-actor-per-context, per-actor, and
//! per-entity quotas.
//!
//! Before each insert, with effective limits `(l_ac, l_as, l_ea)`:
//!
//! 1. For every `(actor, context)` pair on the new attestation: if the
//!    bucket is already at `l_ac`, the single oldest row in that bucket
//!    (by `timestamp`, tie-break `created_at` then `id`) is evicted,
//!    atomically with the insert.
//! 2. For every actor: if the number of distinct contexts recorded for that
//!    actor would exceed `l_as` after insert, reject with
//!    `QuotaActorContexts`.
//! 3. For every subject (entity): if the number of distinct actors claiming
//!    about it would exceed `l_ea`, reject with `QuotaEntityActors`.
//!
//! Quota rejections are non-retryable and never evict; eviction never
//! rejects. The store also reports predictive warnings (not errors) when a
//! bucket reaches 80% of `l_ac`.

use std::collections::HashSet;

use qntx_core::{
    attestation::{Attestation, AxFilter, AxResult},
    storage::{AttestationStore, QueryStore, StorageStats, StorageWarning, StoreError},
};

use crate::SqliteStore;

type StoreResult<T> = Result<T, StoreError>;

const DEFAULT_L_AC: usize = 16;
const DEFAULT_L_AS: usize = 64;
const DEFAULT_L_EA: usize = 64;
const WARNING_FILL_RATIO: f64 = 0.8;

/// Storage quotas configuration. A value of `0` for any field means
/// "use the default" (16/64/64), matching the spec's "any limit ≤ 0 is
/// replaced by its default" rule.
#[derive(Debug, Clone, Copy)]
pub struct StorageQuotas {
    /// Max attestations per (actor, context) bucket. Default 16.
    pub l_ac: usize,
    /// Max distinct contexts per actor. Default 64.
    pub l_as: usize,
    /// Max distinct actors per entity (subject). Default 64.
    pub l_ea: usize,
}

impl Default for StorageQuotas {
    fn default() -> Self {
        Self {
            l_ac: DEFAULT_L_AC,
            l_as: DEFAULT_L_AS,
            l_ea: DEFAULT_L_EA,
        }
    }
}

impl StorageQuotas {
    pub fn new(l_ac: usize, l_as: usize, l_ea: usize) -> Self {
        Self { l_ac, l_as, l_ea }
    }

    /// Standard tier quotas (16/64/64)
    pub fn standard() -> Self {
        Self::default()
    }

    /// Unlimited quotas (for testing)
    pub fn unlimited() -> Self {
        Self {
            l_ac: usize::MAX,
            l_as: usize::MAX,
            l_ea: usize::MAX,
        }
    }

    fn effective(&self) -> (usize, usize, usize) {
        (
            if self.l_ac == 0 { DEFAULT_L_AC } else { self.l_ac },
            if self.l_as == 0 { DEFAULT_L_AS } else { self.l_as },
            if self.l_ea == 0 { DEFAULT_L_EA } else { self.l_ea },
        )
    }
}

/// Bounded storage wrapper enforcing quotas
pub struct BoundedStore {
    store: SqliteStore,
    quotas: StorageQuotas,
}

impl BoundedStore {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store,
            quotas: StorageQuotas::default(),
        }
    }

    pub fn with_quotas(store: SqliteStore, quotas: StorageQuotas) -> Self {
        Self { store, quotas }
    }

    pub fn in_memory() -> crate::error::Result<Self> {
        Ok(Self::new(SqliteStore::in_memory()?))
    }

    pub fn in_memory_with_quotas(quotas: StorageQuotas) -> crate::error::Result<Self> {
        Ok(Self::with_quotas(SqliteStore::in_memory()?, quotas))
    }

    pub fn quotas(&self) -> &StorageQuotas {
        &self.quotas
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Put an attestation, returning any predictive storage warnings
    /// (never a substitute for the success/error result itself).
    pub fn put_checked(&mut self, attestation: Attestation) -> StoreResult<Vec<StorageWarning>> {
        let (l_ac, l_as, l_ea) = self.quotas.effective();

        // Rule 2: distinct-context quota per actor (reject, no eviction).
        for actor in &attestation.actors {
            let existing_contexts = self.distinct_contexts_for_actor(actor)?;
            let new_contexts: HashSet<&String> = attestation
                .contexts
                .iter()
                .filter(|c| !existing_contexts.contains(*c))
                .collect();
            let projected = existing_contexts.len() + new_contexts.len();
            if projected > l_as {
                return Err(StoreError::QuotaActorContexts {
                    actor: actor.clone(),
                    current: existing_contexts.len(),
                    limit: l_as,
                });
            }
        }

        // Rule 3: distinct-actor quota per entity (reject, no eviction).
        for subject in &attestation.subjects {
            let existing_actors = self.distinct_actors_for_entity(subject)?;
            let new_actors: HashSet<&String> = attestation
                .actors
                .iter()
                .filter(|a| !existing_actors.contains(*a))
                .collect();
            let projected = existing_actors.len() + new_actors.len();
            if projected > l_ea {
                return Err(StoreError::QuotaEntityActors {
                    entity: subject.clone(),
                    current: existing_actors.len(),
                    limit: l_ea,
                });
            }
        }

        // Rule 1: per-(actor, context) bucket eviction.
        let mut evict_ids: HashSet<String> = HashSet::new();
        for actor in &attestation.actors {
            for context in &attestation.contexts {
                let bucket = self.bucket_rows(actor, context)?;
                if bucket.len() >= l_ac {
                    if let Some(oldest) = bucket.first() {
                        evict_ids.insert(oldest.id.clone());
                    }
                }
            }
        }

        let evict_ids: Vec<String> = evict_ids.into_iter().collect();
        self.store
            .put_with_eviction(attestation.clone(), &evict_ids)?;

        // Predictive warnings (post-insert fill ratio).
        let mut warnings = Vec::new();
        for actor in &attestation.actors {
            for context in &attestation.contexts {
                let bucket = self.bucket_rows(actor, context)?;
                let current = bucket.len();
                if current as f64 >= l_ac as f64 * WARNING_FILL_RATIO {
                    warnings.push(StorageWarning {
                        actor: actor.clone(),
                        context: context.clone(),
                        current,
                        limit: l_ac,
                        estimated_time_to_full_ms: estimate_time_to_full(&bucket, current, l_ac),
                    });
                }
            }
        }

        Ok(warnings)
    }

    /// Rows in the (actor, context) bucket, oldest first (timestamp, then
    /// created_at, then id — matching the eviction tie-break rule).
    fn bucket_rows(&self, actor: &str, context: &str) -> StoreResult<Vec<BucketRow>> {
        let conn = self.store.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, created_at FROM attestations
                 WHERE EXISTS (SELECT 1 FROM json_each(actors) WHERE value = ?1)
                   AND EXISTS (SELECT 1 FROM json_each(contexts) WHERE value = ?2)
                 ORDER BY timestamp ASC, created_at ASC, id ASC",
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params![actor, context], |row| {
                Ok(BucketRow {
                    id: row.get(0)?,
                    created_at_sql: row.get(2)?,
                })
            })
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .collect::<Result<Vec<_>, rusqlite::Error>>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows)
    }

    fn distinct_contexts_for_actor(&self, actor: &str) -> StoreResult<HashSet<String>> {
        let conn = self.store.connection();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT c.value FROM attestations a, json_each(a.contexts) c
                 WHERE EXISTS (SELECT 1 FROM json_each(a.actors) WHERE value = ?1)",
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let contexts = stmt
            .query_map([actor], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .collect::<Result<HashSet<String>, rusqlite::Error>>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(contexts)
    }

    fn distinct_actors_for_entity(&self, subject: &str) -> StoreResult<HashSet<String>> {
        let conn = self.store.connection();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT a.value FROM attestations t, json_each(t.actors) a
                 WHERE EXISTS (SELECT 1 FROM json_each(t.subjects) WHERE value = ?1)",
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let actors = stmt
            .query_map([subject], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .collect::<Result<HashSet<String>, rusqlite::Error>>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(actors)
    }
}

struct BucketRow {
    id: String,
    created_at_sql: String,
}

/// Estimate milliseconds until a bucket hits `limit`, from the average
/// interval between the bucket's existing inserts (a rolling window over
/// the bucket's own history). `None` when fewer than two inserts exist.
fn estimate_time_to_full(bucket: &[BucketRow], current: usize, limit: usize) -> Option<i64> {
    if bucket.len() < 2 || current >= limit {
        return None;
    }

    let first = crate::json::sql_to_timestamp(&bucket.first()?.created_at_sql).ok()?;
    let last = crate::json::sql_to_timestamp(&bucket.last()?.created_at_sql).ok()?;
    let span = last - first;
    let intervals = (bucket.len() - 1) as i64;
    if span <= 0 || intervals <= 0 {
        return None;
    }

    let avg_interval = span / intervals;
    let remaining = (limit - current) as i64;
    Some(avg_interval * remaining)
}

impl AttestationStore for BoundedStore {
    fn put(&mut self, attestation: Attestation) -> StoreResult<()> {
        self.put_checked(attestation)?;
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Attestation>> {
        self.store.get(id)
    }

    fn delete(&mut self, id: &str) -> StoreResult<bool> {
        self.store.delete(id)
    }

    fn update(&mut self, attestation: Attestation) -> StoreResult<()> {
        self.store.update(attestation)
    }

    fn ids(&self) -> StoreResult<Vec<String>> {
        self.store.ids()
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.store.clear()
    }
}

impl QueryStore for BoundedStore {
    fn query(&self, filter: &AxFilter) -> StoreResult<AxResult> {
        self.store.query(filter)
    }

    fn predicates(&self) -> StoreResult<Vec<String>> {
        self.store.predicates()
    }

    fn contexts(&self) -> StoreResult<Vec<String>> {
        self.store.contexts()
    }

    fn subjects(&self) -> StoreResult<Vec<String>> {
        self.store.subjects()
    }

    fn actors(&self) -> StoreResult<Vec<String>> {
        self.store.actors()
    }

    fn stats(&self) -> StoreResult<StorageStats> {
        self.store.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qntx_core::AttestationBuilder;

    fn attestation(id: &str, subject: &str, predicate: &str, context: &str, actor: &str, ts: i64) -> Attestation {
        AttestationBuilder::new()
            .id(id)
            .subject(subject)
            .predicate(predicate)
            .context(context)
            .actor(actor)
            .timestamp(ts)
            .source("test")
            .build()
    }

    #[test]
    fn put_within_quota_succeeds() {
        let mut store = BoundedStore::in_memory().unwrap();
        store
            .put(attestation("AS-1", "ALICE", "knows", "work", "hr@corp", 1000))
            .unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    // S1: third insert into a 2-capacity (actor, context) bucket evicts the oldest.
    #[test]
    fn bucket_eviction_oldest_first() {
        let quotas = StorageQuotas::new(2, 64, 64);
        let mut store = BoundedStore::in_memory_with_quotas(quotas).unwrap();

        store
            .put(attestation("AS-1", "E1", "knows", "ACME", "hr@corp", 1000))
            .unwrap();
        store
            .put(attestation("AS-2", "E2", "knows", "ACME", "hr@corp", 2000))
            .unwrap();
        store
            .put(attestation("AS-3", "E3", "knows", "ACME", "hr@corp", 3000))
            .unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get("AS-1").unwrap().is_none());
        assert!(store.get("AS-2").unwrap().is_some());
        assert!(store.get("AS-3").unwrap().is_some());
    }

    #[test]
    fn eviction_tie_break_by_timestamp_then_id() {
        let quotas = StorageQuotas::new(2, 64, 64);
        let mut store = BoundedStore::in_memory_with_quotas(quotas).unwrap();

        // Same timestamp, so tie-break falls to created_at/id ordering.
        store
            .put(attestation("AS-2", "E1", "knows", "ACME", "hr@corp", 1000))
            .unwrap();
        store
            .put(attestation("AS-1", "E2", "knows", "ACME", "hr@corp", 1000))
            .unwrap();

        store
            .put(attestation("AS-3", "E3", "knows", "ACME", "hr@corp", 1000))
            .unwrap();

        // "AS-1" sorts before "AS-2" lexicographically and both share a
        // timestamp, so "AS-1" (inserted second but lexicographically
        // first) is evicted first.
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get("AS-1").unwrap().is_none());
    }

    // S6: exceeding L_AS (distinct contexts per actor) rejects, no eviction.
    #[test]
    fn actor_context_quota_rejects_without_eviction() {
        let quotas = StorageQuotas::new(64, 1, 64);
        let mut store = BoundedStore::in_memory_with_quotas(quotas).unwrap();

        store
            .put(attestation("AS-1", "E1", "knows", "ACME", "hr@corp", 1000))
            .unwrap();

        let result = store.put(attestation("AS-2", "E2", "knows", "OTHER", "hr@corp", 2000));
        assert!(matches!(result, Err(StoreError::QuotaActorContexts { .. })));
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.get("AS-1").unwrap().is_some());
    }

    #[test]
    fn entity_actor_quota_rejects() {
        let quotas = StorageQuotas::new(64, 64, 1);
        let mut store = BoundedStore::in_memory_with_quotas(quotas).unwrap();

        store
            .put(attestation("AS-1", "SHARED", "knows", "ACME", "hr@corp", 1000))
            .unwrap();

        let result = store.put(attestation(
            "AS-2",
            "SHARED",
            "knows",
            "ACME",
            "other@corp",
            2000,
        ));
        assert!(matches!(result, Err(StoreError::QuotaEntityActors { .. })));
    }

    #[test]
    fn reuses_existing_context_without_counting_against_quota() {
        let quotas = StorageQuotas::new(64, 1, 64);
        let mut store = BoundedStore::in_memory_with_quotas(quotas).unwrap();

        store
            .put(attestation("AS-1", "E1", "knows", "ACME", "hr@corp", 1000))
            .unwrap();
        // Same actor, same context: doesn't add a new distinct context.
        let result = store.put(attestation("AS-2", "E2", "works_with", "ACME", "hr@corp", 2000));
        assert!(result.is_ok());
    }

    #[test]
    fn warns_at_eighty_percent_fill() {
        let quotas = StorageQuotas::new(5, 64, 64);
        let mut store = BoundedStore::in_memory_with_quotas(quotas).unwrap();

        for i in 0..3 {
            store
                .put_checked(attestation(
                    &format!("AS-{i}"),
                    &format!("E{i}"),
                    "knows",
                    "ACME",
                    "hr@corp",
                    1000 + i as i64 * 1000,
                ))
                .unwrap();
        }

        // Fourth insert brings the bucket to 4/5 = 80%.
        let warnings = store
            .put_checked(attestation("AS-3", "E3", "knows", "ACME", "hr@corp", 4000))
            .unwrap();

        assert!(!warnings.is_empty());
        assert_eq!(warnings[0].current, 4);
        assert_eq!(warnings[0].limit, 5);
    }

    #[test]
    fn unlimited_quotas_allow_many_inserts() {
        let mut store = BoundedStore::in_memory_with_quotas(StorageQuotas::unlimited()).unwrap();

        for i in 0..100 {
            store
                .put(attestation(
                    &format!("AS-{i}"),
                    "ALICE",
                    &format!("pred_{i}"),
                    &format!("ctx_{i}"),
                    "hr@corp",
                    1000 + i as i64,
                ))
                .unwrap();
        }

        assert_eq!(store.count().unwrap(), 100);
    }
}
