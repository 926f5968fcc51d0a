//! The C4 query pipeline: `execute_query`.
//!
//! Alias expansion → NL guard → fuzzy expansion → SQL retrieval → Cartesian
//! expansion → grouping → classification → resolution-strategy filtering →
//! summary.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, instrument};

use qntx_core::attestation::{Attestation, AxFilter};
use qntx_core::classify::{
    ClaimGroup as ClassifyClaimGroup, ClaimInput, ClassifyInput, ConflictOutput, SmartClassifier,
};
use qntx_core::expand::{
    dedup_source_ids as dedup_claim_sources, expand_cartesian, group_by_key, ExpandAttestation,
    IndividualClaim,
};
use qntx_core::fuzzy::FuzzyEngine;
use qntx_core::storage::QueryStore;

use qntx_sqlite::AliasStore;

use crate::config::Config;
use crate::error::Result;
use crate::expander::{EntityResolver, QueryExpander};
use crate::resolution::apply_strategy;

/// Default retrieval limit when the caller doesn't specify one.
const DEFAULT_LIMIT: usize = 1000;
/// Retrieval limit for `over`-style numeric-threshold queries, which need
/// the wider pool to filter in memory.
const OVER_QUERY_LIMIT: usize = 10_000;
/// Default fuzzy-expansion parameters (per C3's `findMatches` defaults).
const FUZZY_LIMIT: usize = 20;
const FUZZY_MIN_SCORE: f64 = 0.6;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineDebug {
    pub original_filter: AxFilter,
    pub expanded_filter: AxFilter,
    pub execution_time_ms: i64,
    pub nl_guard_triggered: bool,
    pub alias_expanded_subjects: usize,
    pub alias_expanded_actors: usize,
    pub alias_expanded_contexts: usize,
    pub fuzzy_expanded_predicates: usize,
    pub fuzzy_expanded_contexts: usize,
    pub retrieved: usize,
    pub claims_expanded: usize,
    pub groups: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AxSummaryOut {
    pub total_attestations: usize,
    pub unique_subjects: HashMap<String, usize>,
    pub unique_predicates: HashMap<String, usize>,
    pub unique_contexts: HashMap<String, usize>,
    pub unique_actors: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineResult {
    pub attestations: Vec<Attestation>,
    pub conflicts: Vec<ConflictOutput>,
    pub summary: AxSummaryOut,
    pub debug: PipelineDebug,
}

/// Run the full query pipeline against `store`, using `alias_store` for
/// identifier equivalence and `fuzzy` for predicate/context expansion.
#[instrument(skip_all)]
pub fn execute_query<S: QueryStore>(
    store: &S,
    alias_store: &dyn AliasStore,
    fuzzy: &mut FuzzyEngine,
    filter: &AxFilter,
    config: &Config,
    entity_resolver: &dyn EntityResolver,
    query_expander: &dyn QueryExpander,
    now_ms: i64,
) -> Result<PipelineResult> {
    let started_at = std::time::Instant::now();
    let mut debug_info = PipelineDebug::default();
    debug_info.original_filter = filter.clone();
    info!(stage = "start", "query pipeline started");

    // Step 1: alias expansion (subjects, actors via alias store + entity
    // resolver; contexts via alias store only; predicates never expanded).
    let subjects = expand_entities(&filter.subjects, alias_store, Some(entity_resolver))?;
    let actors = expand_entities(&filter.actors, alias_store, Some(entity_resolver))?;
    let alias_contexts = expand_entities(&filter.contexts, alias_store, None)?;
    debug_info.alias_expanded_subjects = subjects.len();
    debug_info.alias_expanded_actors = actors.len();
    debug_info.alias_expanded_contexts = alias_contexts.len();

    // Step 2: natural-language guard.
    let nl_pairs = if filter.predicates.len() > 1 && filter.contexts.is_empty() {
        debug_info.nl_guard_triggered = true;
        let verb = &filter.predicates[0];
        let values = &filter.predicates[1..];
        Some(query_expander.expand(verb, values))
    } else {
        None
    };

    // Step 3: fuzzy expansion, skipped entirely under the NL guard.
    let (predicates, contexts) = if let Some(pairs) = &nl_pairs {
        let predicates: HashSet<String> = pairs.iter().map(|p| p.predicate.clone()).collect();
        let contexts: HashSet<String> = pairs.iter().map(|p| p.context.clone()).collect();
        (predicates, contexts)
    } else {
        fuzzy.rebuild_index(store.predicates()?, store.contexts()?);

        let mut predicates = HashSet::new();
        for token in &filter.predicates {
            predicates.insert(token.clone());
            for m in fuzzy.search_predicates(token, FUZZY_LIMIT, FUZZY_MIN_SCORE) {
                predicates.insert(m.value);
            }
        }
        debug_info.fuzzy_expanded_predicates = predicates.len();

        let mut contexts: HashSet<String> = alias_contexts.iter().cloned().collect();
        for token in &filter.contexts {
            contexts.insert(token.clone());
            for m in fuzzy.search_contexts(token, FUZZY_LIMIT, FUZZY_MIN_SCORE) {
                contexts.insert(m.value);
            }
        }
        debug_info.fuzzy_expanded_contexts = contexts.len();

        (predicates, contexts)
    };

    // Step 4: SQL retrieval.
    let is_over_query = filter.over_comparison.is_some();
    let limit = filter.limit.unwrap_or(if is_over_query {
        OVER_QUERY_LIMIT
    } else {
        DEFAULT_LIMIT
    });

    let retrieval_filter = AxFilter {
        subjects: subjects.into_iter().collect(),
        predicates: predicates.into_iter().collect(),
        contexts: contexts.into_iter().collect(),
        actors: actors.into_iter().collect(),
        time_start: filter.time_start,
        time_end: filter.time_end,
        over_comparison: filter.over_comparison.clone(),
        limit: Some(limit),
    };

    debug_info.expanded_filter = retrieval_filter.clone();

    let retrieved = store.query(&retrieval_filter)?;
    let mut attestations = retrieved.attestations;

    if let Some(over) = &filter.over_comparison {
        attestations.retain(|a| passes_over_threshold(a, over));
    }
    debug_info.retrieved = attestations.len();
    info!(stage = "retrieval", retrieved = attestations.len(), "retrieval complete");

    let by_id: HashMap<String, Attestation> =
        attestations.iter().map(|a| (a.id.clone(), a.clone())).collect();

    // Step 5: Cartesian expansion (C1).
    let expand_inputs: Vec<ExpandAttestation> = attestations
        .iter()
        .map(|a| ExpandAttestation {
            id: a.id.clone(),
            subjects: a.subjects.clone(),
            predicates: a.predicates.clone(),
            contexts: a.contexts.clone(),
            actors: a.actors.clone(),
            timestamp_ms: a.timestamp,
        })
        .collect();
    let claims = expand_cartesian(&expand_inputs);
    debug_info.claims_expanded = claims.len();

    // Step 6: grouping (C1).
    let groups = group_by_key(&claims);
    debug_info.groups = groups.len();

    // Step 7: classification (C5).
    let classify_groups: Vec<ClassifyClaimGroup> = groups
        .iter()
        .map(|g| ClassifyClaimGroup {
            key: g.key.clone(),
            claims: g.claims.iter().map(to_claim_input).collect(),
        })
        .collect();

    let classifier = SmartClassifier::new(config.temporal_config());
    let classify_output = classifier.classify(&ClassifyInput {
        claim_groups: classify_groups,
        config: config.temporal_config(),
        now_ms,
    });

    let conflict_by_key: HashMap<String, &ConflictOutput> = classify_output
        .conflicts
        .iter()
        .map(|c| (format!("{}|{}|{}", c.subject, c.predicate, c.context), c))
        .collect();

    // Step 8: resolution filtering.
    let mut filtered_claims: Vec<IndividualClaim> = Vec::new();
    for group in &groups {
        if group.claims.len() <= 1 {
            filtered_claims.extend(group.claims.iter().cloned());
            continue;
        }
        match conflict_by_key.get(&group.key) {
            Some(conflict) => filtered_claims.extend(apply_strategy(&conflict.strategy, &group.claims)),
            None => filtered_claims.extend(group.claims.iter().cloned()),
        }
    }

    let result_ids = dedup_claim_sources(&filtered_claims);
    let result_attestations: Vec<Attestation> = result_ids
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .collect();

    // Step 9: summary.
    let summary = build_summary(&result_attestations);

    debug_info.execution_time_ms = started_at.elapsed().as_millis() as i64;

    debug!(
        stage = "classification",
        conflicts = classify_output.conflicts.len(),
        auto_resolved = classify_output.auto_resolved,
        review_required = classify_output.review_required,
        execution_time_ms = debug_info.execution_time_ms,
        "classification complete"
    );

    Ok(PipelineResult {
        attestations: result_attestations,
        conflicts: classify_output.conflicts,
        summary,
        debug: debug_info,
    })
}

fn to_claim_input(claim: &IndividualClaim) -> ClaimInput {
    ClaimInput {
        subject: claim.subject.clone(),
        predicate: claim.predicate.clone(),
        context: claim.context.clone(),
        actor: claim.actor.clone(),
        timestamp_ms: claim.timestamp_ms,
        source_id: claim.source_id.clone(),
    }
}

/// Union of `{id} ∪ aliases(id) ∪ entity_resolver.alternative_ids(id)` for
/// each identifier, deduplicated. `entity_resolver` is `None` for contexts,
/// which are alias-expanded but never entity-resolved.
fn expand_entities(
    ids: &[String],
    alias_store: &dyn AliasStore,
    entity_resolver: Option<&dyn EntityResolver>,
) -> Result<HashSet<String>> {
    let mut expanded = HashSet::new();
    for id in ids {
        expanded.insert(id.clone());
        for alias in alias_store.resolve(id)? {
            expanded.insert(alias);
        }
        if let Some(resolver) = entity_resolver {
            for alt in resolver.alternative_ids(id) {
                expanded.insert(alt);
            }
        }
    }
    Ok(expanded)
}

/// Pure-OVER in-memory filter: parse the attestation's first context as a
/// float and compare against the threshold (months normalized to years).
fn passes_over_threshold(attestation: &Attestation, over: &qntx_core::attestation::OverFilter) -> bool {
    let Some(first_context) = attestation.contexts.first() else {
        return false;
    };
    let Ok(raw_value) = first_context.parse::<f64>() else {
        return false;
    };

    let threshold_years = match over.unit.as_str() {
        "m" => over.value / 12.0,
        _ => over.value,
    };

    raw_value >= threshold_years
}

fn build_summary(attestations: &[Attestation]) -> AxSummaryOut {
    let mut summary = AxSummaryOut {
        total_attestations: attestations.len(),
        ..Default::default()
    };

    for attestation in attestations {
        for subject in &attestation.subjects {
            *summary.unique_subjects.entry(subject.clone()).or_insert(0) += 1;
        }
        for predicate in &attestation.predicates {
            if predicate == "_" {
                continue;
            }
            *summary.unique_predicates.entry(predicate.clone()).or_insert(0) += 1;
        }
        for context in &attestation.contexts {
            if context == "_" {
                continue;
            }
            *summary.unique_contexts.entry(context.clone()).or_insert(0) += 1;
        }
        for actor in &attestation.actors {
            *summary.unique_actors.entry(actor.clone()).or_insert(0) += 1;
        }
    }

    summary
}
