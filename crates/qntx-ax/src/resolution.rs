//! Conflict resolution-strategy filtering
//!
//! Given a group's resolved strategy, decides which of the group's claims
//! survive into the final result set. Groups of size 1 never reach here —
//! the caller passes them straight through.

use qntx_core::classify::ActorCredibility;
use qntx_core::expand::IndividualClaim;

/// Apply a classification strategy to a conflicted claim group.
///
/// `show_all_sources`, `show_all_contexts`, `human_review`, `flag_for_review`,
/// and any unrecognized strategy all keep every claim.
pub fn apply_strategy(strategy: &str, claims: &[IndividualClaim]) -> Vec<IndividualClaim> {
    match strategy {
        "show_latest" => vec![latest(claims)],
        "show_highest_authority" => vec![highest_authority(claims)],
        _ => claims.to_vec(),
    }
}

/// Claim with the maximum timestamp. Ties broken by source attestation ID,
/// lexicographically ascending picked first (deterministic, stable).
fn latest(claims: &[IndividualClaim]) -> IndividualClaim {
    claims
        .iter()
        .min_by(|a, b| {
            b.timestamp_ms
                .cmp(&a.timestamp_ms)
                .then_with(|| a.source_id.cmp(&b.source_id))
        })
        .cloned()
        .expect("group must be non-empty")
}

/// Claim whose actor has the highest credibility authority. Ties broken by
/// first occurrence in the group.
fn highest_authority(claims: &[IndividualClaim]) -> IndividualClaim {
    claims
        .iter()
        .max_by_key(|c| ActorCredibility::from_actor(&c.actor))
        .cloned()
        .expect("group must be non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(actor: &str, ts: i64, source_id: &str) -> IndividualClaim {
        IndividualClaim {
            subject: "ALICE".to_string(),
            predicate: "works_at".to_string(),
            context: "ACME".to_string(),
            actor: actor.to_string(),
            timestamp_ms: ts,
            source_id: source_id.to_string(),
        }
    }

    #[test]
    fn show_latest_keeps_max_timestamp() {
        let claims = vec![claim("human:bob", 1000, "AS-1"), claim("human:bob", 2000, "AS-2")];
        let kept = apply_strategy("show_latest", &claims);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_id, "AS-2");
    }

    #[test]
    fn show_latest_tie_break_by_source_id() {
        let claims = vec![claim("human:bob", 1000, "AS-2"), claim("human:bob", 1000, "AS-1")];
        let kept = apply_strategy("show_latest", &claims);
        assert_eq!(kept[0].source_id, "AS-1");
    }

    #[test]
    fn show_highest_authority_prefers_human() {
        let claims = vec![claim("system:automated", 1000, "AS-1"), claim("human:bob@corp.com", 2000, "AS-2")];
        let kept = apply_strategy("show_highest_authority", &claims);
        assert_eq!(kept[0].actor, "human:bob@corp.com");
    }

    #[test]
    fn unknown_strategy_keeps_all() {
        let claims = vec![claim("human:bob", 1000, "AS-1"), claim("human:alice", 2000, "AS-2")];
        let kept = apply_strategy("show_all_sources", &claims);
        assert_eq!(kept.len(), 2);
    }
}
