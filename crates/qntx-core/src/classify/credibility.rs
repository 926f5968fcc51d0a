//! Actor credibility derivation
//!
//! Credibility is never stored: it is derived from the actor string every
//! time it is needed, so changing the rule doesn't require a data migration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse classification of who (or what) asserted a claim.
///
/// Ordering (`Human > Llm > External > System`) follows authority
/// [`ActorCredibility::score`], not declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActorCredibility {
    Human,
    Llm,
    #[default]
    External,
    System,
}

impl ActorCredibility {
    /// Infer credibility from an actor identifier.
    ///
    /// Rules (first match wins, against the lowercased string):
    /// - contains `@` and not `bot`/`system` → Human
    /// - contains `claude`/`gpt`/`llm`/`ai` → Llm
    /// - contains `platform`/`service`/`registry`/`webhook` → External
    /// - contains `system`/`ats`/`bot`/`verification`/`automated` → System
    /// - otherwise → External
    pub fn from_actor(actor: &str) -> Self {
        let lower = actor.to_lowercase();

        if lower.contains('@') && !lower.contains("bot") && !lower.contains("system") {
            return Self::Human;
        }
        if contains_any(&lower, &["claude", "gpt", "llm", "ai"]) {
            return Self::Llm;
        }
        if contains_any(&lower, &["platform", "service", "registry", "webhook"]) {
            return Self::External;
        }
        if contains_any(&lower, &["system", "ats", "bot", "verification", "automated"]) {
            return Self::System;
        }
        Self::External
    }

    /// Check if this is a human actor.
    pub fn is_human(&self) -> bool {
        *self == Self::Human
    }

    /// Check if this actor should override another in a ranking.
    pub fn overrides(&self, other: &Self) -> bool {
        self.score() > other.score()
    }

    /// Authority score in `[0, 1]`, used for ranking and confidence math.
    pub fn score(&self) -> f64 {
        match self {
            Self::Human => 0.9,
            Self::Llm => 0.6,
            Self::External => 0.5,
            Self::System => 0.4,
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl PartialOrd for ActorCredibility {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActorCredibility {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.score()
            .partial_cmp(&other.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

impl std::fmt::Display for ActorCredibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Llm => write!(f, "llm"),
            Self::External => write!(f, "external"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Runtime overrides for actor credibility, consulted before the string rule.
#[derive(Debug, Clone, Default)]
pub struct CredibilityTable {
    overrides: HashMap<String, ActorCredibility>,
}

impl CredibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_override(&mut self, actor: impl Into<String>, credibility: ActorCredibility) {
        self.overrides.insert(actor.into(), credibility);
    }

    /// Resolve credibility for `actor`, consulting overrides first.
    pub fn resolve(&self, actor: &str) -> ActorCredibility {
        self.overrides
            .get(actor)
            .copied()
            .unwrap_or_else(|| ActorCredibility::from_actor(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_patterns() {
        assert_eq!(ActorCredibility::from_actor("alice@corp.com"), ActorCredibility::Human);
        assert_eq!(
            ActorCredibility::from_actor("morpheus@nebuchadnezzar"),
            ActorCredibility::Human
        );
    }

    #[test]
    fn test_human_excludes_bot_and_system() {
        assert_ne!(ActorCredibility::from_actor("bot@system.internal"), ActorCredibility::Human);
        assert_ne!(ActorCredibility::from_actor("system@qntx.local"), ActorCredibility::Human);
    }

    #[test]
    fn test_llm_patterns() {
        assert_eq!(ActorCredibility::from_actor("claude-opus"), ActorCredibility::Llm);
        assert_eq!(ActorCredibility::from_actor("gpt-4"), ActorCredibility::Llm);
        assert_eq!(ActorCredibility::from_actor("some-llm-agent"), ActorCredibility::Llm);
    }

    #[test]
    fn test_external_patterns() {
        assert_eq!(ActorCredibility::from_actor("github-webhook"), ActorCredibility::External);
        assert_eq!(ActorCredibility::from_actor("payments-service"), ActorCredibility::External);
    }

    #[test]
    fn test_system_patterns() {
        assert_eq!(ActorCredibility::from_actor("system:ingest"), ActorCredibility::System);
        assert_eq!(ActorCredibility::from_actor("verification-worker"), ActorCredibility::System);
        assert_eq!(ActorCredibility::from_actor("automated-sync"), ActorCredibility::System);
    }

    #[test]
    fn test_external_default() {
        assert_eq!(ActorCredibility::from_actor("unknown-thing"), ActorCredibility::External);
    }

    #[test]
    fn test_ordering() {
        assert!(ActorCredibility::Human > ActorCredibility::Llm);
        assert!(ActorCredibility::Llm > ActorCredibility::External);
        assert!(ActorCredibility::External > ActorCredibility::System);
    }

    #[test]
    fn test_overrides() {
        assert!(ActorCredibility::Human.overrides(&ActorCredibility::Llm));
        assert!(!ActorCredibility::System.overrides(&ActorCredibility::Human));
    }

    #[test]
    fn test_override_table() {
        let mut table = CredibilityTable::new();
        table.set_override("weird-bot-name@corp.com", ActorCredibility::Human);
        assert_eq!(table.resolve("weird-bot-name@corp.com"), ActorCredibility::Human);
        assert_eq!(table.resolve("unmentioned@corp.com"), ActorCredibility::External);
    }
}
