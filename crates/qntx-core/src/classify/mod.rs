//! Claim Classification & Conflict Resolution
//!
//! Analyzes relationships between attestation claims to determine:
//!
//! - **Evolution**: Same actor updated their claim over time
//! - **Verification**: Multiple sources agreeing (strengthens claim)
//! - **Coexistence**: Different contexts, both valid
//! - **Supersession**: Higher authority overrides lower
//! - **Review**: Genuine disagreement requiring review
//!
//! # Credibility Hierarchy
//!
//! ```text
//! Human (0.9) > LLM (0.6) > External (0.5) > System (0.4)
//! ```
//!
//! # Example
//!
//! ```rust
//! use qntx_core::classify::ActorCredibility;
//!
//! let cred = ActorCredibility::from_actor("alice@corp.com");
//! assert_eq!(cred, ActorCredibility::Human);
//! ```

mod classifier;
mod confidence;
mod credibility;
mod temporal;
mod types;

pub use classifier::{
    classify_claims, ClaimGroup, ClaimInput, ClassifyInput, ClassifyOutput, ConflictOutput,
    SmartClassifier,
};
pub use confidence::{ClaimWithTiming, ConfidenceCalculator};
pub use credibility::{ActorCredibility, CredibilityTable};
pub use temporal::{ClaimTiming, TemporalAnalyzer, TemporalConfig, TemporalPattern};
pub use types::{ActorRanking, ClassificationResult, ConflictType};
