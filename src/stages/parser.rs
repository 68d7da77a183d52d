//! Claim parser capability: claim string → (subject, predicate, object).
//!
//! Lexical parsing of a claim into its three strings is outside this
//! core's responsibility; the strings are assumed to arrive through this
//! seam and are canonicalized, not parsed, downstream. A parse failure
//! drops the single affected claim with a warning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StageError;

/// The three strings a claim reduces to, pre-canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreTriple {
    /// Subject surface form.
    pub subject: String,
    /// Predicate surface form.
    pub predicate: String,
    /// Object surface form.
    pub object: String,
}

/// Capability interface for the claim parser.
#[async_trait]
pub trait ClaimParser: Send + Sync {
    /// Parse one claim string into its (subject, predicate, object).
    async fn run(&self, claim: &str) -> Result<CoreTriple, StageError>;
}
