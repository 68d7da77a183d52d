//! Decomposition stage contract: entailed atomic-claim extraction.
//!
//! The backend policy is contractual and backend-independent:
//! entailment-preserving only (no new entities, numbers or causal links);
//! splits occur only at explicit discourse markers (contrast, cause,
//! condition, "which"-clauses, and coordinating "and"/"or" joining two
//! independently debatable propositions), never at prepositional phrases.
//! Reporting frames yield both the bare proposition and a meta-claim of
//! the fixed surface form `"<source> <verb> that <P>."`. Conditionals
//! yield the full conditional and the condition-only claim
//! unconditionally, and the main-only claim only if independently
//! entailed.
//!
//! Output order is load-bearing: propositions, then conditional-full, then
//! condition-only, then which-clause, then meta. Relation-linking indexes
//! claims positionally and downstream consumers pick claim 0 as the main
//! claim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StageError;

/// Input to the decomposition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionInput {
    /// Non-empty ancestor headings above the sentence, outermost first.
    pub header_context: Vec<String>,
    /// The (selection-normalized) sentence.
    pub sentence: String,
}

/// Output of the decomposition stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionOutput {
    /// Atomic claims in contract order; at least one.
    pub claims: Vec<String>,
}

impl DecompositionOutput {
    /// Enforce the contract shape: at least one claim, none blank.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.claims.is_empty() {
            return Err(StageError::schema("decomposition requires at least one claim"));
        }
        if self.claims.iter().any(|c| c.trim().is_empty()) {
            return Err(StageError::schema("decomposition claims must be non-empty"));
        }
        Ok(())
    }
}

/// Capability interface for the decomposition backend.
#[async_trait]
pub trait DecompositionStage: Send + Sync {
    /// Decompose one sentence into atomic claims.
    async fn run(&self, input: &DecompositionInput) -> Result<DecompositionOutput, StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_claims_rejected() {
        let out = DecompositionOutput { claims: vec![] };
        assert!(out.validate().is_err());
    }

    #[test]
    fn test_blank_claim_rejected() {
        let out = DecompositionOutput {
            claims: vec!["Coal is cheap.".to_string(), "   ".to_string()],
        };
        assert!(out.validate().is_err());
    }

    #[test]
    fn test_valid_claims_accepted() {
        let out = DecompositionOutput {
            claims: vec!["Coal is cheap.".to_string()],
        };
        assert!(out.validate().is_ok());
    }
}
