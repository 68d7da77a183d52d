//! Stance-verification stage contract.
//!
//! Given a parent claim and the stance the author declared toward it, the
//! backend classifies every candidate claim semantically: grammatical
//! polarity of the child claim is irrelevant to whether it supports or
//! refutes the parent. The output must contain exactly one verification
//! per input claim, matched by stable key, with no duplicates or
//! omissions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::parser::CoreTriple;
use super::StageError;
use crate::types::TripleKey;

/// Declared stance toward a parent claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stance {
    /// The post agrees with the parent claim.
    Supports,
    /// The post disagrees with the parent claim.
    Refutes,
}

impl Stance {
    /// The opposite stance.
    pub fn opposite(self) -> Self {
        match self {
            Self::Supports => Self::Refutes,
            Self::Refutes => Self::Supports,
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supports => write!(f, "SUPPORTS"),
            Self::Refutes => write!(f, "REFUTES"),
        }
    }
}

/// One candidate claim as presented to the stance backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateClaim {
    /// Stable key of the claim's triple.
    pub stable_key: TripleKey,
    /// Claim text.
    pub text: String,
    /// The claim's (subject, predicate, object) strings.
    pub triple: CoreTriple,
}

/// Input to the stance-verification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceInput {
    /// The parent claim being agreed or disagreed with.
    pub parent_claim: String,
    /// The stance the author declared.
    pub user_stance: Stance,
    /// Every candidate claim extracted from the submission.
    pub claims: Vec<CandidateClaim>,
}

/// Verification verdict for one candidate claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceVerification {
    /// Stable key of the verified claim.
    pub stable_key: TripleKey,
    /// Whether the claim's semantics align with the declared stance.
    pub aligns_with_stance: bool,
    /// The stance the claim actually expresses toward the parent.
    pub suggested_stance: Stance,
    /// Optional backend rationale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Output of the stance-verification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceOutput {
    /// One verification per input claim.
    pub verifications: Vec<StanceVerification>,
}

impl StanceOutput {
    /// Enforce completeness: exactly one verification per expected key.
    pub fn validate(&self, expected: &[TripleKey]) -> Result<(), StageError> {
        let expected_set: BTreeSet<&TripleKey> = expected.iter().collect();
        let mut seen: BTreeSet<&TripleKey> = BTreeSet::new();

        for verification in &self.verifications {
            if !expected_set.contains(&verification.stable_key) {
                return Err(StageError::schema(format!(
                    "verification for unknown claim {}",
                    verification.stable_key
                )));
            }
            if !seen.insert(&verification.stable_key) {
                return Err(StageError::schema(format!(
                    "duplicate verification for claim {}",
                    verification.stable_key
                )));
            }
        }

        if seen.len() != expected_set.len() {
            return Err(StageError::schema(format!(
                "expected {} verifications, got {}",
                expected_set.len(),
                seen.len()
            )));
        }

        Ok(())
    }
}

/// Capability interface for the stance-verification backend.
#[async_trait]
pub trait StanceStage: Send + Sync {
    /// Verify all candidate claims against the declared parent stance.
    async fn run(&self, input: &StanceInput) -> Result<StanceOutput, StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triple;

    fn key(s: &str) -> TripleKey {
        Triple::from_labels(s, "is", "x").unwrap().stable_key
    }

    fn verification(k: &TripleKey) -> StanceVerification {
        StanceVerification {
            stable_key: k.clone(),
            aligns_with_stance: true,
            suggested_stance: Stance::Supports,
            reason: None,
        }
    }

    #[test]
    fn test_complete_output_accepted() {
        let keys = vec![key("a"), key("b")];
        let out = StanceOutput {
            verifications: keys.iter().map(verification).collect(),
        };
        assert!(out.validate(&keys).is_ok());
    }

    #[test]
    fn test_omission_rejected() {
        let keys = vec![key("a"), key("b")];
        let out = StanceOutput {
            verifications: vec![verification(&keys[0])],
        };
        assert!(out.validate(&keys).is_err());
    }

    #[test]
    fn test_duplicate_rejected() {
        let keys = vec![key("a")];
        let out = StanceOutput {
            verifications: vec![verification(&keys[0]), verification(&keys[0])],
        };
        assert!(out.validate(&keys).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let keys = vec![key("a")];
        let out = StanceOutput {
            verifications: vec![verification(&key("intruder"))],
        };
        assert!(out.validate(&keys).is_err());
    }

    #[test]
    fn test_stance_wire_form() {
        assert_eq!(serde_json::to_string(&Stance::Supports).unwrap(), "\"SUPPORTS\"");
        assert_eq!(serde_json::to_string(&Stance::Refutes).unwrap(), "\"REFUTES\"");
        assert_eq!(Stance::Supports.opposite(), Stance::Refutes);
    }
}
