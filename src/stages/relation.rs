//! Relation-linking stage contract: explicit discourse relations.
//!
//! A relation is emitted only when an explicit lexical marker is present
//! in the source sentence. Direction is fixed by marker type: contrast
//! follows textual order; "because" links effect→cause; "therefore"/"so"
//! link conclusion→premise (reversed from textual order); conditional
//! markers link main→condition; the which-clause modal consequence links
//! antecedent→consequence. No self-links; adjacency is preferred;
//! ambiguity resolves to emitting nothing (precision over recall).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::parser::CoreTriple;
use super::StageError;

/// Upper bound on relations per sentence; more is a contract violation.
pub const MAX_RELATIONS_PER_SENTENCE: usize = 6;

/// The closed predicate vocabulary for agent-extracted relations.
pub const RELATION_PREDICATES: &[&str] = &[
    "but",
    "however",
    "although",
    "because",
    "therefore",
    "so",
    "if",
    "unless",
    "when",
    "and",
    "or",
    "could lead to",
    "may lead to",
    "might lead to",
    "will lead to",
];

/// Whether a predicate belongs to the closed relation vocabulary.
pub fn is_relation_predicate(predicate: &str) -> bool {
    let p = crate::canonical::normalize_label(predicate);
    RELATION_PREDICATES.contains(&p.as_str())
}

/// One claim as presented to the relation-linking backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSlot {
    /// Position of the claim within its sentence.
    pub index: usize,
    /// Claim text.
    pub text: String,
    /// The claim's (subject, predicate, object) strings.
    pub core_triple: CoreTriple,
}

/// Input to the relation-linking stage: one sentence's claim batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationInput {
    /// The source sentence.
    pub sentence: String,
    /// Claims in decomposition order.
    pub claims: Vec<ClaimSlot>,
}

/// One directed relation between two claims of the same sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Index of the source claim.
    pub from: usize,
    /// Index of the target claim.
    pub to: usize,
    /// Marker from the closed vocabulary.
    pub predicate: String,
}

/// Output of the relation-linking stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationOutput {
    /// Accepted relations; may be empty.
    pub relations: Vec<Relation>,
}

impl RelationOutput {
    /// Enforce the contract shape against the claim batch size.
    ///
    /// Checks the relation count bound, index bounds, self-links, and the
    /// closed predicate vocabulary. Any violation fails the whole
    /// sentence's relation output; nothing is truncated or coerced.
    pub fn validate(&self, claim_count: usize) -> Result<(), StageError> {
        if self.relations.len() > MAX_RELATIONS_PER_SENTENCE {
            return Err(StageError::schema(format!(
                "{} relations exceeds the bound of {}",
                self.relations.len(),
                MAX_RELATIONS_PER_SENTENCE
            )));
        }
        for relation in &self.relations {
            if relation.from >= claim_count || relation.to >= claim_count {
                return Err(StageError::schema(format!(
                    "relation ({}, {}) out of bounds for {} claims",
                    relation.from, relation.to, claim_count
                )));
            }
            if relation.from == relation.to {
                return Err(StageError::schema(format!(
                    "self-link on claim {}",
                    relation.from
                )));
            }
            if !is_relation_predicate(&relation.predicate) {
                return Err(StageError::schema(format!(
                    "predicate {:?} is outside the closed vocabulary",
                    relation.predicate
                )));
            }
        }
        Ok(())
    }
}

/// Capability interface for the relation-linking backend.
#[async_trait]
pub trait RelationStage: Send + Sync {
    /// Link one sentence's claims with explicit discourse relations.
    async fn run(&self, input: &RelationInput) -> Result<RelationOutput, StageError>;
}
