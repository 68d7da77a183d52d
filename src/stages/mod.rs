//! Model-backed pipeline stages as capability interfaces.
//!
//! Each stage is a `{run(input) -> output}` contract validated against a
//! fixed schema. Any backend satisfying the contract is interchangeable,
//! including the deterministic fixture backends in [`fixture`], so the
//! model's internal reasoning never leaks into this crate. Backends are
//! constructed once at process start and injected (`Arc`), never ambient
//! global state.
//!
//! Non-conforming backend output is a [`StageError::Schema`] for the
//! affected sentence or claim, not a partial acceptance.

pub mod decomposition;
pub mod fixture;
pub mod parser;
pub mod relation;
pub mod selection;
pub mod stance;

#[cfg(feature = "http")]
pub mod http;

use std::fmt;
use std::time::Duration;

pub use decomposition::{DecompositionInput, DecompositionOutput, DecompositionStage};
pub use fixture::FixtureBackend;
pub use parser::{ClaimParser, CoreTriple};
pub use relation::{
    ClaimSlot, Relation, RelationInput, RelationOutput, RelationStage, MAX_RELATIONS_PER_SENTENCE,
};
pub use selection::{
    SelectionInput, SelectionOutcome, SelectionOutput, SelectionStage, SentenceKind,
};
pub use stance::{
    CandidateClaim, Stance, StanceInput, StanceOutput, StanceStage, StanceVerification,
};

#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpBackendConfig};

/// Which stage of the pipeline an error or warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Per-sentence keep/drop + normalization + classification.
    Selection,
    /// Per-sentence entailed atomic-claim extraction.
    Decomposition,
    /// Claim-string to (subject, predicate, object) parsing.
    ClaimParsing,
    /// Term/triple construction and stable-key derivation.
    Canonicalization,
    /// Per-sentence explicit discourse relations between claims.
    RelationLinking,
    /// NestedEdge construction from accepted relations.
    EdgeBuilding,
    /// Per-claim semantic alignment against the parent stance.
    StanceVerification,
    /// Dedup lookups against the store of record.
    Resolution,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection => write!(f, "selection"),
            Self::Decomposition => write!(f, "decomposition"),
            Self::ClaimParsing => write!(f, "claim_parsing"),
            Self::Canonicalization => write!(f, "canonicalization"),
            Self::RelationLinking => write!(f, "relation_linking"),
            Self::EdgeBuilding => write!(f, "edge_building"),
            Self::StanceVerification => write!(f, "stance_verification"),
            Self::Resolution => write!(f, "resolution"),
        }
    }
}

/// Error from a stage backend call.
///
/// Every variant follows the drop-and-continue policy: the affected
/// sentence or claim is dropped with a warning and the submission
/// continues. `Transport` and `Timeout` are distinguished from `Schema`
/// only for observability.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    /// Backend output failed contract validation.
    #[error("stage output violated its contract: {detail}")]
    Schema {
        /// Human-readable description of the violation.
        detail: String,
    },
    /// The call failed in transport (connection, protocol, non-2xx).
    #[error("stage transport failure: {0}")]
    Transport(String),
    /// The call exceeded its deadline.
    #[error("stage call timed out after {0:?}")]
    Timeout(Duration),
}

impl StageError {
    /// Build a schema violation error.
    pub fn schema(detail: impl Into<String>) -> Self {
        Self::Schema {
            detail: detail.into(),
        }
    }
}
