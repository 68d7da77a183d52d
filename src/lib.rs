//! # claim-kernel
//!
//! Multi-stage claim extraction with content-addressed canonicalization
//! for debate graphs.
//!
//! The claim kernel answers one question:
//!
//! > Given a free-form debate post, which canonical statements does it
//! > make, and how do they relate?
//!
//! ## Core Contract
//!
//! 1. Segment markdown text into ordered sentences with header context
//! 2. Run each sentence through strict-schema model stages (selection,
//!    decomposition, relation-linking, stance-verification)
//! 3. Canonicalize every claim into a `Triple` with a deterministic
//!    SHA-256 stable key, and every discourse relation into a `NestedEdge`
//! 4. Reconcile the batch against the store of record before anything is
//!    materialized downstream
//!
//! ## Architecture
//!
//! ```text
//! Text → Segmenter → Selection → Decomposition → Canonicalizer
//!                                     ↓
//!         RelationLinking → EdgeBuilding → [StanceVerification]
//!                                     ↓
//!                               DedupResolver
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same normalized (subject, predicate, object) → identical stable key,
//!   across processes and deployments
//! - Triple and edge keys live in disjoint namespaces
//! - Re-running the pipeline over identical text is a pure, idempotent
//!   operation; re-derived duplicates are safe to discard

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod logging;
pub mod pipeline;
pub mod resolver;
pub mod segmenter;
pub mod stages;
pub mod types;

// Re-exports
pub use types::{
    AtomKey, EdgeKey, EdgeKind, InvariantViolation, NestedEdge, Origin, Post, PostId, TermRef,
    Topic, TopicId, Triple, TripleKey, MAX_TRIPLE_DEPTH,
};
pub use canonical::{atom_key, edge_key, normalize_label, triple_key, CANONICAL_KEY_VERSION};
pub use pipeline::{
    ExtractedClaim, ExtractionPipeline, ParentStance, PipelineConfig, PipelineError,
    PipelineOutput, PipelineWarning, ResolutionReport, StageSet, Submission,
};
pub use resolver::{
    CacheConfig, CacheStats, CachedResolver, DedupResolver, InMemoryResolver, ResolvedAtom,
    TripleCombination,
};
pub use segmenter::{Segment, Segmenter};
pub use stages::{
    CandidateClaim, ClaimParser, ClaimSlot, CoreTriple, DecompositionInput, DecompositionOutput,
    DecompositionStage, FixtureBackend, Relation, RelationInput, RelationOutput, RelationStage,
    SelectionInput, SelectionOutcome, SelectionOutput, SelectionStage, SentenceKind, Stance,
    StanceInput, StanceOutput, StanceStage, StanceVerification, StageError, StageKind,
};

#[cfg(feature = "http")]
pub use stages::{HttpBackend, HttpBackendConfig};

/// Schema version for all claim kernel types.
/// Increment on breaking changes to any schema type.
pub const CLAIM_KERNEL_SCHEMA_VERSION: &str = "1.0.0";
