//! Dedup resolution against the store of record.
//!
//! The store-of-record collaborator owns canonical term persistence; this
//! crate only asks it which normalized labels and (S,P,O) combinations
//! already exist. Implementations must be idempotent and side-effect-free
//! from the caller's point of view, and both methods must be called with
//! deduplicated input.

pub mod cached;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical;
use crate::types::TripleKey;

/// An atom the store of record already knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAtom {
    /// The label in canonical normalized form.
    pub normalized_label: String,
    /// The store's identifier for the canonical term.
    pub canonical_id: String,
}

/// One (subject, predicate, object) combination by canonical term ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripleCombination {
    /// Canonical id of the subject term.
    pub subject_id: String,
    /// Canonical id of the predicate term.
    pub predicate_id: String,
    /// Canonical id of the object term.
    pub object_id: String,
}

impl TripleCombination {
    /// The stable key this combination resolves under.
    pub fn key(&self) -> TripleKey {
        canonical::triple_key_from_ids(&self.subject_id, &self.predicate_id, &self.object_id)
    }
}

/// Trait for dedup resolution backends.
///
/// Implementations must guarantee deterministic ordering of results.
#[async_trait]
pub trait DedupResolver: Send + Sync {
    /// Error type for resolver operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve labels to existing canonical atoms.
    ///
    /// Input labels are deduplicated by normalized form before the call;
    /// the response contains one entry per known normalized label, in
    /// normalized-label order. Unknown labels are simply absent.
    async fn resolve_atoms(&self, labels: &[String]) -> Result<Vec<ResolvedAtom>, Self::Error>;

    /// Resolve (S,P,O) combinations to existing canonical triples.
    ///
    /// The response maps every requested combination's stable key to the
    /// store's canonical id, or `None` when the triple is unknown.
    async fn resolve_triples(
        &self,
        combinations: &[TripleCombination],
    ) -> Result<BTreeMap<TripleKey, Option<String>>, Self::Error>;
}

pub use cached::{CacheConfig, CacheStats, CachedResolver};
pub use memory::InMemoryResolver;
