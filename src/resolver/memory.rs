//! In-memory dedup resolver for testing.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{DedupResolver, ResolvedAtom, TripleCombination};
use crate::canonical;
use crate::types::TripleKey;

/// Error type for the in-memory resolver.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Placeholder; the in-memory resolver cannot actually fail.
    #[error("in-memory resolver error: {0}")]
    Internal(String),
}

/// In-memory dedup resolver for testing.
///
/// Uses BTreeMap for deterministic iteration order. Labels are stored by
/// normalized form, so lookups are normalization-aware like the store of
/// record's.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    /// Normalized label -> canonical id.
    atoms: BTreeMap<String, String>,
    /// Triple stable key -> canonical id.
    triples: BTreeMap<TripleKey, String>,
}

impl InMemoryResolver {
    /// Create a new empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known atom; the label is normalized on insert.
    pub fn add_atom(&mut self, label: &str, canonical_id: impl Into<String>) {
        self.atoms
            .insert(canonical::normalize_label(label), canonical_id.into());
    }

    /// Register a known triple by stable key.
    pub fn add_triple(&mut self, key: TripleKey, canonical_id: impl Into<String>) {
        self.triples.insert(key, canonical_id.into());
    }

    /// Number of known atoms.
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Number of known triples.
    pub fn num_triples(&self) -> usize {
        self.triples.len()
    }
}

#[async_trait]
impl DedupResolver for InMemoryResolver {
    type Error = InMemoryError;

    async fn resolve_atoms(&self, labels: &[String]) -> Result<Vec<ResolvedAtom>, Self::Error> {
        let mut resolved = BTreeMap::new();
        for label in labels {
            let normalized = canonical::normalize_label(label);
            if let Some(id) = self.atoms.get(&normalized) {
                resolved.insert(normalized, id.clone());
            }
        }
        Ok(resolved
            .into_iter()
            .map(|(normalized_label, canonical_id)| ResolvedAtom {
                normalized_label,
                canonical_id,
            })
            .collect())
    }

    async fn resolve_triples(
        &self,
        combinations: &[TripleCombination],
    ) -> Result<BTreeMap<TripleKey, Option<String>>, Self::Error> {
        let mut result = BTreeMap::new();
        for combination in combinations {
            let key = combination.key();
            let id = self.triples.get(&key).cloned();
            result.insert(key, id);
        }
        Ok(result)
    }
}
