//! Caching wrapper for dedup resolvers.
//!
//! ## Purpose
//!
//! Debate corpora revisit the same terms constantly; resolving "nuclear"
//! against the store of record once per submission is wasted round-trips.
//! This wrapper caches **positive** resolutions in an LRU so repeated
//! lookups short-circuit. Negative results are never cached: an unknown
//! label may be created by a concurrent submission, and a stale "absent"
//! answer would fork canonical identity.
//!
//! ## Cache Key Design
//!
//! Atom entries are keyed by xxh64 of the normalized label; triple entries
//! by xxh64 of the stable key. The hash is a cache key only; canonical
//! identity always remains the SHA-256 stable key.

use std::collections::BTreeMap;
use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use xxhash_rust::xxh64::Xxh64;

use super::{DedupResolver, ResolvedAtom, TripleCombination};
use crate::canonical;
use crate::types::TripleKey;

/// Configuration for the resolution cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries per cache (atoms and triples separately).
    pub max_entries: usize,
    /// Whether to enable caching at all.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            enabled: true,
        }
    }
}

/// Snapshot of cache effectiveness counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from cache.
    pub hits: u64,
    /// Lookups forwarded to the inner resolver.
    pub misses: u64,
}

fn hash_str(s: &str) -> u64 {
    let mut hasher = Xxh64::new(0);
    hasher.write(s.as_bytes());
    hasher.finish()
}

fn make_cache<V>(config: &CacheConfig) -> Option<RwLock<LruCache<u64, V>>> {
    if !config.enabled {
        return None;
    }
    let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
    Some(RwLock::new(LruCache::new(size)))
}

/// A [`DedupResolver`] that caches positive resolutions.
///
/// Thread-safe; suitable for sharing across concurrent submissions.
pub struct CachedResolver<R> {
    inner: R,
    atoms: Option<RwLock<LruCache<u64, ResolvedAtom>>>,
    triples: Option<RwLock<LruCache<u64, String>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R> CachedResolver<R> {
    /// Wrap a resolver with the default cache configuration.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wrap a resolver with an explicit cache configuration.
    pub fn with_config(inner: R, config: CacheConfig) -> Self {
        Self {
            atoms: make_cache(&config),
            triples: make_cache(&config),
            inner,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// The wrapped resolver.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: DedupResolver> DedupResolver for CachedResolver<R> {
    type Error = R::Error;

    async fn resolve_atoms(&self, labels: &[String]) -> Result<Vec<ResolvedAtom>, Self::Error> {
        let mut resolved: BTreeMap<String, ResolvedAtom> = BTreeMap::new();
        let mut missing: Vec<String> = Vec::new();

        for label in labels {
            let normalized = canonical::normalize_label(label);
            if resolved.contains_key(&normalized) || missing.contains(&normalized) {
                continue;
            }
            let cached = self.atoms.as_ref().and_then(|cache| {
                cache.write().get(&hash_str(&normalized)).cloned()
            });
            match cached {
                Some(entry) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    resolved.insert(normalized, entry);
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    missing.push(normalized);
                }
            }
        }

        if !missing.is_empty() {
            for entry in self.inner.resolve_atoms(&missing).await? {
                if let Some(cache) = &self.atoms {
                    cache
                        .write()
                        .put(hash_str(&entry.normalized_label), entry.clone());
                }
                resolved.insert(entry.normalized_label.clone(), entry);
            }
        }

        Ok(resolved.into_values().collect())
    }

    async fn resolve_triples(
        &self,
        combinations: &[TripleCombination],
    ) -> Result<BTreeMap<TripleKey, Option<String>>, Self::Error> {
        let mut result: BTreeMap<TripleKey, Option<String>> = BTreeMap::new();
        let mut missing: Vec<TripleCombination> = Vec::new();

        for combination in combinations {
            let key = combination.key();
            if result.contains_key(&key) {
                continue;
            }
            let cached = self.triples.as_ref().and_then(|cache| {
                cache.write().get(&hash_str(key.as_str())).cloned()
            });
            match cached {
                Some(id) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    result.insert(key, Some(id));
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    missing.push(combination.clone());
                }
            }
        }

        if !missing.is_empty() {
            for (key, id) in self.inner.resolve_triples(&missing).await? {
                if let (Some(cache), Some(id)) = (&self.triples, &id) {
                    cache.write().put(hash_str(key.as_str()), id.clone());
                }
                result.insert(key, id);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::InMemoryResolver;

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let mut inner = InMemoryResolver::new();
        inner.add_atom("nuclear", "term_1");
        let cached = CachedResolver::new(inner);

        let labels = vec!["Nuclear".to_string()];
        let first = cached.resolve_atoms(&labels).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(cached.stats(), CacheStats { hits: 0, misses: 1 });

        let second = cached.resolve_atoms(&labels).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(cached.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_negative_results_not_cached() {
        let cached = CachedResolver::new(InMemoryResolver::new());
        let labels = vec!["unknown".to_string()];

        assert!(cached.resolve_atoms(&labels).await.unwrap().is_empty());
        assert!(cached.resolve_atoms(&labels).await.unwrap().is_empty());
        // Both lookups went to the inner resolver.
        assert_eq!(cached.stats().misses, 2);
        assert_eq!(cached.stats().hits, 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_passes_through() {
        let mut inner = InMemoryResolver::new();
        inner.add_atom("nuclear", "term_1");
        let cached = CachedResolver::with_config(
            inner,
            CacheConfig {
                max_entries: 10,
                enabled: false,
            },
        );

        let labels = vec!["nuclear".to_string()];
        for _ in 0..3 {
            assert_eq!(cached.resolve_atoms(&labels).await.unwrap().len(), 1);
        }
        assert_eq!(cached.stats().hits, 0);
    }

    #[tokio::test]
    async fn test_triple_cache_round_trip() {
        let mut inner = InMemoryResolver::new();
        let combination = TripleCombination {
            subject_id: "atom:s".to_string(),
            predicate_id: "atom:p".to_string(),
            object_id: "atom:o".to_string(),
        };
        inner.add_triple(combination.key(), "triple_1");
        let cached = CachedResolver::new(inner);

        let combos = vec![combination.clone()];
        let first = cached.resolve_triples(&combos).await.unwrap();
        let second = cached.resolve_triples(&combos).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            second.get(&combination.key()),
            Some(&Some("triple_1".to_string()))
        );
        assert_eq!(cached.stats().hits, 1);
    }
}
