//! Triple types and construction invariants.
//!
//! A `Triple` is the sole semantic primitive: a subject–predicate–object
//! statement whose identity is its content hash. Two invariants are
//! enforced at construction, before any hash is computed:
//!
//! 1. The predicate must resolve to an atom reference, never a nested
//!    triple.
//! 2. Nesting depth is bounded: a flat triple has depth 1, a statement
//!    about a flat statement has depth 2, and anything deeper is rejected.
//!
//! Rejected triples are never silently coerced into a valid shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::term::{TermRef, TripleKey};
use crate::canonical;

/// Maximum nesting depth for a triple (flat = 1).
pub const MAX_TRIPLE_DEPTH: u8 = 2;

/// Who produced a canonical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Produced by the extraction pipeline.
    Agent,
    /// Produced by a human editor.
    User,
}

impl Origin {
    /// Parse origin from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "agent" => Some(Self::Agent),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Error when a triple or edge violates a construction invariant.
///
/// Fatal for the single triple/edge only: the value is rejected before
/// canonicalization and sibling constructions are unaffected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvariantViolation {
    /// The predicate position resolved to a triple reference.
    #[error("triple predicate must be an atom, got {predicate_id}")]
    PredicateNotAtom {
        /// Canonical id of the offending predicate reference.
        predicate_id: String,
    },
    /// Nesting depth beyond the configured bound.
    #[error("nesting depth {depth} exceeds the bound of {max}")]
    DepthExceeded {
        /// Depth the construction would have had.
        depth: u8,
        /// The configured bound.
        max: u8,
    },
    /// An edge whose endpoints resolve to the same term.
    #[error("edge endpoints must differ, both resolve to {id}")]
    SelfEdge {
        /// The shared canonical id.
        id: String,
    },
    /// An edge predicate outside every known predicate class.
    #[error("edge predicate {predicate:?} is not classifiable")]
    UnclassifiedPredicate {
        /// The offending predicate string.
        predicate: String,
    },
}

/// A subject–predicate–object statement with a derived stable key.
///
/// Immutable after construction; the stable key is derived, never assigned
/// by a caller. Subject and object may reference other triples (statements
/// about statements) up to [`MAX_TRIPLE_DEPTH`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triple {
    /// Subject term.
    pub subject: TermRef,
    /// Predicate term (always an atom).
    pub predicate: TermRef,
    /// Object term.
    pub object: TermRef,
    /// Derived content-hash identity.
    pub stable_key: TripleKey,
    /// Nesting depth (flat triple = 1).
    pub depth: u8,
    /// Who proposed this triple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    /// When this triple was first derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Triple {
    /// Construct a triple, enforcing the predicate and depth invariants.
    ///
    /// # Errors
    /// * [`InvariantViolation::PredicateNotAtom`] when the predicate is a
    ///   triple reference; checked before any hash is computed.
    /// * [`InvariantViolation::DepthExceeded`] when subject or object push
    ///   the nesting depth past [`MAX_TRIPLE_DEPTH`].
    pub fn new(
        subject: TermRef,
        predicate: TermRef,
        object: TermRef,
    ) -> Result<Self, InvariantViolation> {
        if !predicate.is_atom() {
            return Err(InvariantViolation::PredicateNotAtom {
                predicate_id: predicate.canonical_id(),
            });
        }

        let depth = 1 + subject.depth().max(object.depth());
        if depth > MAX_TRIPLE_DEPTH {
            return Err(InvariantViolation::DepthExceeded {
                depth,
                max: MAX_TRIPLE_DEPTH,
            });
        }

        let stable_key = canonical::triple_key(&subject, &predicate, &object);
        Ok(Self {
            subject,
            predicate,
            object,
            stable_key,
            depth,
            origin: None,
            created_at: None,
        })
    }

    /// Construct a flat triple from three atom labels.
    pub fn from_labels(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Result<Self, InvariantViolation> {
        Self::new(
            TermRef::atom(subject),
            TermRef::atom(predicate),
            TermRef::atom(object),
        )
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// The stable key.
    pub fn key(&self) -> &TripleKey {
        &self.stable_key
    }

    /// A term reference to this triple, usable as subject/object elsewhere.
    pub fn term_ref(&self) -> TermRef {
        TermRef::Triple {
            key: self.stable_key.clone(),
            label: None,
            depth: self.depth,
        }
    }
}

// Identity is the stable key; metadata does not participate.
impl PartialEq for Triple {
    fn eq(&self, other: &Self) -> bool {
        self.stable_key == other.stable_key
    }
}

impl Eq for Triple {}

impl PartialOrd for Triple {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Triple {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.stable_key.cmp(&other.stable_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(s: &str, p: &str, o: &str) -> Triple {
        Triple::from_labels(s, p, o).unwrap()
    }

    #[test]
    fn test_flat_triple_depth() {
        let t = flat("nuclear", "is", "safe");
        assert_eq!(t.depth, 1);
    }

    #[test]
    fn test_predicate_must_be_atom() {
        let inner = flat("nuclear", "is", "safe");
        let result = Triple::new(
            TermRef::atom("alice"),
            inner.term_ref(),
            TermRef::atom("truth"),
        );
        match result {
            Err(InvariantViolation::PredicateNotAtom { predicate_id }) => {
                assert!(predicate_id.starts_with("triple:"));
            }
            other => panic!("expected PredicateNotAtom, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_subject_allowed() {
        let inner = flat("nuclear", "is", "safe");
        let outer = Triple::new(
            inner.term_ref(),
            TermRef::atom("contradicts"),
            TermRef::atom("policy"),
        )
        .unwrap();
        assert_eq!(outer.depth, 2);
    }

    #[test]
    fn test_depth_bound_enforced() {
        let inner = flat("nuclear", "is", "safe");
        let middle = Triple::new(
            inner.term_ref(),
            TermRef::atom("contradicts"),
            TermRef::atom("policy"),
        )
        .unwrap();
        let result = Triple::new(
            middle.term_ref(),
            TermRef::atom("supports"),
            TermRef::atom("motion"),
        );
        match result {
            Err(InvariantViolation::DepthExceeded { depth, max }) => {
                assert_eq!(depth, 3);
                assert_eq!(max, MAX_TRIPLE_DEPTH);
            }
            other => panic!("expected DepthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_key_identity_ignores_metadata() {
        let a = flat("nuclear", "is", "safe").with_origin(Origin::Agent);
        let b = flat("nuclear", "is", "safe").with_origin(Origin::User);
        assert_eq!(a, b);
        assert_eq!(a.stable_key, b.stable_key);
    }

    #[test]
    fn test_key_normalization_aware() {
        let a = flat("Nuclear ", "IS", "safe");
        let b = flat("nuclear", "is", " Safe");
        assert_eq!(a.stable_key, b.stable_key);
    }

    #[test]
    fn test_origin_parsing() {
        assert_eq!(Origin::from_str("agent"), Some(Origin::Agent));
        assert_eq!(Origin::from_str("USER"), Some(Origin::User));
        assert_eq!(Origin::from_str("other"), None);
    }
}
