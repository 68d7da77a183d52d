//! Nested discourse edges between term references.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::term::{EdgeKey, TermRef};
use super::triple::{InvariantViolation, Origin};
use crate::canonical;

/// Kind of discourse relation an edge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Explicit connective between two claims (contrast, cause, conjunction).
    Relation,
    /// Reporting/attribution: a claim about who asserted another claim.
    Meta,
    /// Condition attachment (if/unless/when).
    Conditional,
    /// Qualifier attachment (which-clause modal consequence).
    Modifier,
}

impl EdgeKind {
    /// Parse edge kind from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relation" => Some(Self::Relation),
            "meta" => Some(Self::Meta),
            "conditional" => Some(Self::Conditional),
            "modifier" => Some(Self::Modifier),
            _ => None,
        }
    }

    /// Classify a predicate string into its edge kind.
    ///
    /// Conditional markers map to `Conditional`, the which-clause modal
    /// consequence forms to `Modifier`, attribution verbs to `Meta`, and
    /// the remaining closed-vocabulary connectives to `Relation`. Unknown
    /// predicates are not classifiable.
    pub fn from_predicate(predicate: &str) -> Option<Self> {
        let p = canonical::normalize_label(predicate);
        match p.as_str() {
            "if" | "unless" | "when" => Some(Self::Conditional),
            "could lead to" | "may lead to" | "might lead to" | "will lead to" => {
                Some(Self::Modifier)
            }
            "said" | "says" | "found" | "argued" | "reported" | "claimed" => Some(Self::Meta),
            "but" | "however" | "although" | "because" | "therefore" | "so" | "and" | "or" => {
                Some(Self::Relation)
            }
            _ => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relation => write!(f, "relation"),
            Self::Meta => write!(f, "meta"),
            Self::Conditional => write!(f, "conditional"),
            Self::Modifier => write!(f, "modifier"),
        }
    }
}

/// A discourse relation between two term references.
///
/// Lives in a hash namespace distinct from triples: an edge and a triple
/// over the same `(from, predicate, to)` tuple never share a key.
/// Implements `Ord` by stable key for deterministic ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedEdge {
    /// Relation class.
    pub kind: EdgeKind,
    /// Who asserted the relation.
    pub origin: Origin,
    /// Predicate surface form (e.g. `"because"`, `"could lead to"`).
    pub predicate: String,
    /// Source term.
    pub subject: TermRef,
    /// Target term.
    pub object: TermRef,
    /// Derived content-hash identity.
    pub stable_key: EdgeKey,
}

impl NestedEdge {
    /// Construct an edge with an explicit kind.
    ///
    /// # Errors
    /// [`InvariantViolation::SelfEdge`] when both endpoints resolve to the
    /// same canonical term.
    pub fn new(
        kind: EdgeKind,
        origin: Origin,
        predicate: impl Into<String>,
        subject: TermRef,
        object: TermRef,
    ) -> Result<Self, InvariantViolation> {
        let predicate = predicate.into();
        let subject_id = subject.canonical_id();
        if subject_id == object.canonical_id() {
            return Err(InvariantViolation::SelfEdge { id: subject_id });
        }

        let stable_key = canonical::edge_key(&subject, &predicate, &object);
        Ok(Self {
            kind,
            origin,
            predicate,
            subject,
            object,
            stable_key,
        })
    }

    /// Construct an edge, deriving the kind from the predicate class.
    ///
    /// # Errors
    /// [`InvariantViolation::UnclassifiedPredicate`] when the predicate
    /// belongs to no known class; [`InvariantViolation::SelfEdge`] as for
    /// [`NestedEdge::new`].
    pub fn from_relation(
        origin: Origin,
        predicate: impl Into<String>,
        subject: TermRef,
        object: TermRef,
    ) -> Result<Self, InvariantViolation> {
        let predicate = predicate.into();
        let kind = EdgeKind::from_predicate(&predicate).ok_or_else(|| {
            InvariantViolation::UnclassifiedPredicate {
                predicate: predicate.clone(),
            }
        })?;
        Self::new(kind, origin, predicate, subject, object)
    }

    /// The stable key.
    pub fn key(&self) -> &EdgeKey {
        &self.stable_key
    }
}

impl PartialEq for NestedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.stable_key == other.stable_key
    }
}

impl Eq for NestedEdge {}

impl PartialOrd for NestedEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NestedEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.stable_key.cmp(&other.stable_key)
    }
}
