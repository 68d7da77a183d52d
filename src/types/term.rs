//! Term references and stable-key newtypes.
//!
//! A `TermRef` is the canonical way to point at a concept (`Atom`) or at a
//! statement (`Triple`) from inside another statement. It is a closed tagged
//! union so that the predicate-must-be-atom invariant can be checked
//! exhaustively at every construction and serialization site.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical;

/// Error when parsing a stable key from its textual form.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KeyError {
    /// The string is not a 64-character lowercase hex digest.
    #[error("expected a 64-character lowercase hex digest, got {0:?}")]
    InvalidDigest(String),
}

fn check_digest(s: &str) -> Result<(), KeyError> {
    let ok = s.len() == 64
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if ok {
        Ok(())
    } else {
        Err(KeyError::InvalidDigest(s.to_string()))
    }
}

macro_rules! key_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a key from its 64-character lowercase hex form.
            pub fn from_hex(s: &str) -> Result<Self, KeyError> {
                check_digest(s)?;
                Ok(Self(s.to_string()))
            }

            /// Wrap a digest produced by the canonicalizer.
            pub(crate) fn from_digest(digest: String) -> Self {
                debug_assert!(check_digest(&digest).is_ok());
                Self(digest)
            }

            /// The hex digest as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

key_type! {
    /// Stable key of an atom: SHA-256 over `"atom:" + normalized label`.
    AtomKey
}
key_type! {
    /// Stable key of a triple: SHA-256 over the `triple:` preimage.
    TripleKey
}
key_type! {
    /// Stable key of a nested edge: SHA-256 over the `edge:` preimage.
    EdgeKey
}

/// Reference to a term: either a leaf concept or another statement.
///
/// Immutable value; the same `TermRef` may appear in many triples and edges.
/// `Triple` refs carry the nesting depth of the statement they point at so
/// the depth bound can be enforced without dereferencing a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TermRef {
    /// A leaf term referencing a single labeled concept.
    Atom {
        /// Stable key derived from the normalized label.
        key: AtomKey,
        /// The label as it arrived (pre-normalization).
        label: String,
    },
    /// A reference to another triple, enabling statements about statements.
    Triple {
        /// Stable key of the referenced triple.
        key: TripleKey,
        /// Optional human-readable label for display.
        label: Option<String>,
        /// Nesting depth of the referenced triple (flat triple = 1).
        depth: u8,
    },
}

impl TermRef {
    /// Create an atom reference; the key is derived from the normalized label.
    pub fn atom(label: impl Into<String>) -> Self {
        let label = label.into();
        let key = canonical::atom_key(&label);
        Self::Atom { key, label }
    }

    /// Whether this reference points at an atom.
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom { .. })
    }

    /// Whether this reference points at a triple.
    pub fn is_triple(&self) -> bool {
        matches!(self, Self::Triple { .. })
    }

    /// The display label, if one is carried.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Atom { label, .. } => Some(label),
            Self::Triple { label, .. } => label.as_deref(),
        }
    }

    /// Nesting depth contributed by this reference (0 for atoms).
    pub fn depth(&self) -> u8 {
        match self {
            Self::Atom { .. } => 0,
            Self::Triple { depth, .. } => *depth,
        }
    }

    /// Canonical textual identity used inside composite hashes:
    /// `"atom:<hex>"` or `"triple:<hex>"`.
    pub fn canonical_id(&self) -> String {
        match self {
            Self::Atom { key, .. } => format!("atom:{}", key.as_str()),
            Self::Triple { key, .. } => format!("triple:{}", key.as_str()),
        }
    }
}

impl fmt::Display for TermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "{}", self.canonical_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_key_normalization_insensitive() {
        let a = TermRef::atom("Nuclear ");
        let b = TermRef::atom("nuclear");
        let c = TermRef::atom(" Nuclear");
        assert_eq!(a.canonical_id(), b.canonical_id());
        assert_eq!(b.canonical_id(), c.canonical_id());
    }

    #[test]
    fn test_canonical_id_namespaces() {
        let atom = TermRef::atom("energy");
        assert!(atom.canonical_id().starts_with("atom:"));
        assert!(atom.is_atom());
        assert!(!atom.is_triple());
    }

    #[test]
    fn test_key_from_hex_rejects_bad_input() {
        assert!(AtomKey::from_hex("abc").is_err());
        assert!(AtomKey::from_hex(&"G".repeat(64)).is_err());
        let valid = "a".repeat(64);
        assert!(AtomKey::from_hex(&valid).is_ok());
    }

    #[test]
    fn test_atom_depth_is_zero() {
        assert_eq!(TermRef::atom("coal").depth(), 0);
    }
}
