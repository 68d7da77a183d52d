//! Canonical normalization and stable-key derivation.
//!
//! ## Purpose
//!
//! This module defines the **canonical keying specification** for atoms,
//! triples and nested edges. Stable keys ensure that:
//!
//! 1. **Determinism**: same normalized content → same key, regardless of
//!    call order, process instance, or time
//! 2. **Deduplication**: independently deployed pipelines agree on identity
//!    for identical content without a central sequence generator
//! 3. **Namespacing**: structurally identical tuples used for different
//!    purposes (triple vs edge) never collide
//!
//! ## Keying Specification
//!
//! ```text
//! normalize(label)       = lowercase(trim(collapse_ws(nfkc(label))))
//! atom_key(label)        = SHA256("atom:" + normalize(label))
//! id(ref)                = "atom:" + hex | "triple:" + hex
//! triple_key(s, p, o)    = SHA256("triple:" + id(s) + "|" + id(p) + "|" + id(o))
//! edge_key(f, pred, t)   = SHA256("edge:" + id(f) + "|" + id(atom(pred)) + "|" + id(t))
//! ```
//!
//! All digests are rendered as 64-character lowercase hex. The edge
//! predicate string is wrapped as an atom reference before hashing, so edge
//! identity is normalization-aware in the same way atom identity is.
//!
//! ## What Is NOT Included
//!
//! Origin, timestamps, display labels and nesting depth are **excluded**
//! from every preimage. Only normalized content is hashed, so keys are
//! stable across metadata changes.

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::types::term::{AtomKey, EdgeKey, TermRef, TripleKey};

/// Version of the canonical keying specification.
///
/// Increment when the normalization or preimage layout changes. Changes to
/// this version invalidate all existing stable keys.
pub const CANONICAL_KEY_VERSION: &str = "1.0.0";

/// Normalize a label to canonical form.
///
/// Transformations applied, in order:
/// 1. Unicode NFKC (canonical compatibility) normalization
/// 2. Collapse internal whitespace runs to single spaces
/// 3. Trim leading and trailing whitespace
/// 4. Lowercase
///
/// # Determinism
/// This function is deterministic: same input → same output.
///
/// # Example
///
/// ```rust
/// use claim_kernel::canonical::normalize_label;
///
/// assert_eq!(normalize_label("  Nuclear   Energy "), "nuclear energy");
/// ```
pub fn normalize_label(label: &str) -> String {
    let folded: String = label.nfkc().collect();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

fn digest(preimage: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the stable key of an atom from its label.
///
/// The label is normalized first, so `"Nuclear "`, `"nuclear"` and
/// `" Nuclear"` all collapse to one atom key.
pub fn atom_key(label: &str) -> AtomKey {
    AtomKey::from_digest(digest(&format!("atom:{}", normalize_label(label))))
}

/// Compute the stable key of a triple from its three term references.
///
/// The preimage is built from the canonical ids of the parts, so the key is
/// independent of display labels, origin and timestamps. The
/// predicate-must-be-atom invariant is enforced by [`Triple::new`] before
/// this function is reached; callers constructing keys directly are
/// responsible for passing an atom predicate.
///
/// [`Triple::new`]: crate::types::Triple::new
pub fn triple_key(subject: &TermRef, predicate: &TermRef, object: &TermRef) -> TripleKey {
    triple_key_from_ids(
        &subject.canonical_id(),
        &predicate.canonical_id(),
        &object.canonical_id(),
    )
}

/// Compute a triple key from pre-computed canonical term ids.
///
/// Used by the dedup resolver boundary, where (S,P,O) combinations arrive
/// as id strings rather than as `TermRef` values.
pub fn triple_key_from_ids(subject_id: &str, predicate_id: &str, object_id: &str) -> TripleKey {
    TripleKey::from_digest(digest(&format!(
        "triple:{}|{}|{}",
        subject_id, predicate_id, object_id
    )))
}

/// Compute the stable key of a nested edge.
///
/// The predicate string is wrapped as an atom term reference before
/// hashing, and the preimage lives in the `edge:` namespace, so an edge
/// never collides with a structurally identical triple.
pub fn edge_key(from: &TermRef, predicate: &str, to: &TermRef) -> EdgeKey {
    let predicate_ref = TermRef::atom(predicate);
    EdgeKey::from_digest(digest(&format!(
        "edge:{}|{}|{}",
        from.canonical_id(),
        predicate_ref.canonical_id(),
        to.canonical_id()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_label("  Hello   World  "), "hello world");
        assert_eq!(normalize_label("Hello\tWorld"), "hello world");
        assert_eq!(normalize_label("Hello\nWorld"), "hello world");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize_label("NUCLEAR"), "nuclear");
    }

    #[test]
    fn test_normalize_nfkc() {
        // Fullwidth latin letters fold to ASCII under NFKC.
        assert_eq!(normalize_label("Ｎｕｃｌｅａｒ"), "nuclear");
        // The fi ligature decomposes.
        assert_eq!(normalize_label("ﬁre"), "fire");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_label(""), "");
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn test_atom_key_determinism() {
        let k1 = atom_key("nuclear energy");
        let k2 = atom_key("nuclear energy");
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_atom_key_case_and_whitespace_insensitive() {
        let base = atom_key("nuclear");
        assert_eq!(atom_key("Nuclear "), base);
        assert_eq!(atom_key(" NUCLEAR"), base);
        assert_eq!(atom_key("nu clear"), atom_key("nu  clear"));
    }

    #[test]
    fn test_atom_key_content_sensitive() {
        assert_ne!(atom_key("nuclear"), atom_key("coal"));
    }

    #[test]
    fn test_atom_key_format() {
        let key = atom_key("test");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_atom_key_known_value() {
        // SHA-256("atom:nuclear"): pins the preimage layout.
        let expected = {
            let mut h = Sha256::new();
            h.update(b"atom:nuclear");
            hex::encode(h.finalize())
        };
        assert_eq!(atom_key("Nuclear").as_str(), expected);
    }

    #[test]
    fn test_triple_key_determinism() {
        let s = TermRef::atom("nuclear");
        let p = TermRef::atom("is");
        let o = TermRef::atom("safe");
        assert_eq!(triple_key(&s, &p, &o), triple_key(&s, &p, &o));
    }

    #[test]
    fn test_triple_key_sensitive_to_each_part() {
        let s = TermRef::atom("nuclear");
        let p = TermRef::atom("is");
        let o = TermRef::atom("safe");
        let base = triple_key(&s, &p, &o);

        assert_ne!(triple_key(&TermRef::atom("coal"), &p, &o), base);
        assert_ne!(triple_key(&s, &TermRef::atom("was"), &o), base);
        assert_ne!(triple_key(&s, &p, &TermRef::atom("clean")), base);
    }

    #[test]
    fn test_triple_key_insensitive_to_label_surface() {
        let base = triple_key(
            &TermRef::atom("nuclear"),
            &TermRef::atom("is"),
            &TermRef::atom("safe"),
        );
        let surfaced = triple_key(
            &TermRef::atom(" Nuclear "),
            &TermRef::atom("IS"),
            &TermRef::atom("Safe"),
        );
        assert_eq!(base, surfaced);
    }

    #[test]
    fn test_edge_and_triple_namespaces_disjoint() {
        let s = TermRef::atom("nuclear");
        let o = TermRef::atom("safe");
        let t = triple_key(&s, &TermRef::atom("but"), &o);
        let e = edge_key(&s, "but", &o);
        assert_ne!(t.as_str(), e.as_str());
    }

    #[test]
    fn test_edge_key_predicate_normalized() {
        let s = TermRef::atom("a");
        let o = TermRef::atom("b");
        assert_eq!(edge_key(&s, "Because", &o), edge_key(&s, "because ", &o));
    }
}
