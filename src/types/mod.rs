//! Core types for the claim kernel.

pub mod edge;
pub mod post;
pub mod term;
pub mod triple;

pub use edge::{EdgeKind, NestedEdge};
pub use post::{Post, PostId, Topic, TopicId};
pub use term::{AtomKey, EdgeKey, KeyError, TermRef, TripleKey};
pub use triple::{InvariantViolation, Origin, Triple, MAX_TRIPLE_DEPTH};
