//! Editorial containers: posts and topics.
//!
//! These types never define graph structure; they reference triples by
//! stable key only. `proposed_triples` is populated by one pipeline run;
//! `validated_triples` is a reviewer-approved subset written by the
//! editorial collaborator, not by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::term::TripleKey;

/// Unique identifier for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(Uuid);

impl PostId {
    /// Create a new PostId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a new PostId from a UUID string.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Generate a new random PostId.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicId(Uuid);

impl TopicId {
    /// Create a new TopicId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Generate a new random TopicId.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A debate post and the triples extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique post identifier.
    pub id: PostId,
    /// Raw submission text.
    pub text: String,
    /// Key of the claim this post leads with, once designated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_triple_key: Option<TripleKey>,
    /// Triple keys proposed by the extraction pipeline.
    pub proposed_triples: Vec<TripleKey>,
    /// Reviewer-approved subset of the proposals.
    pub validated_triples: Vec<TripleKey>,
    /// Whether editorial review has completed.
    pub is_validated: bool,
    /// Unix timestamp of creation.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with no proposals yet.
    pub fn new(id: PostId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            main_triple_key: None,
            proposed_triples: Vec::new(),
            validated_triples: Vec::new(),
            is_validated: false,
            created_at,
        }
    }

    /// Record the proposals from one pipeline run, skipping duplicates.
    pub fn record_proposals(&mut self, keys: impl IntoIterator<Item = TripleKey>) {
        for key in keys {
            if !self.proposed_triples.contains(&key) {
                self.proposed_triples.push(key);
            }
        }
    }

    /// Designate the main claim; the key must already be proposed.
    pub fn set_main_triple(&mut self, key: TripleKey) -> bool {
        if self.proposed_triples.contains(&key) {
            self.main_triple_key = Some(key);
            true
        } else {
            false
        }
    }
}

/// Optional grouping of posts under a shared debate subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Unique topic identifier.
    pub id: TopicId,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: DateTime<Utc>,
}

impl Topic {
    /// Create a new topic.
    pub fn new(id: TopicId, title: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            created_at,
        }
    }
}
