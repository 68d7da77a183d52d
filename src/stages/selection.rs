//! Selection stage contract: per-sentence keep/drop + light normalization.
//!
//! Allowed normalization is restricted to hedge-stripping at the sentence
//! start and local, unambiguous pronoun resolution using only the
//! immediately preceding sentence. Anything a backend cannot resolve
//! safely must set `needs_context = true` rather than guess.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::StageError;

/// Input to the selection stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionInput {
    /// Non-empty ancestor headings above the sentence, outermost first.
    pub header_context: Vec<String>,
    /// The immediately preceding sentence, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sentence: Option<String>,
    /// The sentence under consideration.
    pub sentence: String,
}

/// Classification of a kept sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceKind {
    /// Empirically checkable statement.
    Factual,
    /// Ought-statement.
    Normative,
    /// Speaker preference.
    Preference,
    /// Interrogative.
    Question,
    /// Reporting frame about another statement.
    Meta,
    /// Anything else worth keeping.
    Other,
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factual => write!(f, "factual"),
            Self::Normative => write!(f, "normative"),
            Self::Preference => write!(f, "preference"),
            Self::Question => write!(f, "question"),
            Self::Meta => write!(f, "meta"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Raw wire shape of the selection output, prior to shape validation.
///
/// The contract is a union: `{keep: false, reason}` or `{keep: true,
/// sentence, kind, needs_context, missing}`. Deserialize this, then call
/// [`SelectionOutput::into_outcome`] to enforce the union shape strictly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionOutput {
    /// Whether the sentence enters the pipeline.
    pub keep: bool,
    /// Required when `keep` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The (possibly normalized) sentence; required when `keep` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
    /// Classification; required when `keep` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SentenceKind>,
    /// Whether unresolved context remains; required when `keep` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_context: Option<bool>,
    /// What is missing when `needs_context` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

/// Validated selection decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The sentence is dropped from the pipeline.
    Drop {
        /// Why the backend dropped it.
        reason: String,
    },
    /// The sentence continues to decomposition.
    Keep {
        /// Normalized sentence text.
        sentence: String,
        /// Classification.
        kind: SentenceKind,
        /// Whether unresolved context remains.
        needs_context: bool,
        /// What is missing, when context is unresolved.
        missing: Vec<String>,
    },
}

impl SelectionOutput {
    /// Enforce the union shape of the contract.
    ///
    /// # Errors
    /// [`StageError::Schema`] when required fields for the chosen branch
    /// are absent or empty.
    pub fn into_outcome(self) -> Result<SelectionOutcome, StageError> {
        if self.keep {
            let sentence = self
                .sentence
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| StageError::schema("keep:true requires a non-empty sentence"))?;
            let kind = self
                .kind
                .ok_or_else(|| StageError::schema("keep:true requires kind"))?;
            let needs_context = self
                .needs_context
                .ok_or_else(|| StageError::schema("keep:true requires needs_context"))?;
            let missing = self.missing.unwrap_or_default();
            if needs_context && missing.is_empty() {
                return Err(StageError::schema(
                    "needs_context:true requires a non-empty missing list",
                ));
            }
            Ok(SelectionOutcome::Keep {
                sentence,
                kind,
                needs_context,
                missing,
            })
        } else {
            let reason = self
                .reason
                .filter(|r| !r.trim().is_empty())
                .ok_or_else(|| StageError::schema("keep:false requires a reason"))?;
            Ok(SelectionOutcome::Drop { reason })
        }
    }

    /// Build a keep output.
    pub fn keep(sentence: impl Into<String>, kind: SentenceKind) -> Self {
        Self {
            keep: true,
            reason: None,
            sentence: Some(sentence.into()),
            kind: Some(kind),
            needs_context: Some(false),
            missing: Some(Vec::new()),
        }
    }

    /// Build a drop output.
    pub fn drop(reason: impl Into<String>) -> Self {
        Self {
            keep: false,
            reason: Some(reason.into()),
            sentence: None,
            kind: None,
            needs_context: None,
            missing: None,
        }
    }

    /// Mark the output as needing unresolved context.
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.needs_context = Some(true);
        self.missing = Some(missing);
        self
    }
}

/// Capability interface for the selection backend.
#[async_trait]
pub trait SelectionStage: Send + Sync {
    /// Run selection over one sentence.
    async fn run(&self, input: &SelectionInput) -> Result<SelectionOutput, StageError>;
}
