//! Extraction pipeline orchestrator.
//!
//! One submission flows through a fixed stage sequence:
//!
//! ```text
//! Segmenting
//!   → PerSentence(Selecting → Decomposing → Parsing → Canonicalizing)
//!   → RelationLinking (per sentence batch)
//!   → EdgeBuilding
//!   → [StanceVerification, when a parent + stance is given]
//!   → Resolving
//!   → Done
//! ```
//!
//! No stage may be skipped or reordered. Decomposition output order is
//! load-bearing: relation-linking indexes claims positionally within a
//! sentence and downstream consumers pick claim 0 as the main claim.
//!
//! ## Partial-failure policy
//!
//! A timeout or contract violation for one sentence drops only that
//! sentence's contribution; siblings continue. The orchestrator returns
//! whatever was successfully canonicalized together with a structured
//! warning list. Total failure is reserved for empty input and for the
//! case where every stage call fails for every sentence.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::resolver::{DedupResolver, TripleCombination};
use crate::segmenter::{Segment, Segmenter};
use crate::stages::{
    CandidateClaim, ClaimParser, ClaimSlot, CoreTriple, DecompositionInput, DecompositionStage,
    RelationInput, RelationStage, SelectionInput, SelectionOutcome, SelectionStage, Stance,
    StanceInput, StanceStage, StanceVerification, StageError, StageKind,
};
use crate::types::{NestedEdge, Origin, TermRef, Triple, TripleKey};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Deadline for every individual stage backend call.
    pub stage_timeout: Duration,
    /// Maximum labels/combinations per resolver batch.
    pub resolver_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(30),
            resolver_batch_size: 64,
        }
    }
}

/// A declared relationship to a parent claim.
#[derive(Debug, Clone)]
pub struct ParentStance {
    /// The parent claim being agreed or disagreed with.
    pub parent_claim: String,
    /// The stance the author declared.
    pub stance: Stance,
}

/// One unit of work: a text block, optionally replying to a parent claim.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Raw markdown text.
    pub text: String,
    /// Present when the post replies to a parent claim.
    pub parent: Option<ParentStance>,
}

impl Submission {
    /// A standalone submission.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent: None,
        }
    }

    /// A submission replying to a parent claim with a declared stance.
    pub fn replying_to(
        text: impl Into<String>,
        parent_claim: impl Into<String>,
        stance: Stance,
    ) -> Self {
        Self {
            text: text.into(),
            parent: Some(ParentStance {
                parent_claim: parent_claim.into(),
                stance,
            }),
        }
    }
}

/// The injected stage backends, constructed once and shared.
#[derive(Clone)]
pub struct StageSet {
    /// Selection backend.
    pub selection: Arc<dyn SelectionStage>,
    /// Decomposition backend.
    pub decomposition: Arc<dyn DecompositionStage>,
    /// Claim parser.
    pub parser: Arc<dyn ClaimParser>,
    /// Relation-linking backend.
    pub relations: Arc<dyn RelationStage>,
    /// Stance-verification backend.
    pub stance: Arc<dyn StanceStage>,
}

impl StageSet {
    /// Wire every capability to one backend implementing all of them.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SelectionStage
            + DecompositionStage
            + ClaimParser
            + RelationStage
            + StanceStage
            + 'static,
    {
        Self {
            selection: backend.clone(),
            decomposition: backend.clone(),
            parser: backend.clone(),
            relations: backend.clone(),
            stance: backend,
        }
    }
}

/// A dropped contribution, kept for observability.
#[derive(Debug, Clone)]
pub struct PipelineWarning {
    /// Index of the affected sentence, when sentence-scoped.
    pub sentence: Option<usize>,
    /// The stage that failed.
    pub stage: StageKind,
    /// Human-readable reason.
    pub reason: String,
}

/// Fatal pipeline outcomes.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The submission text was empty or whitespace-only.
    #[error("submission text is empty")]
    EmptyInput,
    /// Every stage call failed for every sentence (complete backend outage).
    #[error("every stage call failed for every sentence")]
    AllSentencesFailed {
        /// The failures, one or more per sentence.
        warnings: Vec<PipelineWarning>,
    },
}

/// One canonicalized claim, positioned within its sentence.
#[derive(Debug, Clone)]
pub struct ExtractedClaim {
    /// Index of the source sentence within the submission.
    pub sentence_index: usize,
    /// Index of the claim within its sentence's decomposition.
    pub claim_index: usize,
    /// Claim text.
    pub text: String,
    /// The (subject, predicate, object) strings before canonicalization.
    pub core: CoreTriple,
    /// The canonicalized triple.
    pub triple: Triple,
}

/// What the dedup resolver reported about this submission's batch.
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    /// Normalized label → canonical id, for atoms the store already knows.
    pub existing_atoms: BTreeMap<String, String>,
    /// Normalized labels the store does not know yet.
    pub new_atoms: Vec<String>,
    /// Stable key → canonical id, for triples the store already knows.
    pub existing_triples: BTreeMap<TripleKey, String>,
    /// Stable keys the store does not know yet.
    pub new_triples: Vec<TripleKey>,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Canonicalized claims in sentence, then claim order.
    pub claims: Vec<ExtractedClaim>,
    /// Discourse edges between claims, in sentence order.
    pub edges: Vec<NestedEdge>,
    /// Stance verdicts; empty when no parent was given.
    pub verifications: Vec<StanceVerification>,
    /// Dropped contributions.
    pub warnings: Vec<PipelineWarning>,
    /// Dedup reconciliation against the store of record.
    pub resolution: ResolutionReport,
}

struct SentenceClaim {
    text: String,
    core: CoreTriple,
    triple: Triple,
}

struct SentenceOutcome {
    index: usize,
    /// The kept (selection-normalized) sentence, when selection kept it.
    sentence: Option<String>,
    claims: Vec<SentenceClaim>,
    warnings: Vec<PipelineWarning>,
    /// Whether a stage backend call failed for this sentence.
    had_stage_failure: bool,
}

impl SentenceOutcome {
    fn new(index: usize) -> Self {
        Self {
            index,
            sentence: None,
            claims: Vec::new(),
            warnings: Vec::new(),
            had_stage_failure: false,
        }
    }

    fn warn(&mut self, stage: StageKind, reason: impl ToString) {
        push_warning(&mut self.warnings, Some(self.index), stage, reason);
    }
}

fn push_warning(
    warnings: &mut Vec<PipelineWarning>,
    sentence: Option<usize>,
    stage: StageKind,
    reason: impl ToString,
) {
    let reason = reason.to_string();
    tracing::warn!(
        sentence = ?sentence,
        stage = %stage,
        reason = %reason,
        "pipeline contribution dropped"
    );
    warnings.push(PipelineWarning {
        sentence,
        stage,
        reason,
    });
}

/// The extraction pipeline for one deployment.
///
/// Stage backends and the resolver are injected once at construction;
/// concurrent submissions share them without further coordination because
/// both are idempotent from this crate's perspective.
pub struct ExtractionPipeline<R: DedupResolver> {
    stages: StageSet,
    resolver: Arc<R>,
    segmenter: Segmenter,
    config: PipelineConfig,
}

impl<R: DedupResolver> ExtractionPipeline<R> {
    /// Create a pipeline.
    pub fn new(stages: StageSet, resolver: Arc<R>, config: PipelineConfig) -> Self {
        Self {
            stages,
            resolver,
            segmenter: Segmenter::new(),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one submission through the full stage sequence.
    ///
    /// # Errors
    /// * [`PipelineError::EmptyInput`] for empty or whitespace-only text.
    /// * [`PipelineError::AllSentencesFailed`] when every stage call
    ///   failed for every sentence.
    pub async fn run(&self, submission: &Submission) -> Result<PipelineOutput, PipelineError> {
        if submission.text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let segments = self.segmenter.segment(&submission.text);
        let mut warnings = Vec::new();

        // Selection and decomposition for different sentences are
        // independent; results are re-joined by original sentence index
        // because relation-linking assumes stable per-sentence claim
        // indices.
        let outcomes = join_all(segments.iter().enumerate().map(|(index, segment)| {
            let previous = index
                .checked_sub(1)
                .map(|prev| segments[prev].sentence.clone());
            self.process_sentence(index, segment, previous)
        }))
        .await;

        if !outcomes.is_empty() && outcomes.iter().all(|o| o.had_stage_failure) {
            let warnings = outcomes.into_iter().flat_map(|o| o.warnings).collect();
            return Err(PipelineError::AllSentencesFailed { warnings });
        }

        let mut edges: Vec<NestedEdge> = Vec::new();
        for outcome in &outcomes {
            self.link_sentence(outcome, &mut edges, &mut warnings).await;
        }

        let claims: Vec<ExtractedClaim> = outcomes
            .iter()
            .flat_map(|outcome| {
                outcome
                    .claims
                    .iter()
                    .enumerate()
                    .map(move |(claim_index, claim)| ExtractedClaim {
                        sentence_index: outcome.index,
                        claim_index,
                        text: claim.text.clone(),
                        core: claim.core.clone(),
                        triple: claim.triple.clone(),
                    })
            })
            .collect();

        let verifications = match &submission.parent {
            Some(parent) if !claims.is_empty() => {
                self.verify_stance(parent, &claims, &mut warnings).await
            }
            _ => Vec::new(),
        };

        for outcome in outcomes {
            warnings.extend(outcome.warnings);
        }

        let resolution = self.resolve_batch(&claims, &edges, &mut warnings).await;

        Ok(PipelineOutput {
            claims,
            edges,
            verifications,
            warnings,
            resolution,
        })
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, StageError>>,
    ) -> Result<T, StageError> {
        match tokio::time::timeout(self.config.stage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StageError::Timeout(self.config.stage_timeout)),
        }
    }

    async fn process_sentence(
        &self,
        index: usize,
        segment: &Segment,
        previous: Option<String>,
    ) -> SentenceOutcome {
        let mut outcome = SentenceOutcome::new(index);

        let selection_input = SelectionInput {
            header_context: segment.header_path.clone(),
            previous_sentence: previous,
            sentence: segment.sentence.clone(),
        };
        let selected = match self.call(self.stages.selection.run(&selection_input)).await {
            Ok(output) => match output.into_outcome() {
                Ok(selected) => selected,
                Err(e) => {
                    outcome.had_stage_failure = true;
                    outcome.warn(StageKind::Selection, e);
                    return outcome;
                }
            },
            Err(e) => {
                outcome.had_stage_failure = true;
                outcome.warn(StageKind::Selection, e);
                return outcome;
            }
        };

        let (sentence, needs_context) = match selected {
            SelectionOutcome::Drop { reason } => {
                tracing::debug!(sentence = index, reason = %reason, "sentence dropped by selection");
                return outcome;
            }
            SelectionOutcome::Keep {
                sentence,
                needs_context,
                ..
            } => (sentence, needs_context),
        };
        if needs_context {
            tracing::debug!(sentence = index, "kept sentence carries unresolved context");
        }

        let decomposition_input = DecompositionInput {
            header_context: segment.header_path.clone(),
            sentence: sentence.clone(),
        };
        let decomposed = match self
            .call(self.stages.decomposition.run(&decomposition_input))
            .await
            .and_then(|output| {
                output.validate()?;
                Ok(output)
            }) {
            Ok(output) => output,
            Err(e) => {
                outcome.had_stage_failure = true;
                outcome.warn(StageKind::Decomposition, e);
                return outcome;
            }
        };

        outcome.sentence = Some(sentence);
        for claim_text in decomposed.claims {
            let core = match self.call(self.stages.parser.run(&claim_text)).await {
                Ok(core) => core,
                Err(e) => {
                    outcome.had_stage_failure = true;
                    outcome.warn(StageKind::ClaimParsing, e);
                    continue;
                }
            };
            let triple = Triple::new(
                TermRef::atom(core.subject.clone()),
                TermRef::atom(core.predicate.clone()),
                TermRef::atom(core.object.clone()),
            );
            match triple {
                Ok(triple) => outcome.claims.push(SentenceClaim {
                    text: claim_text,
                    core,
                    triple: triple.with_origin(Origin::Agent),
                }),
                Err(violation) => outcome.warn(StageKind::Canonicalization, violation),
            }
        }

        outcome
    }

    async fn link_sentence(
        &self,
        outcome: &SentenceOutcome,
        edges: &mut Vec<NestedEdge>,
        warnings: &mut Vec<PipelineWarning>,
    ) {
        // A relation needs two claims; a single-claim sentence has nothing
        // to link.
        let sentence = match (&outcome.sentence, outcome.claims.len()) {
            (Some(sentence), n) if n >= 2 => sentence.clone(),
            _ => return,
        };

        let input = RelationInput {
            sentence,
            claims: outcome
                .claims
                .iter()
                .enumerate()
                .map(|(index, claim)| ClaimSlot {
                    index,
                    text: claim.text.clone(),
                    core_triple: claim.core.clone(),
                })
                .collect(),
        };

        let output = match self
            .call(self.stages.relations.run(&input))
            .await
            .and_then(|output| {
                output.validate(outcome.claims.len())?;
                Ok(output)
            }) {
            Ok(output) => output,
            Err(e) => {
                push_warning(warnings, Some(outcome.index), StageKind::RelationLinking, e);
                return;
            }
        };

        for relation in output.relations {
            let subject = outcome.claims[relation.from].triple.term_ref();
            let object = outcome.claims[relation.to].triple.term_ref();
            match NestedEdge::from_relation(Origin::Agent, relation.predicate, subject, object) {
                Ok(edge) => {
                    if !edges.contains(&edge) {
                        edges.push(edge);
                    }
                }
                Err(violation) => {
                    push_warning(
                        warnings,
                        Some(outcome.index),
                        StageKind::EdgeBuilding,
                        violation,
                    );
                }
            }
        }
    }

    async fn verify_stance(
        &self,
        parent: &ParentStance,
        claims: &[ExtractedClaim],
        warnings: &mut Vec<PipelineWarning>,
    ) -> Vec<StanceVerification> {
        // Candidates are deduplicated by stable key: content addressing
        // makes a repeated claim the same claim.
        let mut seen: BTreeSet<TripleKey> = BTreeSet::new();
        let mut candidates = Vec::new();
        for claim in claims {
            if seen.insert(claim.triple.stable_key.clone()) {
                candidates.push(CandidateClaim {
                    stable_key: claim.triple.stable_key.clone(),
                    text: claim.text.clone(),
                    triple: claim.core.clone(),
                });
            }
        }
        let expected: Vec<TripleKey> = candidates.iter().map(|c| c.stable_key.clone()).collect();

        let input = StanceInput {
            parent_claim: parent.parent_claim.clone(),
            user_stance: parent.stance,
            claims: candidates,
        };

        match self
            .call(self.stages.stance.run(&input))
            .await
            .and_then(|output| {
                output.validate(&expected)?;
                Ok(output)
            }) {
            Ok(output) => output.verifications,
            Err(e) => {
                push_warning(warnings, None, StageKind::StanceVerification, e);
                Vec::new()
            }
        }
    }

    async fn resolve_batch(
        &self,
        claims: &[ExtractedClaim],
        edges: &[NestedEdge],
        warnings: &mut Vec<PipelineWarning>,
    ) -> ResolutionReport {
        let mut report = ResolutionReport::default();

        // Group labels by normalized form: one external lookup per group,
        // regardless of how many surface forms occurred.
        let mut normalized_labels: BTreeSet<String> = BTreeSet::new();
        for claim in claims {
            for label in [&claim.core.subject, &claim.core.predicate, &claim.core.object] {
                normalized_labels.insert(crate::canonical::normalize_label(label));
            }
        }
        for edge in edges {
            normalized_labels.insert(crate::canonical::normalize_label(&edge.predicate));
        }

        let labels: Vec<String> = normalized_labels.iter().cloned().collect();
        let atom_batches: Vec<Vec<String>> = labels
            .chunks(self.config.resolver_batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let atom_results = join_all(
            atom_batches
                .iter()
                .map(|batch| self.resolver.resolve_atoms(batch)),
        )
        .await;
        for result in atom_results {
            match result {
                Ok(resolved) => {
                    for atom in resolved {
                        report
                            .existing_atoms
                            .insert(atom.normalized_label, atom.canonical_id);
                    }
                }
                Err(e) => push_warning(warnings, None, StageKind::Resolution, e),
            }
        }
        report.new_atoms = normalized_labels
            .into_iter()
            .filter(|label| !report.existing_atoms.contains_key(label))
            .collect();

        let mut combinations: BTreeMap<TripleKey, TripleCombination> = BTreeMap::new();
        for claim in claims {
            combinations
                .entry(claim.triple.stable_key.clone())
                .or_insert_with(|| TripleCombination {
                    subject_id: claim.triple.subject.canonical_id(),
                    predicate_id: claim.triple.predicate.canonical_id(),
                    object_id: claim.triple.object.canonical_id(),
                });
        }
        let all_keys: BTreeSet<TripleKey> = combinations.keys().cloned().collect();
        let unique_combinations: Vec<TripleCombination> = combinations.into_values().collect();
        let triple_batches: Vec<Vec<TripleCombination>> = unique_combinations
            .chunks(self.config.resolver_batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let triple_results = join_all(
            triple_batches
                .iter()
                .map(|batch| self.resolver.resolve_triples(batch)),
        )
        .await;
        for result in triple_results {
            match result {
                Ok(resolved) => {
                    for (key, id) in resolved {
                        if let Some(id) = id {
                            report.existing_triples.insert(key, id);
                        }
                    }
                }
                Err(e) => push_warning(warnings, None, StageKind::Resolution, e),
            }
        }
        report.new_triples = all_keys
            .into_iter()
            .filter(|key| !report.existing_triples.contains_key(key))
            .collect();

        report
    }
}
