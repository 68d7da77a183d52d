//! Deterministic fixture backends for every stage capability.
//!
//! Rule-based implementations used by tests and as the substitutable
//! stub the stage contracts require. The rules are ordered surface
//! patterns over explicit discourse markers; they make no attempt at the
//! semantic judgment a production backend provides, but they honor every
//! contract shape and ordering guarantee.

use async_trait::async_trait;
use regex_lite::Regex;

use super::decomposition::{DecompositionInput, DecompositionOutput, DecompositionStage};
use super::parser::{ClaimParser, CoreTriple};
use super::relation::{Relation, RelationInput, RelationOutput, RelationStage};
use super::selection::{SelectionInput, SelectionOutput, SelectionStage, SentenceKind};
use super::stance::{Stance, StanceInput, StanceOutput, StanceStage, StanceVerification};
use super::StageError;

const HEDGES: &[&str] = &[
    "I think that ",
    "I think ",
    "I believe that ",
    "I believe ",
    "In my opinion, ",
    "In my opinion ",
    "Honestly, ",
    "Maybe ",
    "Perhaps ",
];

const PRONOUN_OPENERS: &[&str] = &["It", "They", "This", "That", "These", "Those", "He", "She"];

const VERBS: &[&str] = &[
    "is", "are", "was", "were", "has", "have", "had", "should", "must", "can", "could", "may",
    "might", "will", "would", "requires", "produces", "uses", "contains", "includes", "emits",
    "causes", "pollutes", "leads", "lead", "fell", "rose", "raised", "said", "says", "found",
    "argued", "reported", "claimed", "supports", "refutes", "needs", "costs", "creates",
    "reduces", "increases",
];

/// One deterministic backend implementing all five stage capabilities.
pub struct FixtureBackend {
    attribution: Regex,
    conditional: Regex,
    which_consequence: Regex,
    because: Regex,
    therefore: Regex,
    contrast: Regex,
    conjunction: Regex,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureBackend {
    /// Build the backend with its compiled patterns.
    pub fn new() -> Self {
        Self {
            attribution: Regex::new(
                r"^([A-Z][A-Za-z .]*?) (said|says|found|argued|reported|claimed) that (.+?)\.?$",
            )
            .expect("attribution pattern is valid"),
            conditional: Regex::new(r"^(If|Unless|When) ([^,]+), (?:then )?(.+?)\.?$")
                .expect("conditional pattern is valid"),
            which_consequence: Regex::new(r"^(.+?), which (could|may|might|will) lead to (.+?)\.?$")
                .expect("which pattern is valid"),
            because: Regex::new(r"^(.+?) because (.+?)\.?$").expect("because pattern is valid"),
            therefore: Regex::new(r"^(.+?)(, so |, therefore |; therefore, )(.+?)\.?$")
                .expect("therefore pattern is valid"),
            contrast: Regex::new(r"^(.+?),? (but|however|although) (.+?)\.?$")
                .expect("contrast pattern is valid"),
            conjunction: Regex::new(r"^(.+?), (and|or) (.+?)\.?$")
                .expect("conjunction pattern is valid"),
        }
    }

    fn classify(&self, sentence: &str) -> SentenceKind {
        if self.attribution.is_match(sentence) {
            return SentenceKind::Meta;
        }
        let lower = format!(" {} ", sentence.to_lowercase());
        if lower.contains(" should ") || lower.contains(" must ") || lower.contains(" ought ") {
            return SentenceKind::Normative;
        }
        if sentence.starts_with("I prefer") || sentence.starts_with("I like") {
            return SentenceKind::Preference;
        }
        SentenceKind::Factual
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Trim, capitalize, and guarantee a terminal period.
fn as_sentence(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches(['.', ',', ';']);
    format!("{}.", capitalize(trimmed))
}

/// Complete an elliptical clause by borrowing the left clause's subject.
///
/// A right-hand clause that opens with a verb ("pollutes heavily") has no
/// subject of its own; one that opens with anything else is a full clause.
fn complete_clause(left: &str, right: &str) -> String {
    let right = right.trim();
    let first_word = right.split_whitespace().next().unwrap_or("").to_lowercase();
    if VERBS.contains(&first_word.as_str()) {
        if let Some(subject) = left.split_whitespace().next() {
            return as_sentence(&format!("{} {}", subject, right));
        }
    }
    as_sentence(right)
}

#[async_trait]
impl SelectionStage for FixtureBackend {
    async fn run(&self, input: &SelectionInput) -> Result<SelectionOutput, StageError> {
        let mut sentence = input.sentence.trim().to_string();
        if sentence.is_empty() {
            return Ok(SelectionOutput::drop("empty"));
        }

        let lower = sentence.to_lowercase();
        if lower.starts_with("hello") || lower.starts_with("hi ") || lower.starts_with("thanks") {
            return Ok(SelectionOutput::drop("greeting"));
        }

        for hedge in HEDGES {
            if let Some(stripped) = sentence.strip_prefix(hedge) {
                sentence = capitalize(stripped);
                break;
            }
        }

        if sentence.ends_with('?') {
            return Ok(SelectionOutput::drop("question"));
        }

        let kind = self.classify(&sentence);
        let first_word = sentence.split_whitespace().next().unwrap_or("").to_string();
        if PRONOUN_OPENERS.contains(&first_word.as_str()) && input.previous_sentence.is_none() {
            return Ok(SelectionOutput::keep(sentence, kind)
                .with_missing(vec![format!("antecedent of {:?}", first_word)]));
        }

        Ok(SelectionOutput::keep(sentence, kind))
    }
}

#[async_trait]
impl DecompositionStage for FixtureBackend {
    async fn run(&self, input: &DecompositionInput) -> Result<DecompositionOutput, StageError> {
        let sentence = input.sentence.trim();

        // First matching rule wins; order mirrors claim ordering:
        // propositions, conditional-full, condition-only, which, meta.
        if let Some(caps) = self.attribution.captures(sentence) {
            let source = caps[1].trim().to_string();
            let verb = caps[2].to_string();
            let proposition = as_sentence(&caps[3]);
            let bare = proposition.trim_end_matches('.');
            let meta = format!("{} {} that {}.", source, verb, bare);
            return Ok(DecompositionOutput {
                claims: vec![proposition, meta],
            });
        }

        if let Some(caps) = self.conditional.captures(sentence) {
            let condition = as_sentence(&caps[2]);
            return Ok(DecompositionOutput {
                claims: vec![as_sentence(sentence), condition],
            });
        }

        if let Some(caps) = self.which_consequence.captures(sentence) {
            let main = as_sentence(&caps[1]);
            let antecedent = main.trim_end_matches('.');
            let consequence = format!("{} {} lead to {}.", antecedent, &caps[2], caps[3].trim());
            return Ok(DecompositionOutput {
                claims: vec![main, consequence],
            });
        }

        if let Some(caps) = self.because.captures(sentence) {
            return Ok(DecompositionOutput {
                claims: vec![as_sentence(&caps[1]), as_sentence(&caps[2])],
            });
        }

        if let Some(caps) = self.therefore.captures(sentence) {
            return Ok(DecompositionOutput {
                claims: vec![as_sentence(&caps[1]), as_sentence(&caps[3])],
            });
        }

        if let Some(caps) = self.contrast.captures(sentence) {
            return Ok(DecompositionOutput {
                claims: vec![as_sentence(&caps[1]), complete_clause(&caps[1], &caps[3])],
            });
        }

        if let Some(caps) = self.conjunction.captures(sentence) {
            return Ok(DecompositionOutput {
                claims: vec![as_sentence(&caps[1]), complete_clause(&caps[1], &caps[3])],
            });
        }

        Ok(DecompositionOutput {
            claims: vec![as_sentence(sentence)],
        })
    }
}

#[async_trait]
impl RelationStage for FixtureBackend {
    async fn run(&self, input: &RelationInput) -> Result<RelationOutput, StageError> {
        if input.claims.len() < 2 {
            return Ok(RelationOutput { relations: vec![] });
        }

        let sentence = input.sentence.trim();
        let mut relations = Vec::new();

        if self.because.is_match(sentence) {
            // Effect precedes "because"; the relation links effect to cause.
            relations.push(Relation {
                from: 0,
                to: 1,
                predicate: "because".to_string(),
            });
        } else if let Some(caps) = self.therefore.captures(sentence) {
            // Conclusion follows the marker; reversed from textual order.
            let predicate = if caps[2].contains("therefore") {
                "therefore"
            } else {
                "so"
            };
            relations.push(Relation {
                from: 1,
                to: 0,
                predicate: predicate.to_string(),
            });
        } else if let Some(caps) = self.conditional.captures(sentence) {
            relations.push(Relation {
                from: 0,
                to: 1,
                predicate: caps[1].to_lowercase(),
            });
        } else if let Some(caps) = self.which_consequence.captures(sentence) {
            relations.push(Relation {
                from: 0,
                to: 1,
                predicate: format!("{} lead to", &caps[2]),
            });
        } else if let Some(caps) = self.contrast.captures(sentence) {
            relations.push(Relation {
                from: 0,
                to: 1,
                predicate: caps[2].to_string(),
            });
        } else if let Some(caps) = self.conjunction.captures(sentence) {
            relations.push(Relation {
                from: 0,
                to: 1,
                predicate: caps[2].to_string(),
            });
        }

        Ok(RelationOutput { relations })
    }
}

fn negated(text: &str) -> bool {
    let padded = format!(" {} ", text.to_lowercase());
    padded.contains(" not ") || padded.contains("n't ") || padded.contains(" never ")
}

#[async_trait]
impl StanceStage for FixtureBackend {
    async fn run(&self, input: &StanceInput) -> Result<StanceOutput, StageError> {
        let parent_negated = negated(&input.parent_claim);
        let verifications = input
            .claims
            .iter()
            .map(|claim| {
                let expressed = if negated(&claim.text) == parent_negated {
                    Stance::Supports
                } else {
                    Stance::Refutes
                };
                StanceVerification {
                    stable_key: claim.stable_key.clone(),
                    aligns_with_stance: expressed == input.user_stance,
                    suggested_stance: expressed,
                    reason: None,
                }
            })
            .collect();
        Ok(StanceOutput { verifications })
    }
}

#[async_trait]
impl ClaimParser for FixtureBackend {
    async fn run(&self, claim: &str) -> Result<CoreTriple, StageError> {
        let tokens: Vec<&str> = claim.split_whitespace().collect();
        let strip = |t: &str| t.trim_matches(['.', ',', '!', '?', ';']).to_string();

        let verb_index = tokens
            .iter()
            .position(|t| VERBS.contains(&strip(t).to_lowercase().as_str()))
            .ok_or_else(|| StageError::schema(format!("no predicate found in claim {:?}", claim)))?;
        if verb_index == 0 && tokens.len() < 2 {
            return Err(StageError::schema(format!(
                "claim {:?} has no subject",
                claim
            )));
        }

        // Consume auxiliary chains like "should be raised".
        let mut end = verb_index + 1;
        let mut saw_aux = false;
        while end < tokens.len()
            && matches!(
                strip(tokens[end]).to_lowercase().as_str(),
                "be" | "been" | "being" | "not"
            )
        {
            saw_aux = true;
            end += 1;
        }
        if saw_aux && end < tokens.len() {
            end += 1;
        }

        let subject = tokens[..verb_index]
            .iter()
            .map(|t| strip(t))
            .collect::<Vec<_>>()
            .join(" ");
        let predicate = tokens[verb_index..end]
            .iter()
            .map(|t| strip(t))
            .collect::<Vec<_>>()
            .join(" ");
        let object = tokens[end..]
            .iter()
            .map(|t| strip(t))
            .collect::<Vec<_>>()
            .join(" ");

        if subject.is_empty() {
            return Err(StageError::schema(format!(
                "claim {:?} has no subject",
                claim
            )));
        }

        Ok(CoreTriple {
            subject,
            predicate,
            object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> FixtureBackend {
        FixtureBackend::new()
    }

    fn decomposition_input(sentence: &str) -> DecompositionInput {
        DecompositionInput {
            header_context: vec![],
            sentence: sentence.to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_split_at_prepositional_phrase() {
        let out = DecompositionStage::run(
            &backend(),
            &decomposition_input("The minimum wage should be raised to 20 dollars per hour."),
        )
        .await
        .unwrap();
        assert_eq!(out.claims.len(), 1);
    }

    #[tokio::test]
    async fn test_split_on_but() {
        let out = DecompositionStage::run(
            &backend(),
            &decomposition_input("Coal is cheap but pollutes heavily."),
        )
        .await
        .unwrap();
        assert_eq!(out.claims.len(), 2);
        assert_eq!(out.claims[0], "Coal is cheap.");
        assert_eq!(out.claims[1], "Coal pollutes heavily.");
    }

    #[tokio::test]
    async fn test_attribution_yields_proposition_then_meta() {
        let out = DecompositionStage::run(
            &backend(),
            &decomposition_input("The IPCC found that emissions are rising."),
        )
        .await
        .unwrap();
        assert_eq!(out.claims.len(), 2);
        assert_eq!(out.claims[0], "Emissions are rising.");
        assert_eq!(out.claims[1], "The IPCC found that Emissions are rising.");
    }

    #[tokio::test]
    async fn test_conditional_yields_full_then_condition() {
        let out = DecompositionStage::run(
            &backend(),
            &decomposition_input("If subsidies end, coal plants will close."),
        )
        .await
        .unwrap();
        assert_eq!(out.claims.len(), 2);
        assert_eq!(out.claims[0], "If subsidies end, coal plants will close.");
        assert_eq!(out.claims[1], "Subsidies end.");
    }

    #[tokio::test]
    async fn test_because_direction() {
        let b = backend();
        let decomposed = DecompositionStage::run(&b, &decomposition_input("Sales fell because prices rose."))
            .await
            .unwrap();
        assert_eq!(decomposed.claims, vec!["Sales fell.", "Prices rose."]);

        let parser_out = ClaimParser::run(&b, &decomposed.claims[0]).await.unwrap();
        let relation_input = RelationInput {
            sentence: "Sales fell because prices rose.".to_string(),
            claims: decomposed
                .claims
                .iter()
                .enumerate()
                .map(|(index, text)| crate::stages::ClaimSlot {
                    index,
                    text: text.clone(),
                    core_triple: parser_out.clone(),
                })
                .collect(),
        };
        let out = RelationStage::run(&b, &relation_input).await.unwrap();
        assert_eq!(
            out.relations,
            vec![Relation {
                from: 0,
                to: 1,
                predicate: "because".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_therefore_reversed_direction() {
        let b = backend();
        let input = RelationInput {
            sentence: "Prices rose, so sales fell.".to_string(),
            claims: vec![
                crate::stages::ClaimSlot {
                    index: 0,
                    text: "Prices rose.".to_string(),
                    core_triple: CoreTriple {
                        subject: "prices".into(),
                        predicate: "rose".into(),
                        object: "".into(),
                    },
                },
                crate::stages::ClaimSlot {
                    index: 1,
                    text: "Sales fell.".to_string(),
                    core_triple: CoreTriple {
                        subject: "sales".into(),
                        predicate: "fell".into(),
                        object: "".into(),
                    },
                },
            ],
        };
        let out = RelationStage::run(&b, &input).await.unwrap();
        assert_eq!(
            out.relations,
            vec![Relation {
                from: 1,
                to: 0,
                predicate: "so".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_selection_drops_questions() {
        let out = SelectionStage::run(
            &backend(),
            &SelectionInput {
                header_context: vec![],
                previous_sentence: None,
                sentence: "Is coal cheap?".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(!out.keep);
    }

    #[tokio::test]
    async fn test_selection_strips_hedge() {
        let out = SelectionStage::run(
            &backend(),
            &SelectionInput {
                header_context: vec![],
                previous_sentence: None,
                sentence: "I think coal is dying.".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out.sentence.as_deref(), Some("Coal is dying."));
    }

    #[tokio::test]
    async fn test_selection_flags_unresolved_pronoun() {
        let out = SelectionStage::run(
            &backend(),
            &SelectionInput {
                header_context: vec![],
                previous_sentence: None,
                sentence: "It is clean.".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out.needs_context, Some(true));
        assert!(!out.missing.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_parser_handles_auxiliary_chain() {
        let out = ClaimParser::run(
            &backend(),
            "The minimum wage should be raised to 20 dollars per hour.",
        )
        .await
        .unwrap();
        assert_eq!(out.subject, "The minimum wage");
        assert_eq!(out.predicate, "should be raised");
        assert_eq!(out.object, "to 20 dollars per hour");
    }

    #[tokio::test]
    async fn test_parser_intransitive_claim() {
        let out = ClaimParser::run(&backend(), "Sales fell.").await.unwrap();
        assert_eq!(out.subject, "Sales");
        assert_eq!(out.predicate, "fell");
        assert_eq!(out.object, "");
    }

    #[tokio::test]
    async fn test_stance_polarity_flip() {
        use crate::types::Triple;
        let aligned = Triple::from_labels("coal", "is", "dirty").unwrap();
        let contrary = Triple::from_labels("coal", "is not", "dirty").unwrap();
        let input = StanceInput {
            parent_claim: "Coal is dirty.".to_string(),
            user_stance: Stance::Supports,
            claims: vec![
                CandidateClaimFixture::slot(&aligned, "Coal is dirty."),
                CandidateClaimFixture::slot(&contrary, "Coal is not dirty."),
            ],
        };
        let out = StanceStage::run(&backend(), &input).await.unwrap();
        assert_eq!(out.verifications.len(), 2);
        assert!(out.verifications[0].aligns_with_stance);
        assert!(!out.verifications[1].aligns_with_stance);
        assert_eq!(out.verifications[1].suggested_stance, Stance::Refutes);
    }

    struct CandidateClaimFixture;

    impl CandidateClaimFixture {
        fn slot(triple: &crate::types::Triple, text: &str) -> crate::stages::CandidateClaim {
            crate::stages::CandidateClaim {
                stable_key: triple.stable_key.clone(),
                text: text.to_string(),
                triple: CoreTriple {
                    subject: "coal".into(),
                    predicate: "is".into(),
                    object: "dirty".into(),
                },
            }
        }
    }
}
