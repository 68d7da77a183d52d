//! Markdown-aware sentence segmentation.
//!
//! The segmenter walks a markdown document line by line, tracking the
//! heading stack so every sentence carries its header context. It produces
//! a finite, ordered, one-shot sequence of segments; no network or
//! external state is involved.
//!
//! Sentence boundaries use a conservative rule: break after `.`, `!` or
//! `?` only when followed by whitespace and then an uppercase letter,
//! digit, quote, or opening bracket. Abbreviation-heavy text therefore
//! under-splits rather than over-splits.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// One sentence with the non-empty ancestor headings above it, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Non-empty ancestor headings, outermost first.
    pub header_path: Vec<String>,
    /// The sentence text, trimmed.
    pub sentence: String,
}

/// Markdown-aware sentence segmenter.
pub struct Segmenter {
    heading: Regex,
    list_marker: Regex,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    /// Create a segmenter with compiled line patterns.
    pub fn new() -> Self {
        Self {
            heading: Regex::new(r"^(#{1,6})(?:\s+(.*))?$").expect("heading pattern is valid"),
            list_marker: Regex::new(r"^(?:[-*•]|\d+\.)\s+").expect("list pattern is valid"),
        }
    }

    /// Segment a markdown document into an ordered sentence sequence.
    ///
    /// Headings update the header stack (a shallower heading truncates
    /// deeper levels) and produce no segments themselves. Leading list
    /// markers are stripped without discarding content.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        // Slot per heading level; empty string marks a skipped level.
        let mut headers: Vec<String> = Vec::new();
        let mut segments = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.heading.captures(line) {
                let level = caps.get(1).map(|m| m.as_str().len()).unwrap_or(1);
                let title = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                headers.truncate(level - 1);
                while headers.len() < level - 1 {
                    headers.push(String::new());
                }
                headers.push(title);
                continue;
            }

            let content = self.list_marker.replace(line, "");
            let header_path: Vec<String> = headers
                .iter()
                .filter(|h| !h.is_empty())
                .cloned()
                .collect();

            for sentence in split_sentences(&content) {
                segments.push(Segment {
                    header_path: header_path.clone(),
                    sentence,
                });
            }
        }

        segments
    }
}

/// Whether a character can open a new sentence after a terminator.
fn is_sentence_opener(c: char) -> bool {
    c.is_uppercase()
        || c.is_ascii_digit()
        || matches!(c, '"' | '\'' | '\u{201C}' | '\u{2018}' | '(' | '[')
}

/// Split one line of prose into sentences with the conservative rule.
fn split_sentences(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if matches!(chars[i], '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && is_sentence_opener(chars[j]) {
                let sentence: String = chars[start..=i].iter().collect();
                let sentence = sentence.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let tail: String = chars[start..].iter().collect();
    let tail = tail.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}
