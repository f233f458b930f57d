/*!
 * Protect/restore engine for glossary terms.
 *
 * `TermGuard::protect` swaps each whole-word, case-insensitive term occurrence
 * for a placeholder token and `TermGuard::restore` swaps the tokens back. The
 * guard is immutable after construction and can be shared freely between
 * threads and pipelines.
 */

use std::collections::HashMap;

use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::errors::GlossaryError;
use crate::glossary::defaults::DEFAULT_PRESERVE_TERMS;
use crate::glossary::placeholder::Sentinels;
use crate::glossary::terms::TermSet;

/// Mapping from placeholder token to the exact substring it replaced
pub type Placeholders = HashMap<String, String>;

/// Text with glossary terms replaced by placeholder tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedText {
    /// The rewritten text
    pub text: String,
    /// Token to original substring, one entry per token in `text`
    pub placeholders: Placeholders,
}

impl ProtectedText {
    /// Text that needed no protection
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            placeholders: Placeholders::new(),
        }
    }

    /// Whether any term was replaced
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }
}

/// Compiled matcher over a non-empty term set
#[derive(Debug, Clone)]
struct TermMatcher {
    /// Finds the leftmost position where any term matches
    any: Regex,
    /// One start-anchored matcher per term, in term order
    anchored: Vec<Regex>,
}

impl TermMatcher {
    fn compile(terms: &TermSet) -> Result<Self, GlossaryError> {
        let alternation = terms
            .iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        let any = RegexBuilder::new(&format!("(?:{})", alternation))
            .case_insensitive(true)
            .build()?;

        let anchored = terms
            .iter()
            .map(|term| {
                RegexBuilder::new(&format!("^(?:{})", regex::escape(term)))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { any, anchored })
    }

    /// Byte spans of every whole-word term occurrence, non-overlapping, left to right
    fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(candidate) = self.any.find_at(text, pos) else {
                break;
            };
            let start = candidate.start();

            match self.longest_whole_word_at(text, start) {
                Some(end) => {
                    spans.push((start, end));
                    pos = end;
                }
                None => {
                    // No term fits here; move one character on
                    pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        spans
    }

    /// End offset of the longest term matching at `start` with word boundaries on both sides
    fn longest_whole_word_at(&self, text: &str, start: usize) -> Option<usize> {
        let preceded_by_word = text[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        if preceded_by_word {
            return None;
        }

        let rest = &text[start..];
        self.anchored.iter().find_map(|matcher| {
            let found = matcher.find(rest)?;
            if found.end() == 0 {
                return None;
            }
            let followed_by_word = rest[found.end()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
            (!followed_by_word).then_some(start + found.end())
        })
    }
}

/// Replaces glossary terms with placeholder tokens and back
#[derive(Debug, Clone)]
pub struct TermGuard {
    terms: TermSet,
    matcher: Option<TermMatcher>,
}

impl TermGuard {
    /// Build a guard from a collection of terms. An empty collection yields a no-op guard.
    pub fn new<I, S>(terms: I) -> Result<Self, GlossaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = TermSet::new(terms);
        let matcher = if terms.is_empty() {
            None
        } else {
            Some(TermMatcher::compile(&terms)?)
        };

        debug!("Glossary guard built with {} terms", terms.len());

        Ok(Self { terms, matcher })
    }

    /// Build a guard from the built-in preserve list plus `extra` terms
    pub fn with_defaults<I, S>(extra: I) -> Result<Self, GlossaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let combined: Vec<String> = DEFAULT_PRESERVE_TERMS
            .iter()
            .map(|term| term.to_string())
            .chain(extra.into_iter().map(|term| term.as_ref().to_string()))
            .collect();

        Self::new(combined)
    }

    /// A guard that protects nothing
    pub fn empty() -> Self {
        Self {
            terms: TermSet::default(),
            matcher: None,
        }
    }

    /// The normalized terms, longest first
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Whether the guard has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Replace every term occurrence in `text` with a placeholder token
    pub fn protect(&self, text: &str) -> ProtectedText {
        let Some(matcher) = &self.matcher else {
            return ProtectedText::unchanged(text);
        };

        let spans = matcher.find_spans(text);
        if spans.is_empty() {
            return ProtectedText::unchanged(text);
        }

        let Some(sentinels) = Sentinels::choose(text) else {
            warn!(
                "No free placeholder sentinels in a {} byte text, {} term occurrences left unprotected",
                text.len(),
                spans.len()
            );
            return ProtectedText::unchanged(text);
        };
        let mut rewritten = String::with_capacity(text.len() + spans.len() * 8);
        let mut placeholders = Placeholders::with_capacity(spans.len());
        let mut last = 0;

        for (index, (start, end)) in spans.into_iter().enumerate() {
            let token = sentinels.token(index);
            rewritten.push_str(&text[last..start]);
            rewritten.push_str(&token);
            placeholders.insert(token, text[start..end].to_string());
            last = end;
        }
        rewritten.push_str(&text[last..]);

        ProtectedText {
            text: rewritten,
            placeholders,
        }
    }

    /// Replace every placeholder token in `text` with its original substring.
    ///
    /// Tokens that are not in `placeholders` are left as they are.
    pub fn restore(&self, text: &str, placeholders: &Placeholders) -> String {
        if placeholders.is_empty() {
            return text.to_string();
        }

        let mut tokens: Vec<(&String, &String)> = placeholders.iter().collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

        tokens
            .into_iter()
            .fold(text.to_string(), |restored, (token, original)| {
                if restored.contains(token.as_str()) {
                    restored.replace(token.as_str(), original)
                } else {
                    restored
                }
            })
    }
}

impl Default for TermGuard {
    fn default() -> Self {
        Self::empty()
    }
}
