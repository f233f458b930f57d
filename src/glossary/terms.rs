use std::cmp::Reverse;
use std::collections::BTreeSet;

/// A normalized set of glossary terms.
///
/// Terms are trimmed, empty entries are dropped, exact duplicates are removed,
/// and the result is ordered by descending character length (ties broken
/// lexicographically) so that a longer term is always tried before any of its
/// substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<String>,
}

impl TermSet {
    /// Build a term set from any collection of strings
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_string())
            .filter(|term| !term.is_empty())
            .collect();

        let mut terms: Vec<String> = unique.into_iter().collect();
        // BTreeSet already yields lexicographic order; the stable sort keeps it for ties
        terms.sort_by_key(|term| Reverse(term.chars().count()));

        Self { terms }
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the set holds no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over the terms, longest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// The terms as a slice, longest first
    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }
}

impl<S: AsRef<str>> FromIterator<S> for TermSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
