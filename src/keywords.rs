//! Keyword sets and where they come from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::taxonomy::TaxonomyStore;

/// Keywords used when the caller names no category and supplies no list.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Communication",
    "Leadership",
    "Teamwork",
    "Problem Solving",
    "Project Management",
    "Time Management",
    "Collaboration",
    "Analytical Skills",
    "Microsoft Office",
    "Customer Service",
];

/// Normalize text for matching: NFKC, lowercase, single spaces.
pub fn normalize(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Importance of a keyword; drives suggestion priority only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordTier {
    Required,
    #[default]
    Preferred,
    Bonus,
}

/// A keyword and its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub tier: KeywordTier,
}

/// Ordered keywords without duplicates.
///
/// Duplicates are detected on the [`normalize`]d form; the first spelling
/// seen is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
    seen: HashSet<String>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from plain strings, all [`KeywordTier::Preferred`].
    pub fn from_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for item in items {
            set.push(item.as_ref(), KeywordTier::Preferred);
        }
        set
    }

    /// Parse a user-supplied list.
    ///
    /// Input containing `,`, `;` or a newline is split on those, so
    /// multi-word phrases survive; otherwise it is split on whitespace.
    pub fn parse(input: &str) -> Self {
        if input.contains([',', ';', '\n']) {
            Self::from_strings(input.split([',', ';', '\n']))
        } else {
            Self::from_strings(input.split_whitespace())
        }
    }

    /// Append a keyword. Returns false if it is blank or already present.
    pub fn push(&mut self, text: &str, tier: KeywordTier) -> bool {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return false;
        }
        if !self.seen.insert(normalize(&text)) {
            return false;
        }
        self.keywords.push(Keyword { text, tier });
        true
    }

    /// Append every keyword of `other` not already present.
    pub fn extend(&mut self, other: &KeywordSet) {
        for keyword in &other.keywords {
            self.push(&keyword.text, keyword.tier);
        }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(&normalize(text))
    }

    /// Keyword texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.keywords.iter().map(|k| k.text.as_str()).collect()
    }

    /// All keywords joined by single spaces, as embedded.
    pub fn joined(&self) -> String {
        self.texts().join(" ")
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

/// Where a reference keyword set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum KeywordSource {
    /// [`DEFAULT_KEYWORDS`]
    #[default]
    Default,
    /// Combined lists of the named taxonomy categories
    Taxonomy(Vec<String>),
    /// A list computed elsewhere, e.g. from a job description
    External(Vec<String>),
}

impl KeywordSource {
    /// Produce the ordered keyword set.
    pub fn keywords(&self, store: &TaxonomyStore) -> Result<KeywordSet> {
        match self {
            KeywordSource::Default => Ok(KeywordSet::from_strings(DEFAULT_KEYWORDS)),
            KeywordSource::Taxonomy(ids) => store.combine(ids),
            KeywordSource::External(list) => Ok(KeywordSet::from_strings(list)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Test\tEngineer \n"), "test engineer");
        // Full-width letters fold under NFKC.
        assert_eq!(normalize("ＳＱＬ"), "sql");
    }

    #[test]
    fn test_duplicates_keep_first_spelling() {
        let set = KeywordSet::from_strings(["Rust", "rust", "RUST ", "Go"]);
        assert_eq!(set.texts(), vec!["Rust", "Go"]);
        assert!(set.contains("rUsT"));
    }

    #[test]
    fn test_parse_splits_by_delimiters_or_spaces() {
        assert_eq!(KeywordSet::parse("SQL Java").texts(), vec!["SQL", "Java"]);
        assert_eq!(
            KeywordSet::parse("Test Engineer, SQL;\nJava,,").texts(),
            vec!["Test Engineer", "SQL", "Java"]
        );
        assert!(KeywordSet::parse("  ").is_empty());
    }

    #[test]
    fn test_joined() {
        let set = KeywordSet::parse("SQL Java");
        assert_eq!(set.joined(), "SQL Java");
    }

    #[test]
    fn test_sources() {
        let store = TaxonomyStore::builtin();
        let default = KeywordSource::Default.keywords(store).unwrap();
        assert_eq!(default.len(), DEFAULT_KEYWORDS.len());

        let external = KeywordSource::External(vec!["Kubernetes".into(), "kubernetes".into()])
            .keywords(store)
            .unwrap();
        assert_eq!(external.texts(), vec!["Kubernetes"]);
        assert!(external.iter().all(|k| k.tier == KeywordTier::Preferred));

        assert!(KeywordSource::Taxonomy(vec!["no-such-category".into()])
            .keywords(store)
            .is_err());
    }
}
