//! Keyword taxonomy: job categories and their tiered keyword lists.
//!
//! The store is immutable once built. The built-in taxonomy is parsed once
//! per process and shared by reference; custom taxonomies can be loaded from
//! JSON of the same shape:
//!
//! ```json
//! { "categories": [ { "id": "...", "name": "...", "required": [], "preferred": [],
//!                     "bonus": [], "tags": [], "popularity": 0 } ] }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keywords::{KeywordSet, KeywordTier};

const BUILTIN_JSON: &str = include_str!("taxonomy.json");

static BUILTIN: OnceLock<TaxonomyStore> = OnceLock::new();

/// One job category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub preferred: Vec<String>,
    #[serde(default)]
    pub bonus: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
}

impl TaxonomyEntry {
    /// This category's keywords, required then preferred then bonus.
    pub fn keywords(&self) -> KeywordSet {
        let mut set = KeywordSet::new();
        self.add_to(&mut set);
        set
    }

    fn add_to(&self, set: &mut KeywordSet) {
        let tiers = [
            (&self.required, KeywordTier::Required),
            (&self.preferred, KeywordTier::Preferred),
            (&self.bonus, KeywordTier::Bonus),
        ];
        for (list, tier) in tiers {
            for keyword in list {
                set.push(keyword, tier);
            }
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

#[derive(Deserialize)]
struct TaxonomyFile {
    categories: Vec<TaxonomyEntry>,
}

/// Read-only category lookup.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyStore {
    entries: Vec<TaxonomyEntry>,
    index: HashMap<String, usize>,
}

impl TaxonomyStore {
    /// The taxonomy shipped with the crate.
    pub fn builtin() -> &'static TaxonomyStore {
        BUILTIN.get_or_init(|| {
            Self::from_json(BUILTIN_JSON).unwrap_or_else(|e| {
                log::error!("built-in taxonomy is invalid: {}", e);
                TaxonomyStore::default()
            })
        })
    }

    /// Build a store; duplicate ids are rejected.
    pub fn from_entries(entries: Vec<TaxonomyEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.id.clone(), i).is_some() {
                return Err(Error::Taxonomy(format!("duplicate category id: {}", entry.id)));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: TaxonomyFile = serde_json::from_str(json)?;
        Self::from_entries(file.categories)
    }

    /// Load a taxonomy JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Category by id.
    pub fn get(&self, id: &str) -> Result<&TaxonomyEntry> {
        self.index
            .get(id)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Categories whose name or a tag contains `query`, ignoring case.
    ///
    /// Ordered by popularity (highest first), then id.
    pub fn search(&self, query: &str) -> Vec<&TaxonomyEntry> {
        let needle = query.trim().to_lowercase();
        let mut hits: Vec<&TaxonomyEntry> = self
            .entries
            .iter()
            .filter(|e| needle.is_empty() || e.matches(&needle))
            .collect();
        hits.sort_by(|a, b| b.popularity.cmp(&a.popularity).then_with(|| a.id.cmp(&b.id)));
        hits
    }

    /// Union of the keyword lists of `ids`, first occurrence wins.
    pub fn combine<S: AsRef<str>>(&self, ids: &[S]) -> Result<KeywordSet> {
        let mut set = KeywordSet::new();
        for id in ids {
            self.get(id.as_ref())?.add_to(&mut set);
        }
        Ok(set)
    }

    /// All categories in load order.
    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn entry(id: &str, name: &str, popularity: u32) -> TaxonomyEntry {
        TaxonomyEntry {
            id: id.into(),
            name: name.into(),
            required: vec![],
            preferred: vec![],
            bonus: vec![],
            tags: vec![],
            popularity,
        }
    }

    #[test]
    fn test_builtin_loads_once() {
        let a = TaxonomyStore::builtin();
        let b = TaxonomyStore::builtin();
        assert!(std::ptr::eq(a, b));
        assert!(a.len() >= 10);
        assert!(a.get("software-engineer").is_ok());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = TaxonomyStore::builtin();
        assert!(matches!(store.get("astronaut"), Err(Error::NotFound(id)) if id == "astronaut"));
    }

    #[test]
    fn test_search_orders_by_popularity_then_id() {
        let mut a = entry("b-eng", "Backend Engineer", 50);
        a.tags = vec!["Engineering".into()];
        let b = entry("a-eng", "Audio Engineer", 50);
        let c = entry("z-eng", "Platform ENGINEER", 90);
        let d = entry("chef", "Chef", 99);
        let store = TaxonomyStore::from_entries(vec![a, b, c, d]).unwrap();

        let ids: Vec<&str> = store.search("engineer").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["z-eng", "a-eng", "b-eng"]);
        assert_eq!(store.search("").len(), 4);
        assert!(store.search("pilot").is_empty());
    }

    #[test]
    fn test_combine_dedups_in_order() {
        let mut a = entry("a", "A", 1);
        a.required = vec!["SQL".into()];
        a.preferred = vec!["Java".into()];
        a.bonus = vec!["Docker".into()];
        let mut b = entry("b", "B", 1);
        b.required = vec!["java".into(), "Python".into()];
        b.bonus = vec!["sql".into()];
        let store = TaxonomyStore::from_entries(vec![a, b]).unwrap();

        let set = store.combine(&["a", "b"]).unwrap();
        assert_eq!(set.texts(), vec!["SQL", "Java", "Docker", "Python"]);
        let tiers: Vec<KeywordTier> = set.iter().map(|k| k.tier).collect();
        assert_eq!(
            tiers,
            vec![
                KeywordTier::Required,
                KeywordTier::Preferred,
                KeywordTier::Bonus,
                KeywordTier::Required
            ]
        );
        assert!(store.combine(&["a", "missing"]).is_err());
    }

    #[test]
    fn test_duplicate_ids_are_input_errors() {
        let err = TaxonomyStore::from_entries(vec![entry("x", "X", 1), entry("x", "Y", 2)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);

        let err = TaxonomyStore::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Taxonomy(_)));
    }
}
