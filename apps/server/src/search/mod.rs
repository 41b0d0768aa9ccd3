//! Free-text search index
//!
//! Terms are folded with Unicode NFKD, stripped of combining marks and
//! lowercased, so `Hornblöwer` matches `hornblower`. A query matches an entity
//! when every query token is a substring of at least one of its terms.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use uuid::Uuid;

/// What the index stores per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument {
    pub sort_key: String,
    pub terms: BTreeSet<String>,
    pub voided: bool,
}

impl SearchDocument {
    pub fn new<I, S>(display: &str, texts: I, voided: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sort_key: normalize(display),
            terms: texts
                .into_iter()
                .flat_map(|text| tokenize(text.as_ref()))
                .collect(),
            voided,
        }
    }
}

/// Fold to NFKD, drop combining marks, lowercase.
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalize and split on anything that is not alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Default)]
struct ResourceIndex {
    documents: HashMap<Uuid, SearchDocument>,
    postings: BTreeMap<String, BTreeSet<Uuid>>,
}

impl ResourceIndex {
    fn insert(&mut self, uuid: Uuid, document: SearchDocument) {
        self.remove(&uuid);
        for term in &document.terms {
            self.postings.entry(term.clone()).or_default().insert(uuid);
        }
        self.documents.insert(uuid, document);
    }

    fn remove(&mut self, uuid: &Uuid) -> bool {
        let Some(old) = self.documents.remove(uuid) else {
            return false;
        };
        for term in &old.terms {
            if let Some(set) = self.postings.get_mut(term) {
                set.remove(uuid);
                if set.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        true
    }

    /// Entities with at least one term containing `token`.
    fn containing(&self, token: &str) -> BTreeSet<Uuid> {
        self.postings
            .iter()
            .filter(|(term, _)| term.contains(token))
            .flat_map(|(_, uuids)| uuids.iter().copied())
            .collect()
    }
}

/// Inverted index keyed by resource name.
#[derive(Default)]
pub struct SearchIndex {
    resources: RwLock<HashMap<String, ResourceIndex>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, resource: &str, uuid: Uuid, document: SearchDocument) {
        let mut resources = self.resources.write().await;
        resources
            .entry(resource.to_string())
            .or_default()
            .insert(uuid, document);
    }

    pub async fn remove(&self, resource: &str, uuid: &Uuid) -> bool {
        let mut resources = self.resources.write().await;
        resources
            .get_mut(resource)
            .map(|index| index.remove(uuid))
            .unwrap_or(false)
    }

    pub async fn clear(&self, resource: &str) {
        self.resources.write().await.remove(resource);
    }

    pub async fn len(&self, resource: &str) -> usize {
        self.resources
            .read()
            .await
            .get(resource)
            .map(|index| index.documents.len())
            .unwrap_or(0)
    }

    /// UUIDs matching `query`, ordered by sort key then UUID.
    pub async fn search(&self, resource: &str, query: &str, include_voided: bool) -> Vec<Uuid> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let resources = self.resources.read().await;
        let Some(index) = resources.get(resource) else {
            return Vec::new();
        };

        let mut matches: Option<BTreeSet<Uuid>> = None;
        for token in &tokens {
            let found = index.containing(token);
            let narrowed = match matches {
                Some(current) => current.intersection(&found).copied().collect(),
                None => found,
            };
            if narrowed.is_empty() {
                return Vec::new();
            }
            matches = Some(narrowed);
        }

        let mut hits: Vec<(&str, Uuid)> = matches
            .unwrap_or_default()
            .into_iter()
            .filter_map(|uuid| {
                let doc = index.documents.get(&uuid)?;
                (include_voided || !doc.voided).then_some((doc.sort_key.as_str(), uuid))
            })
            .collect();
        hits.sort();
        hits.into_iter().map(|(_, uuid)| uuid).collect()
    }
}
