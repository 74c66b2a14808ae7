// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Correspondence index: budget code -> scene element names.
//!
//! Built once per (budget list, scene list) pair. Building is
//! O(|items| x |elements|), so [`IndexCache`] keys the built index on a
//! content fingerprint and hands back the same `Arc` until an input changes.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use serde::Serialize;

use crate::matcher::{Candidate, MatchKind, MatcherChain};
use crate::normalize::{normalize_code, normalize_element_name};
use crate::types::{flatten_elements, BudgetItem, SceneElement};

/// Immutable map from budget code to the names of the elements that
/// represent it. Codes without any match are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrespondenceIndex {
    entries: FxHashMap<String, Vec<String>>,
    #[serde(skip)]
    kinds: FxHashMap<MatchKind, usize>,
}

impl CorrespondenceIndex {
    /// Builds the index with the standard matcher chain.
    pub fn build(items: &[BudgetItem], elements: &[SceneElement]) -> Self {
        Self::build_with(items, elements, &MatcherChain::standard())
    }

    pub fn build_with(
        items: &[BudgetItem],
        elements: &[SceneElement],
        chain: &MatcherChain,
    ) -> Self {
        let names = candidate_names(elements);
        let mut entries: FxHashMap<String, Vec<String>> = FxHashMap::default();
        let mut kinds: FxHashMap<MatchKind, usize> = FxHashMap::default();

        for item in items {
            let code = normalize_code(&item.code);
            if code.is_empty() || entries.contains_key(&code) {
                continue;
            }

            let mut matched = Vec::new();
            for name in &names {
                let Some(candidate) = Candidate::new(name) else {
                    continue;
                };
                if let Some(kind) = chain.first_match(&code, &candidate) {
                    tracing::trace!(code = %code, element = %name, ?kind, "element matched");
                    *kinds.entry(kind).or_default() += 1;
                    matched.push(name.clone());
                }
            }

            if !matched.is_empty() {
                entries.insert(code, matched);
            }
        }

        tracing::debug!(
            budget_items = items.len(),
            scene_elements = names.len(),
            indexed_codes = entries.len(),
            "Built correspondence index"
        );

        Self { entries, kinds }
    }

    /// Element names linked to `code`, if the code produced any match.
    pub fn get(&self, code: &str) -> Option<&[String]> {
        self.entries.get(code.trim()).map(Vec::as_slice)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(code, names)| (code.as_str(), names.as_slice()))
    }

    /// Entries ordered by code, for stable output.
    pub fn sorted_entries(&self) -> Vec<(&str, &[String])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Every element name claimed by at least one code.
    pub fn matched_names(&self) -> FxHashSet<&str> {
        self.entries
            .values()
            .flat_map(|names| names.iter().map(String::as_str))
            .collect()
    }

    /// How many (code, element) pairs each rule accepted first.
    pub fn match_counts(&self) -> &FxHashMap<MatchKind, usize> {
        &self.kinds
    }
}

/// Normalized element names, depth-first, without duplicates.
fn candidate_names(elements: &[SceneElement]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    flatten_elements(elements)
        .into_iter()
        .map(|e| normalize_element_name(&e.name))
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// Content fingerprint of an index's inputs.
pub fn fingerprint(items: &[BudgetItem], elements: &[SceneElement]) -> u64 {
    let mut hasher = FxHasher::default();
    items.len().hash(&mut hasher);
    for item in items {
        normalize_code(&item.code).hash(&mut hasher);
    }
    let flat = flatten_elements(elements);
    flat.len().hash(&mut hasher);
    for element in flat {
        normalize_element_name(&element.name).hash(&mut hasher);
    }
    hasher.finish()
}

/// Remembers the last built index and its input fingerprint.
#[derive(Debug, Default)]
pub struct IndexCache {
    cached: Option<(u64, Arc<CorrespondenceIndex>)>,
    builds: usize,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached index when the inputs are unchanged, otherwise
    /// builds and caches a new one.
    pub fn get_or_build(
        &mut self,
        items: &[BudgetItem],
        elements: &[SceneElement],
    ) -> Arc<CorrespondenceIndex> {
        let key = fingerprint(items, elements);
        if let Some((cached_key, index)) = &self.cached {
            if *cached_key == key {
                return Arc::clone(index);
            }
        }

        let index = Arc::new(CorrespondenceIndex::build(items, elements));
        self.builds += 1;
        self.cached = Some((key, Arc::clone(&index)));
        index
    }

    /// Number of times an index was actually built.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(codes: &[&str]) -> Vec<BudgetItem> {
        codes.iter().map(|c| BudgetItem::new(*c, "")).collect()
    }

    fn scene(names: &[&str]) -> Vec<SceneElement> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| SceneElement::new(format!("mesh-{i}"), *n))
            .collect()
    }

    #[test]
    fn index_entry_keeps_scene_order() {
        let index = CorrespondenceIndex::build(
            &items(&["2.1"]),
            &scene(&["2.1_", "2.1_.001", "2.2_.001"]),
        );
        assert_eq!(index.get("2.1").unwrap(), ["2.1_", "2.1_.001"]);
    }

    #[test]
    fn sibling_code_elements_stay_with_their_code() {
        let index = CorrespondenceIndex::build(
            &items(&["1.2", "2.1"]),
            &scene(&["1.2_1", "2.1_.001"]),
        );
        assert_eq!(index.get("1.2").unwrap(), ["1.2_1"]);
        assert_eq!(index.get("2.1").unwrap(), ["2.1_.001"]);
    }

    #[test]
    fn codes_without_matches_are_omitted() {
        let index = CorrespondenceIndex::build(&items(&["2.1", "9.9"]), &scene(&["2.1_"]));
        assert!(index.contains("2.1"));
        assert!(!index.contains("9.9"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn elements_without_separator_are_excluded() {
        let index = CorrespondenceIndex::build(&items(&["2.1"]), &scene(&["2.1", "Pilar"]));
        assert!(index.is_empty());
    }

    #[test]
    fn empty_inputs_give_empty_index() {
        assert!(CorrespondenceIndex::build(&[], &scene(&["1_"])).is_empty());
        assert!(CorrespondenceIndex::build(&items(&["1"]), &[]).is_empty());
        assert!(CorrespondenceIndex::build(&items(&["", "  "]), &scene(&["_"])).is_empty());
    }

    #[test]
    fn child_elements_are_indexed() {
        let tree = vec![SceneElement::new("root", "Scene")
            .with_children(vec![SceneElement::new("a", " 1.1_.001 ")])];
        let index = CorrespondenceIndex::build(&items(&["1.1"]), &tree);
        assert_eq!(index.get("1.1").unwrap(), ["1.1_.001"]);
    }

    #[test]
    fn records_first_matching_rule() {
        let index = CorrespondenceIndex::build(
            &items(&["2.1"]),
            &scene(&["2.1_", "2.15_", "12.1_"]),
        );
        let counts = index.match_counts();
        assert_eq!(counts.get(&MatchKind::Exact), Some(&1));
        assert_eq!(counts.get(&MatchKind::Prefix), Some(&1));
        assert_eq!(counts.get(&MatchKind::Contains), Some(&1));
    }

    #[test]
    fn cache_reuses_index_for_same_content() {
        let budget = items(&["1.1"]);
        let elements = scene(&["1.1_", "1.1_.001"]);
        let mut cache = IndexCache::new();

        let first = cache.get_or_build(&budget, &elements);
        let second = cache.get_or_build(&budget.clone(), &elements.clone());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);

        let changed = scene(&["1.1_"]);
        let third = cache.get_or_build(&budget, &changed);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.builds(), 2);
    }
}
