// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection tracking and resolution of selected codes to element names.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::index::CorrespondenceIndex;
use crate::links::LinkingConfig;
use crate::normalize::{normalize_code, normalize_element_name};
use crate::patterns::PatternTable;

/// Union of the element names for every selected code, de-duplicated.
///
/// Codes present in `index` contribute their entry; any other code
/// contributes every pattern from `patterns` as a literal element name.
/// That fallback is only meaningful once scene elements were enumerated.
pub fn resolve<F>(selected: &[String], index: &CorrespondenceIndex, patterns: F) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for code in selected {
        let code = normalize_code(code);
        if code.is_empty() {
            continue;
        }
        match index.get(&code) {
            Some(names) => push_unique(&mut out, &mut seen, names.iter().cloned()),
            None => push_unique(&mut out, &mut seen, patterns(&code)),
        }
    }
    out
}

fn push_unique(
    out: &mut Vec<String>,
    seen: &mut FxHashSet<String>,
    names: impl IntoIterator<Item = String>,
) {
    for name in names {
        if seen.insert(name.clone()) {
            out.push(name);
        }
    }
}

/// Ordered set of selected budget codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    codes: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `code` in or out of the selection. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, code: &str) -> bool {
        let code = normalize_code(code);
        if code.is_empty() {
            return false;
        }
        if let Some(pos) = self.codes.iter().position(|c| *c == code) {
            self.codes.remove(pos);
            false
        } else {
            self.codes.push(code);
            true
        }
    }

    /// Adds `code`; returns false when it was already selected or empty.
    pub fn select(&mut self, code: &str) -> bool {
        let code = normalize_code(code);
        if code.is_empty() || self.contains(&code) {
            return false;
        }
        self.codes.push(code);
        true
    }

    /// Removes `code`; returns false when it was not selected.
    pub fn deselect(&mut self, code: &str) -> bool {
        let code = normalize_code(code);
        let before = self.codes.len();
        self.codes.retain(|c| *c != code);
        self.codes.len() != before
    }

    pub fn contains(&self, code: &str) -> bool {
        let code = code.trim();
        self.codes.iter().any(|c| c == code)
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Path a selected code resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Curated manual links for the code.
    Manual,
    /// Correspondence index entry.
    Index,
    /// Generated patterns used as literal names.
    Pattern,
}

/// Resolves codes with manual overrides taking precedence over the index,
/// and generated patterns as the last resort.
#[derive(Debug, Clone, Default)]
pub struct MatchResolver {
    overrides: FxHashMap<String, Vec<String>>,
}

impl MatchResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses every link in `config` as an override for its budget code.
    pub fn from_config(config: &LinkingConfig) -> Self {
        let mut resolver = Self::new();
        resolver.set_overrides(config);
        resolver
    }

    pub fn set_overrides(&mut self, config: &LinkingConfig) {
        self.overrides.clear();
        for link in &config.links {
            let code = normalize_code(&link.budget_item.code);
            let name = normalize_element_name(&link.element_3d.name);
            if code.is_empty() || name.is_empty() {
                continue;
            }
            let names = self.overrides.entry(code).or_default();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        tracing::debug!(overridden_codes = self.overrides.len(), "Loaded manual overrides");
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn has_override(&self, code: &str) -> bool {
        self.overrides.contains_key(code.trim())
    }

    /// Which path `code` resolves through.
    pub fn source_for(&self, code: &str, index: &CorrespondenceIndex) -> ResolutionSource {
        let code = code.trim();
        if self.overrides.contains_key(code) {
            ResolutionSource::Manual
        } else if index.contains(code) {
            ResolutionSource::Index
        } else {
            ResolutionSource::Pattern
        }
    }

    pub fn resolve(
        &self,
        selected: &[String],
        index: &CorrespondenceIndex,
        table: &PatternTable,
    ) -> Vec<String> {
        let (manual, automatic): (Vec<String>, Vec<String>) = selected
            .iter()
            .map(|c| normalize_code(c))
            .partition(|c| self.overrides.contains_key(c));

        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for code in &manual {
            if let Some(names) = self.overrides.get(code) {
                push_unique(&mut out, &mut seen, names.iter().cloned());
            }
        }
        let automatic_names = resolve(&automatic, index, |code| table.generate(code));
        push_unique(&mut out, &mut seen, automatic_names);

        tracing::debug!(
            selected = selected.len(),
            resolved = out.len(),
            "Resolved selection"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::{BudgetItemRef, Element3D, LinkType, ManualLink};
    use crate::types::{BudgetItem, SceneElement};

    fn index(codes: &[&str], names: &[&str]) -> CorrespondenceIndex {
        let items: Vec<_> = codes.iter().map(|c| BudgetItem::new(*c, "")).collect();
        let elements: Vec<_> = names
            .iter()
            .map(|n| SceneElement::new(*n, *n))
            .collect();
        CorrespondenceIndex::build(&items, &elements)
    }

    fn as_set(names: &[String]) -> FxHashSet<&str> {
        names.iter().map(String::as_str).collect()
    }

    #[test]
    fn empty_selection_resolves_to_nothing() {
        let idx = index(&["1.1"], &["1.1_"]);
        assert!(resolve(&[], &idx, |_| vec!["x".into()]).is_empty());
    }

    #[test]
    fn union_of_overlapping_codes() {
        let idx = index(&["2", "2.1"], &["2.1_", "2.1_.001", "2.2_"]);
        // "2" claims all three through the prefix rule; "2.1" claims two
        let both = resolve(&["2".into(), "2.1".into()], &idx, |_| Vec::new());
        assert_eq!(
            as_set(&both),
            ["2.1_", "2.1_.001", "2.2_"].into_iter().collect::<FxHashSet<_>>()
        );
        assert_eq!(both.len(), 3);
    }

    #[test]
    fn missing_code_falls_back_to_patterns() {
        let idx = index(&[], &[]);
        let names = resolve(&["7.1".into()], &idx, |code| vec![format!("{code}_")]);
        assert_eq!(names, ["7.1_"]);
    }

    #[test]
    fn resolve_is_idempotent() {
        let idx = index(&["1.1", "1.2"], &["1.1_", "1.2_", "1.2_.001"]);
        let selected = vec!["1.2".to_string(), "1.1".to_string()];
        let table = PatternTable::empty();
        let first = resolve(&selected, &idx, |c| table.generate(c));
        let second = resolve(&selected, &idx, |c| table.generate(c));
        assert_eq!(as_set(&first), as_set(&second));
    }

    #[test]
    fn selection_toggle_and_deselect() {
        let mut selection = Selection::new();
        assert!(selection.toggle(" 2.1 "));
        assert!(selection.contains("2.1"));
        assert!(!selection.select("2.1"));
        assert!(selection.select("2.2"));
        assert!(!selection.toggle("2.1"));
        assert_eq!(selection.codes(), ["2.2"]);
        assert!(selection.deselect("2.2"));
        assert!(!selection.deselect("2.2"));
        assert!(selection.is_empty());
        assert!(!selection.toggle(""));
    }

    #[test]
    fn manual_override_bypasses_index() {
        let idx = index(&["2.1"], &["2.1_", "2.1_.001"]);
        let mut config = LinkingConfig::new("Obra", "1.0.0");
        config.links.push(ManualLink {
            id: "link_001".into(),
            element_3d: Element3D {
                id: "viga_001".into(),
                name: "Viga Principal".into(),
                category: "Estrutura".into(),
                keywords: vec![],
            },
            budget_item: BudgetItemRef {
                id: "2.1".into(),
                code: "2.1".into(),
                description: "Vigas".into(),
                category: "Térreo".into(),
            },
            link_type: LinkType::Manual,
            confidence: 90.0,
            validated: true,
            notes: None,
            created_at: String::new(),
        });

        let resolver = MatchResolver::from_config(&config);
        let table = PatternTable::empty();
        assert_eq!(resolver.source_for("2.1", &idx), ResolutionSource::Manual);
        assert_eq!(
            resolver.resolve(&["2.1".into()], &idx, &table),
            ["Viga Principal"]
        );

        let plain = MatchResolver::new();
        assert_eq!(
            plain.resolve(&["2.1".into()], &idx, &table),
            ["2.1_", "2.1_.001"]
        );
        assert_eq!(plain.source_for("9", &idx), ResolutionSource::Pattern);
    }
}
