// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-scoped linking state.
//!
//! A [`LinkingSession`] is created when a scene finishes loading and dropped
//! with the viewer. It owns every piece of mutable state the engine has, so
//! two viewers never share a cache or a highlight.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::highlight::{HighlightApplicator, HighlightChange, HighlightState, SceneHandle};
use crate::index::{CorrespondenceIndex, IndexCache};
use crate::links::LinkingConfig;
use crate::material::HighlightStyle;
use crate::patterns::PatternTable;
use crate::report::LinkingReport;
use crate::resolver::{MatchResolver, ResolutionSource, Selection};
use crate::types::{BudgetItem, SceneElement};

#[derive(Debug)]
pub struct LinkingSession {
    items: Vec<BudgetItem>,
    elements: Vec<SceneElement>,
    table: PatternTable,
    cache: IndexCache,
    index: Arc<CorrespondenceIndex>,
    selection: Selection,
    resolver: MatchResolver,
    applicator: HighlightApplicator,
    linking: Option<LinkingConfig>,
}

impl LinkingSession {
    /// Session using the compiled-in pattern table.
    pub fn new(items: Vec<BudgetItem>, elements: Vec<SceneElement>) -> Self {
        Self::with_pattern_table(items, elements, PatternTable::default())
    }

    pub fn with_pattern_table(
        items: Vec<BudgetItem>,
        elements: Vec<SceneElement>,
        table: PatternTable,
    ) -> Self {
        let mut cache = IndexCache::new();
        let index = cache.get_or_build(&items, &elements);
        tracing::info!(
            budget_items = items.len(),
            scene_elements = elements.len(),
            indexed_codes = index.len(),
            "Linking session started"
        );
        Self {
            items,
            elements,
            table,
            cache,
            index,
            selection: Selection::new(),
            resolver: MatchResolver::new(),
            applicator: HighlightApplicator::default(),
            linking: None,
        }
    }

    pub fn budget_items(&self) -> &[BudgetItem] {
        &self.items
    }

    pub fn scene_elements(&self) -> &[SceneElement] {
        &self.elements
    }

    pub fn pattern_table(&self) -> &PatternTable {
        &self.table
    }

    pub fn index(&self) -> &Arc<CorrespondenceIndex> {
        &self.index
    }

    /// Number of index builds so far; unchanged inputs reuse the cached one.
    pub fn index_builds(&self) -> usize {
        self.cache.builds()
    }

    pub fn linking_config(&self) -> Option<&LinkingConfig> {
        self.linking.as_ref()
    }

    /// Replaces the curated table. Elements already highlighted keep the
    /// previous look until they are restored.
    pub fn set_pattern_table(&mut self, table: PatternTable) {
        self.table = table;
    }

    /// Installs (or with `None` removes) manual links overriding resolution
    /// for the codes they name.
    pub fn set_linking_config(&mut self, config: Option<LinkingConfig>) {
        match &config {
            Some(config) => self.resolver.set_overrides(config),
            None => self.resolver.clear_overrides(),
        }
        self.linking = config;
    }

    /// Swaps the session inputs and rebuilds the index if their content
    /// changed. Returns whether a build happened.
    pub fn set_inputs(&mut self, items: Vec<BudgetItem>, elements: Vec<SceneElement>) -> bool {
        self.items = items;
        self.elements = elements;
        self.rebuild_index()
    }

    /// Refreshes the index from the current inputs. Returns whether a build
    /// happened.
    pub fn rebuild_index(&mut self) -> bool {
        let before = self.cache.builds();
        self.index = self.cache.get_or_build(&self.items, &self.elements);
        self.cache.builds() != before
    }

    pub fn selected_codes(&self) -> &[String] {
        self.selection.codes()
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selection.contains(code)
    }

    pub fn highlight_state(&self) -> &HighlightState {
        self.applicator.state()
    }

    /// Highlighted element names, sorted.
    pub fn highlighted(&self) -> Vec<String> {
        self.applicator.state().names()
    }

    pub fn source_for(&self, code: &str) -> ResolutionSource {
        self.resolver.source_for(code, &self.index)
    }

    /// Element names the current selection resolves to.
    pub fn resolve_selection(&self) -> Vec<String> {
        self.resolver
            .resolve(self.selection.codes(), &self.index, &self.table)
    }

    /// Flips `code` and re-highlights the union of the remaining selection.
    pub fn toggle<S: SceneHandle + ?Sized>(&mut self, code: &str, scene: &mut S) -> HighlightChange {
        let selected = self.selection.toggle(code);
        tracing::debug!(code = code.trim(), selected, "Toggled budget code");
        self.refresh(scene)
    }

    pub fn select<S: SceneHandle + ?Sized>(&mut self, code: &str, scene: &mut S) -> HighlightChange {
        if !self.selection.select(code) {
            return HighlightChange::default();
        }
        self.refresh(scene)
    }

    pub fn deselect<S: SceneHandle + ?Sized>(&mut self, code: &str, scene: &mut S) -> HighlightChange {
        if !self.selection.deselect(code) {
            return HighlightChange::default();
        }
        self.refresh(scene)
    }

    /// Empties the selection and restores every original material.
    pub fn clear<S: SceneHandle + ?Sized>(&mut self, scene: &mut S) -> HighlightChange {
        self.selection.clear();
        self.applicator.reset(scene)
    }

    /// Re-applies the current selection, e.g. after new inputs or links.
    /// Each code lights its elements in its own curated colour.
    pub fn refresh<S: SceneHandle + ?Sized>(&mut self, scene: &mut S) -> HighlightChange {
        let targets = self.styled_targets();
        self.applicator.apply_styled(&targets, scene)
    }

    /// Resolved names paired with the look of the first selected code that
    /// claims them.
    fn styled_targets(&self) -> Vec<(String, HighlightStyle)> {
        let mut seen = FxHashSet::default();
        let mut targets = Vec::new();
        for code in self.selection.codes() {
            let style = self.table.style_for(code);
            let names = self
                .resolver
                .resolve(std::slice::from_ref(code), &self.index, &self.table);
            for name in names {
                if seen.insert(name.clone()) {
                    targets.push((name, style.clone()));
                }
            }
        }
        targets
    }

    pub fn report(&self) -> LinkingReport {
        LinkingReport::build(&self.items, &self.elements, &self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::RecordingScene;
    use crate::links::{BudgetItemRef, Element3D, LinkType, ManualLink};
    use crate::material::{Color, MaterialSnapshot};

    fn fixture() -> (LinkingSession, RecordingScene) {
        let items = vec![BudgetItem::new("2.1", "Vigas"), BudgetItem::new("2.2", "Pilares")];
        let brick = MaterialSnapshot {
            color: Color(0xaa5533),
            ..MaterialSnapshot::neutral()
        };
        let elements = vec![
            SceneElement::new("e1", "2.1_").with_material(brick.clone()),
            SceneElement::new("e2", "2.1_.001"),
            SceneElement::new("e3", "2.2_.001"),
        ];
        let scene = RecordingScene::from_elements(&elements);
        (LinkingSession::new(items, elements), scene)
    }

    #[test]
    fn toggle_highlights_and_restores() {
        let (mut session, mut scene) = fixture();

        let change = session.toggle("2.1", &mut scene);
        assert_eq!(change.highlighted, 2);
        assert_eq!(session.highlighted(), ["2.1_", "2.1_.001"]);

        let change = session.toggle("2.1", &mut scene);
        assert_eq!(change.restored, 2);
        assert!(session.highlighted().is_empty());
        assert!(session.highlight_state().is_empty());
        assert_eq!(
            scene.material(&"e1".into()).map(|m| m.color),
            Some(Color(0xaa5533))
        );
    }

    #[test]
    fn each_code_uses_its_curated_color() {
        let (mut session, mut scene) = fixture();
        session.select("2.2", &mut scene);
        let pilar = session.pattern_table().style_for("2.2").to_material();
        assert_eq!(pilar.color, Color(0x4ECDC4));
        assert_eq!(scene.material(&"e3".into()), Some(pilar));

        session.select("2.1", &mut scene);
        let viga = session.pattern_table().style_for("2.1").to_material();
        assert_eq!(scene.material(&"e2".into()), Some(viga));
    }

    #[test]
    fn select_is_idempotent() {
        let (mut session, mut scene) = fixture();
        assert_eq!(session.select("2.2", &mut scene).highlighted, 1);
        assert!(session.select("2.2", &mut scene).is_empty());
        assert!(session.deselect("9", &mut scene).is_empty());
        assert_eq!(session.clear(&mut scene).restored, 1);
        assert!(session.selected_codes().is_empty());
    }

    #[test]
    fn unchanged_inputs_reuse_index() {
        let (mut session, _) = fixture();
        assert_eq!(session.index_builds(), 1);
        assert!(!session.rebuild_index());

        let items = session.budget_items().to_vec();
        let mut elements = session.scene_elements().to_vec();
        elements.push(SceneElement::new("e4", "2.2_.002"));
        assert!(session.set_inputs(items, elements));
        assert_eq!(session.index().get("2.2").map(|n| n.len()), Some(2));
    }

    #[test]
    fn manual_links_take_over() {
        let (mut session, mut scene) = fixture();
        let mut config = LinkingConfig::new("Obra", "1.0.0");
        config.links.push(ManualLink::new(
            "l1",
            Element3D {
                id: "e3".into(),
                name: "2.2_.001".into(),
                ..Default::default()
            },
            BudgetItemRef {
                id: "2.1".into(),
                code: "2.1".into(),
                ..Default::default()
            },
            LinkType::Manual,
            95.0,
        ));
        session.set_linking_config(Some(config));
        assert_eq!(session.source_for("2.1"), ResolutionSource::Manual);

        session.toggle("2.1", &mut scene);
        assert_eq!(session.highlighted(), ["2.2_.001"]);

        session.set_linking_config(None);
        session.refresh(&mut scene);
        assert_eq!(session.highlighted(), ["2.1_", "2.1_.001"]);
    }
}
