// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Highlight application against an external renderer.
//!
//! The applicator owns the only mutable highlight state: which names are
//! highlighted, and the original material of every element it touched.
//! An original is saved the first time an element is highlighted and is what
//! the element returns to on restore. Originals are forgotten as soon as the
//! highlighted set is empty again.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;

use crate::material::{HighlightStyle, MaterialSnapshot};
use crate::normalize::normalize_element_name;
use crate::types::ElementId;

/// Element ids sharing one name. Almost always a single id.
pub type ElementIds = SmallVec<[ElementId; 2]>;

/// The renderer, as seen by the engine.
pub trait SceneHandle {
    /// Ids of the elements carrying `name`; empty when none exist.
    fn element_ids(&self, name: &str) -> ElementIds;

    /// Current material of an element, if the renderer can report it.
    fn material(&self, id: &ElementId) -> Option<MaterialSnapshot>;

    /// Assigns a material to an element.
    fn set_material(&mut self, id: &ElementId, material: &MaterialSnapshot);
}

/// Counts of material assignments made by one [`HighlightApplicator::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightChange {
    pub highlighted: usize,
    pub restored: usize,
}

impl HighlightChange {
    pub fn is_empty(&self) -> bool {
        self.highlighted == 0 && self.restored == 0
    }
}

/// Session-scoped highlight state.
#[derive(Debug, Default)]
pub struct HighlightState {
    highlighted: FxHashMap<String, ElementIds>,
    originals: FxHashMap<ElementId, MaterialSnapshot>,
}

impl HighlightState {
    /// Nothing highlighted and no original material held.
    pub fn is_empty(&self) -> bool {
        self.highlighted.is_empty() && self.originals.is_empty()
    }

    pub fn is_highlighted(&self, name: &str) -> bool {
        self.highlighted.contains_key(name)
    }

    /// Highlighted names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.highlighted.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn original(&self, id: &ElementId) -> Option<&MaterialSnapshot> {
        self.originals.get(id)
    }
}

/// Switches elements between their original and the highlight material.
#[derive(Debug, Default)]
pub struct HighlightApplicator {
    style: HighlightStyle,
    state: HighlightState,
}

impl HighlightApplicator {
    pub fn new(style: HighlightStyle) -> Self {
        Self {
            style,
            state: HighlightState::default(),
        }
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    /// Makes exactly `targets` highlighted with the applicator's style.
    ///
    /// Names no longer targeted go back to their saved original (or the
    /// neutral material if none was saved). Newly targeted names present in
    /// the scene get the highlight material; names the scene does not know
    /// are ignored.
    pub fn apply<S: SceneHandle + ?Sized>(
        &mut self,
        targets: &[String],
        scene: &mut S,
    ) -> HighlightChange {
        let styled: Vec<(String, HighlightStyle)> = targets
            .iter()
            .map(|t| (t.clone(), self.style.clone()))
            .collect();
        self.apply_styled(&styled, scene)
    }

    /// Like [`apply`](Self::apply) with a look per target. A name listed
    /// more than once takes its first look. Names that stay highlighted keep
    /// the look they already have.
    ///
    /// Saved originals are dropped once nothing is highlighted any more.
    pub fn apply_styled<S: SceneHandle + ?Sized>(
        &mut self,
        targets: &[(String, HighlightStyle)],
        scene: &mut S,
    ) -> HighlightChange {
        let mut wanted: FxHashMap<String, &HighlightStyle> = FxHashMap::default();
        for (name, style) in targets {
            let name = normalize_element_name(name);
            if !name.is_empty() {
                wanted.entry(name).or_insert(style);
            }
        }
        let mut change = HighlightChange::default();

        let mut leaving: Vec<String> = self
            .state
            .highlighted
            .keys()
            .filter(|name| !wanted.contains_key(*name))
            .cloned()
            .collect();
        leaving.sort();
        for name in leaving {
            if let Some(ids) = self.state.highlighted.remove(&name) {
                for id in &ids {
                    let original = self
                        .state
                        .originals
                        .get(id)
                        .cloned()
                        .unwrap_or_else(MaterialSnapshot::neutral);
                    scene.set_material(id, &original);
                    change.restored += 1;
                }
            }
        }

        let mut entering: Vec<(&String, &HighlightStyle)> = wanted
            .iter()
            .filter(|(name, _)| !self.state.highlighted.contains_key(*name))
            .map(|(name, style)| (name, *style))
            .collect();
        entering.sort_by(|a, b| a.0.cmp(b.0));
        for (name, style) in entering {
            let ids = scene.element_ids(name);
            if ids.is_empty() {
                continue;
            }
            let highlight = style.to_material();
            for id in &ids {
                if !self.state.originals.contains_key(id) {
                    if let Some(current) = scene.material(id) {
                        self.state.originals.insert(id.clone(), current);
                    }
                }
                scene.set_material(id, &highlight);
                change.highlighted += 1;
            }
            self.state.highlighted.insert(name.clone(), ids);
        }

        if self.state.highlighted.is_empty() {
            self.state.originals.clear();
        }

        tracing::debug!(
            highlighted = change.highlighted,
            restored = change.restored,
            active = self.state.highlighted.len(),
            "Applied highlight"
        );
        change
    }

    /// Restores every highlighted element and forgets saved originals.
    pub fn reset<S: SceneHandle + ?Sized>(&mut self, scene: &mut S) -> HighlightChange {
        self.apply_styled(&[], scene)
    }
}

/// In-memory scene: materials by id plus a log of every assignment.
///
/// Stands in for a renderer on the server side, where the assignments are
/// shipped to the browser instead of being drawn.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    ids_by_name: FxHashMap<String, ElementIds>,
    materials: FxHashMap<ElementId, MaterialSnapshot>,
    commands: Vec<MaterialCommand>,
}

/// One `setMaterial(elementId, materialSpec)` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCommand {
    pub element_id: ElementId,
    pub material: MaterialSnapshot,
}

impl RecordingScene {
    /// Registers every element of the trees, using the reported material or
    /// the neutral one.
    pub fn from_elements(elements: &[crate::types::SceneElement]) -> Self {
        let mut scene = Self::default();
        for element in crate::types::flatten_elements(elements) {
            scene.insert(
                element.id.clone(),
                &element.name,
                element.material.clone().unwrap_or_default(),
            );
        }
        scene
    }

    pub fn insert(&mut self, id: ElementId, name: &str, material: MaterialSnapshot) {
        let name = normalize_element_name(name);
        let ids = self.ids_by_name.entry(name).or_default();
        if !ids.contains(&id) {
            ids.push(id.clone());
        }
        self.materials.insert(id, material);
    }

    /// Commands recorded since the last drain, in call order.
    pub fn drain_commands(&mut self) -> Vec<MaterialCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn commands(&self) -> &[MaterialCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl SceneHandle for RecordingScene {
    fn element_ids(&self, name: &str) -> ElementIds {
        self.ids_by_name.get(name).cloned().unwrap_or_default()
    }

    fn material(&self, id: &ElementId) -> Option<MaterialSnapshot> {
        self.materials.get(id).cloned()
    }

    fn set_material(&mut self, id: &ElementId, material: &MaterialSnapshot) {
        self.materials.insert(id.clone(), material.clone());
        self.commands.push(MaterialCommand {
            element_id: id.clone(),
            material: material.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Color;

    fn brick() -> MaterialSnapshot {
        MaterialSnapshot {
            color: Color(0xCD853F),
            ..MaterialSnapshot::neutral()
        }
    }

    fn scene() -> RecordingScene {
        let mut scene = RecordingScene::default();
        scene.insert("a".into(), "a", brick());
        scene.insert("b".into(), "b", MaterialSnapshot::neutral());
        scene.insert("c".into(), "c", brick());
        scene
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn highlight_then_clear_restores_originals() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();

        let change = applicator.apply(&names(&["a", "b"]), &mut scene);
        assert_eq!(change, HighlightChange { highlighted: 2, restored: 0 });
        let highlight = HighlightStyle::default().to_material();
        assert_eq!(scene.material(&"a".into()), Some(highlight));

        let change = applicator.apply(&[], &mut scene);
        assert_eq!(change, HighlightChange { highlighted: 0, restored: 2 });
        assert!(applicator.state().is_empty());
        assert!(applicator.state().original(&"a".into()).is_none());
        assert_eq!(scene.material(&"a".into()), Some(brick()));
        assert_eq!(scene.material(&"b".into()), Some(MaterialSnapshot::neutral()));
    }

    #[test]
    fn repeated_toggling_keeps_true_original() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        for _ in 0..3 {
            applicator.apply(&names(&["a"]), &mut scene);
            applicator.apply(&names(&["a", "c"]), &mut scene);
            applicator.apply(&[], &mut scene);
        }
        assert_eq!(scene.material(&"a".into()), Some(brick()));
        assert_eq!(scene.material(&"c".into()), Some(brick()));
    }

    #[test]
    fn still_targeted_elements_are_not_touched() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        applicator.apply(&names(&["a", "b", "c"]), &mut scene);
        scene.drain_commands();

        let change = applicator.apply(&names(&["b", "c"]), &mut scene);
        assert_eq!(change, HighlightChange { highlighted: 0, restored: 1 });
        let commands = scene.drain_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].element_id, ElementId::from("a"));
        assert_eq!(applicator.state().names(), ["b", "c"]);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        let change = applicator.apply(&names(&["1.3_.040", "a"]), &mut scene);
        assert_eq!(change.highlighted, 1);
        assert!(!applicator.state().is_highlighted("1.3_.040"));
    }

    #[test]
    fn missing_original_restores_neutral() {
        struct Blind(RecordingScene);
        impl SceneHandle for Blind {
            fn element_ids(&self, name: &str) -> ElementIds {
                self.0.element_ids(name)
            }
            fn material(&self, _id: &ElementId) -> Option<MaterialSnapshot> {
                None
            }
            fn set_material(&mut self, id: &ElementId, material: &MaterialSnapshot) {
                self.0.set_material(id, material)
            }
        }

        let mut scene = Blind(scene());
        let mut applicator = HighlightApplicator::default();
        applicator.apply(&names(&["a"]), &mut scene);
        applicator.apply(&[], &mut scene);
        assert_eq!(scene.0.material(&"a".into()), Some(MaterialSnapshot::neutral()));
    }

    #[test]
    fn shared_name_highlights_every_element() {
        let mut scene = RecordingScene::default();
        scene.insert("m1".into(), "2.1_", brick());
        scene.insert("m2".into(), "2.1_", brick());
        let mut applicator = HighlightApplicator::default();
        let change = applicator.apply(&names(&["2.1_"]), &mut scene);
        assert_eq!(change.highlighted, 2);
    }

    #[test]
    fn originals_kept_while_anything_stays_highlighted() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        applicator.apply(&names(&["a", "c"]), &mut scene);
        applicator.apply(&names(&["c"]), &mut scene);
        assert!(applicator.state().original(&"c".into()).is_some());
        assert!(!applicator.state().is_empty());
    }

    #[test]
    fn later_highlight_captures_current_material() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        applicator.apply(&names(&["a"]), &mut scene);
        applicator.apply(&[], &mut scene);

        // the renderer repaints "a" while nothing is highlighted
        scene.set_material(&"a".into(), &MaterialSnapshot::neutral());
        applicator.apply(&names(&["a"]), &mut scene);
        applicator.apply(&[], &mut scene);
        assert_eq!(scene.material(&"a".into()), Some(MaterialSnapshot::neutral()));
    }

    #[test]
    fn styled_targets_get_their_own_color() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        let teal = HighlightStyle::with_color(Color(0x4ECDC4));
        let targets = vec![
            ("a".to_string(), teal.clone()),
            ("b".to_string(), HighlightStyle::default()),
            ("a".to_string(), HighlightStyle::default()),
        ];
        let change = applicator.apply_styled(&targets, &mut scene);
        assert_eq!(change.highlighted, 2);
        assert_eq!(scene.material(&"a".into()), Some(teal.to_material()));
        assert_eq!(
            scene.material(&"b".into()),
            Some(HighlightStyle::default().to_material())
        );
    }

    #[test]
    fn reset_forgets_originals() {
        let mut scene = scene();
        let mut applicator = HighlightApplicator::default();
        applicator.apply(&names(&["a"]), &mut scene);
        applicator.reset(&mut scene);
        assert!(applicator.state().original(&"a".into()).is_none());
        assert_eq!(scene.material(&"a".into()), Some(brick()));
    }
}
