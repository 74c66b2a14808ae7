// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer-side linking session.
//!
//! The viewer keeps a [`RecordingScene`] mirror of element materials. Every
//! assignment the engine makes is recorded there and then forwarded to the
//! renderer through the `setMaterial(elementId, materialSpec)` callback the
//! caller passes in.

use budget_link_core::{
    validate, BudgetItem, HighlightChange, LinkingConfig, LinkingSession, PatternTable,
    RecordingScene, SceneElement,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::utils::{debug, from_js, to_js, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleResultJs {
    selected: bool,
    highlighted: usize,
    restored: usize,
}

/// Budget/scene linking bound to one loaded model.
#[wasm_bindgen]
pub struct LinkingViewer {
    session: LinkingSession,
    scene: RecordingScene,
}

#[wasm_bindgen]
impl LinkingViewer {
    /// Create a viewer from arrays of budget items and scene elements
    #[wasm_bindgen(constructor)]
    pub fn new(budget_items: JsValue, scene_elements: JsValue) -> Result<LinkingViewer, JsError> {
        crate::utils::set_panic_hook();

        let items: Vec<BudgetItem> = from_js(budget_items, "budget items")?;
        let elements: Vec<SceneElement> = from_js(scene_elements, "scene elements")?;
        let scene = RecordingScene::from_elements(&elements);
        let session = LinkingSession::new(items, elements);
        debug(&format!(
            "[budget-link] indexed {} codes over {} elements",
            session.index().len(),
            scene.len()
        ));

        Ok(Self { session, scene })
    }

    /// Replace the budget and scene lists. Current highlights are cleared
    /// first through `set_material`.
    #[wasm_bindgen(js_name = setInputs)]
    pub fn set_inputs(
        &mut self,
        budget_items: JsValue,
        scene_elements: JsValue,
        set_material: &js_sys::Function,
    ) -> Result<bool, JsError> {
        let items: Vec<BudgetItem> = from_js(budget_items, "budget items")?;
        let elements: Vec<SceneElement> = from_js(scene_elements, "scene elements")?;

        self.session.clear(&mut self.scene);
        self.flush(set_material)?;

        self.scene = RecordingScene::from_elements(&elements);
        Ok(self.session.set_inputs(items, elements))
    }

    /// Install manual links (pass `null` to remove them). Returns the
    /// validation warnings; validation errors reject the config.
    #[wasm_bindgen(js_name = setLinkingConfig)]
    pub fn set_linking_config(&mut self, config: JsValue) -> Result<JsValue, JsError> {
        if config.is_null() || config.is_undefined() {
            self.session.set_linking_config(None);
            return to_js::<[String]>(&[]);
        }

        let config: LinkingConfig = from_js(config, "linking config")?;
        let report = validate(&config);
        if !report.is_valid {
            return Err(JsError::new(&format!(
                "Invalid linking config: {}",
                report.errors.join("; ")
            )));
        }
        for warning in &report.warnings {
            warn(&format!("[budget-link] {}", warning));
        }
        self.session.set_linking_config(Some(config));
        to_js(&report.warnings)
    }

    /// Replace the curated pattern table from its JSON form
    #[wasm_bindgen(js_name = setPatternTable)]
    pub fn set_pattern_table(&mut self, table_json: &str) -> Result<(), JsError> {
        let table = PatternTable::from_json(table_json)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.session.set_pattern_table(table);
        Ok(())
    }

    /// Toggle a budget code and push the resulting material changes
    #[wasm_bindgen]
    pub fn toggle(&mut self, code: &str, set_material: &js_sys::Function) -> Result<JsValue, JsError> {
        let change = self.session.toggle(code, &mut self.scene);
        self.flush(set_material)?;
        self.toggle_result(code, change)
    }

    #[wasm_bindgen]
    pub fn select(&mut self, code: &str, set_material: &js_sys::Function) -> Result<JsValue, JsError> {
        let change = self.session.select(code, &mut self.scene);
        self.flush(set_material)?;
        self.toggle_result(code, change)
    }

    #[wasm_bindgen]
    pub fn deselect(&mut self, code: &str, set_material: &js_sys::Function) -> Result<JsValue, JsError> {
        let change = self.session.deselect(code, &mut self.scene);
        self.flush(set_material)?;
        self.toggle_result(code, change)
    }

    /// Empty the selection and restore every original material
    #[wasm_bindgen]
    pub fn clear(&mut self, set_material: &js_sys::Function) -> Result<usize, JsError> {
        let change = self.session.clear(&mut self.scene);
        self.flush(set_material)?;
        Ok(change.restored)
    }

    /// Highlighted element names, sorted
    #[wasm_bindgen]
    pub fn highlighted(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.highlighted())
    }

    #[wasm_bindgen(js_name = selectedCodes)]
    pub fn selected_codes(&self) -> Result<JsValue, JsError> {
        to_js(self.session.selected_codes())
    }

    /// Correspondence index as `{code: [names]}`
    #[wasm_bindgen]
    pub fn index(&self) -> Result<JsValue, JsError> {
        to_js(self.session.index().as_ref())
    }

    /// Coverage report with keyword suggestions
    #[wasm_bindgen]
    pub fn report(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.report())
    }
}

impl LinkingViewer {
    /// Forwards recorded material assignments to the renderer.
    fn flush(&mut self, set_material: &js_sys::Function) -> Result<(), JsError> {
        for command in self.scene.drain_commands() {
            let id = JsValue::from_str(command.element_id.as_str());
            let material = to_js(&command.material)?;
            set_material
                .call2(&JsValue::NULL, &id, &material)
                .map_err(|e| {
                    JsError::new(&format!(
                        "setMaterial failed for {}: {:?}",
                        command.element_id, e
                    ))
                })?;
        }
        Ok(())
    }

    fn toggle_result(&self, code: &str, change: HighlightChange) -> Result<JsValue, JsError> {
        to_js(&ToggleResultJs {
            selected: self.session.is_selected(code),
            highlighted: change.highlighted,
            restored: change.restored,
        })
    }
}
