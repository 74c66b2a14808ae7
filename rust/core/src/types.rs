// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input records supplied by the spreadsheet and scene collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::material::MaterialSnapshot;

/// Renderer-local identifier of a scene element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One line of the construction budget.
///
/// `code` is the hierarchical dotted identifier (`"2.1"`) and the join key
/// into the engine; the cost fields ride along for the collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
}

impl BudgetItem {
    /// Budget item carrying only a code and description.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// A named node of the loaded 3D scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    pub id: ElementId,
    /// Name assigned by the authoring tool, e.g. `"2.1_.037"`.
    pub name: String,
    /// Material the element was loaded with, when the collaborator reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneElement>,
}

impl SceneElement {
    pub fn new(id: impl Into<ElementId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            material: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SceneElement>) -> Self {
        self.children = children;
        self
    }

    pub fn with_material(mut self, material: MaterialSnapshot) -> Self {
        self.material = Some(material);
        self
    }
}

/// Flattens element trees depth-first, parents before their children.
pub fn flatten_elements(elements: &[SceneElement]) -> Vec<&SceneElement> {
    let mut out = Vec::with_capacity(elements.len());
    let mut stack: Vec<&SceneElement> = elements.iter().rev().collect();
    while let Some(element) = stack.pop() {
        out.push(element);
        stack.extend(element.children.iter().rev());
    }
    out
}
