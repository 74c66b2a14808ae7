// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use budget_link_core::{BudgetItem, ExportFormat, LinkingConfig, SceneElement};
use serde::Deserialize;

/// Body of `POST /api/v1/sessions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub budget_items: Vec<BudgetItem>,
    pub scene_elements: Vec<SceneElement>,
    /// Manual links overriding automatic matching.
    #[serde(default)]
    pub linking_config: Option<LinkingConfig>,
}

/// Body of the toggle endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    pub code: String,
}

/// Query of the export endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Query of the import endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub format: ExportFormat,
    /// Project name for CSV imports, which carry none.
    #[serde(default)]
    pub project: Option<String>,
}
