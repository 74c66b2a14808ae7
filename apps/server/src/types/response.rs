// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use budget_link_core::{
    ElementType, HighlightChange, LinkingConfig, MaterialCommand, ResolutionSource,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub indexed_codes: usize,
    pub scene_elements: usize,
}

#[derive(Debug, Serialize)]
pub struct IndexEntry {
    pub code: String,
    pub elements: Vec<String>,
}

/// Correspondence index, ordered by code.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub entries: Vec<IndexEntry>,
}

/// Outcome of a toggle: the `setMaterial` calls the renderer must replay and
/// the resulting highlighted set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub code: String,
    pub selected: bool,
    pub source: ResolutionSource,
    pub change: HighlightChange,
    pub commands: Vec<MaterialCommand>,
    pub highlighted: Vec<String>,
    pub selected_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub restored: usize,
    pub commands: Vec<MaterialCommand>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub config: LinkingConfig,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternResponse {
    pub code: String,
    pub patterns: Vec<String>,
    pub curated: bool,
    pub element_type: ElementType,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
