// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pattern table lookup.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiError;
use crate::types::PatternResponse;
use crate::AppState;

/// GET /api/v1/patterns/:code - Generated patterns plus curated metadata.
pub async fn lookup(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PatternResponse>, ApiError> {
    let code = code.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::InvalidRequest("code must not be empty".into()));
    }

    let table = &state.patterns;
    Ok(Json(PatternResponse {
        patterns: table.generate(&code),
        curated: table.find_entry(&code).is_some(),
        element_type: table.element_type_for(&code),
        color: table.color_for(&code).to_string(),
        description: table.description_for(&code).map(str::to_string),
        code,
    }))
}
