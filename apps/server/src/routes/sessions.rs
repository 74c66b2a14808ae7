// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linking session endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use budget_link_core::{validate, LinkingReport, LinkingSession};

use crate::error::ApiError;
use crate::services::SessionEntry;
use crate::types::{
    ClearResponse, CreateSessionRequest, CreateSessionResponse, IndexEntry, IndexResponse,
    ToggleRequest, ToggleResponse,
};
use crate::AppState;

/// POST /api/v1/sessions - Build the index for a budget/scene pair.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let linking = match request.linking_config {
        Some(mut config) => {
            state.config.apply_policy(&mut config);
            let report = validate(&config);
            if !report.is_valid {
                return Err(ApiError::Validation {
                    errors: report.errors,
                });
            }
            Some(config)
        }
        None => None,
    };

    let mut session = LinkingSession::with_pattern_table(
        request.budget_items,
        request.scene_elements,
        state.patterns.as_ref().clone(),
    );
    session.set_linking_config(linking);

    let entry = SessionEntry::new(session);
    let indexed_codes = entry.session.index().len();
    let scene_elements = entry.scene.len();
    let id = state.sessions.insert(entry).await;

    tracing::info!(session = %id, indexed_codes, scene_elements, "Created linking session");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: id.to_string(),
            indexed_codes,
            scene_elements,
        }),
    ))
}

/// GET /api/v1/sessions/:id/index - Correspondence index, ordered by code.
pub async fn index(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IndexResponse>, ApiError> {
    let entry = state.sessions.get(&id).await?;
    let entry = entry.lock().await;
    let entries = entry
        .session
        .index()
        .sorted_entries()
        .into_iter()
        .map(|(code, names)| IndexEntry {
            code: code.to_string(),
            elements: names.to_vec(),
        })
        .collect();
    Ok(Json(IndexResponse { entries }))
}

/// POST /api/v1/sessions/:id/toggle - Flip one budget code.
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let code = request.code.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::InvalidRequest("code must not be empty".into()));
    }

    let entry = state.sessions.get(&id).await?;
    let mut guard = entry.lock().await;
    let SessionEntry { session, scene } = &mut *guard;

    let change = session.toggle(&code, scene);
    let commands = scene.drain_commands();
    tracing::debug!(session = %id, code = %code, commands = commands.len(), "Toggle");

    Ok(Json(ToggleResponse {
        selected: session.is_selected(&code),
        source: session.source_for(&code),
        change,
        commands,
        highlighted: session.highlighted(),
        selected_codes: session.selected_codes().to_vec(),
        code,
    }))
}

/// POST /api/v1/sessions/:id/clear - Empty the selection.
pub async fn clear(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    let entry = state.sessions.get(&id).await?;
    let mut guard = entry.lock().await;
    let SessionEntry { session, scene } = &mut *guard;

    let change = session.clear(scene);
    Ok(Json(ClearResponse {
        restored: change.restored,
        commands: scene.drain_commands(),
    }))
}

/// GET /api/v1/sessions/:id/report - Coverage report and suggestions.
pub async fn report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LinkingReport>, ApiError> {
    let entry = state.sessions.get(&id).await?;
    let report = entry.lock().await.session.report();
    Ok(Json(report))
}

/// DELETE /api/v1/sessions/:id - Tear a session down.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id).await?;
    tracing::info!(session = %id, "Closed linking session");
    Ok(StatusCode::NO_CONTENT)
}
