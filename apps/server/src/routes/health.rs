// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub active_sessions: usize,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

const fn endpoint(method: &'static str, path: &'static str, description: &'static str) -> EndpointInfo {
    EndpointInfo {
        method,
        path,
        description,
    }
}

/// GET /api/v1/health - Health check endpoint.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "budget-link-server",
        active_sessions: state.sessions.len().await,
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "budget-link-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Budget line item to 3D element linking and highlighting",
        endpoints: vec![
            endpoint("GET", "/api/v1/health", "Health check endpoint"),
            endpoint("POST", "/api/v1/sessions", "Create a linking session"),
            endpoint("GET", "/api/v1/sessions/:id/index", "Correspondence index"),
            endpoint("POST", "/api/v1/sessions/:id/toggle", "Toggle a budget code"),
            endpoint("POST", "/api/v1/sessions/:id/clear", "Clear the selection"),
            endpoint("GET", "/api/v1/sessions/:id/report", "Linking coverage report"),
            endpoint("DELETE", "/api/v1/sessions/:id", "Close a session"),
            endpoint("POST", "/api/v1/links/validate", "Validate a linking config"),
            endpoint("POST", "/api/v1/links/export", "Export a linking config (json|csv)"),
            endpoint("POST", "/api/v1/links/import", "Import a linking config (json|csv)"),
            endpoint("GET", "/api/v1/patterns/:code", "Patterns generated for a code"),
        ],
    })
}
