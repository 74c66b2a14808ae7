// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manual link table endpoints: validate, export, import.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use budget_link_core::{
    export_config, import_csv, try_import_config, validate, ExportFormat, LinkingConfig,
    ValidationReport,
};

use crate::error::ApiError;
use crate::types::{ExportQuery, ImportQuery, ImportResponse};
use crate::AppState;

/// POST /api/v1/links/validate
pub async fn validate_config(
    State(state): State<AppState>,
    Json(mut config): Json<LinkingConfig>,
) -> Json<ValidationReport> {
    state.config.apply_policy(&mut config);
    Json(validate(&config))
}

/// POST /api/v1/links/export?format=json|csv - Refused with 400 when the
/// config has validation errors.
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Json(mut config): Json<LinkingConfig>,
) -> Result<impl IntoResponse, ApiError> {
    state.config.apply_policy(&mut config);
    let body = export_config(&config, query.format)?;
    let content_type = match query.format {
        ExportFormat::Json => "application/json",
        ExportFormat::Csv => "text/csv; charset=utf-8",
    };
    tracing::debug!(format = %query.format, links = config.links.len(), "Exported linking config");
    Ok(([(header::CONTENT_TYPE, content_type)], body))
}

/// POST /api/v1/links/import - JSON by default, CSV with `?format=csv`.
pub async fn import(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let imported = match query.format {
        ExportFormat::Json => try_import_config(&body),
        ExportFormat::Csv => {
            let project = query
                .project
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ApiError::InvalidRequest("CSV import needs ?project=".into()))?;
            import_csv(&body, project)
        }
    }
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected linking config import");
        ApiError::from(e)
    })?;

    let mut config = imported.config;
    state.config.apply_policy(&mut config);
    let report = validate(&config);
    if !report.is_valid {
        return Err(ApiError::Validation {
            errors: report.errors,
        });
    }

    Ok(Json(ImportResponse {
        config,
        warnings: report.warnings,
    }))
}
