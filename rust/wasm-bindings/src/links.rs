// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manual link table tooling exposed to JavaScript

use budget_link_core::{
    export_config, generate_patterns as core_generate_patterns, import_csv, try_import_config,
    validate, ExportFormat, LinkingConfig,
};
use wasm_bindgen::prelude::*;

use crate::utils::{from_js, to_js, warn};

/// Scene-name patterns for a budget code, using the built-in curated table
#[wasm_bindgen(js_name = generatePatterns)]
pub fn generate_patterns(code: &str) -> Result<JsValue, JsError> {
    to_js(&core_generate_patterns(code))
}

/// Validate a linking config; returns `{isValid, errors, warnings}`
#[wasm_bindgen(js_name = validateLinkingConfig)]
pub fn validate_linking_config(config: JsValue) -> Result<JsValue, JsError> {
    let config: LinkingConfig = from_js(config, "linking config")?;
    to_js(&validate(&config))
}

/// Export a linking config as `"json"` or `"csv"`. Configs with validation
/// errors are refused.
#[wasm_bindgen(js_name = exportLinkingConfig)]
pub fn export_linking_config(config: JsValue, format: &str) -> Result<String, JsError> {
    let format: ExportFormat = format.parse().map_err(|e: String| JsError::new(&e))?;
    let config: LinkingConfig = from_js(config, "linking config")?;
    export_config(&config, format).map_err(|e| JsError::new(&e.to_string()))
}

/// Parse a JSON linking config. Returns `null` when it is malformed or
/// invalid; warnings go to the console.
#[wasm_bindgen(js_name = importLinkingConfig)]
pub fn import_linking_config(text: &str) -> JsValue {
    match try_import_config(text) {
        Ok(imported) => {
            for warning in &imported.warnings {
                warn(&format!("[budget-link] {}", warning));
            }
            to_js(&imported.config).unwrap_or(JsValue::NULL)
        }
        Err(e) => {
            warn(&format!("[budget-link] import rejected: {}", e));
            JsValue::NULL
        }
    }
}

/// Parse the CSV view of a linking config for `project`
#[wasm_bindgen(js_name = importLinkingCsv)]
pub fn import_linking_csv(text: &str, project: &str) -> Result<JsValue, JsError> {
    let imported = import_csv(text, project).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&imported.config)
}
