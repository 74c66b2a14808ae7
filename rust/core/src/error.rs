// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for linking operations.

/// Result type alias for linking operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, importing or exporting link data.
///
/// Matching and highlighting never fail: missing inputs degrade to empty
/// results instead of errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload was not valid JSON for the expected shape.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV payload could not be parsed.
    #[error("malformed CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// The configuration failed validation; the operation was not performed.
    #[error("invalid linking config: {}", .errors.join("; "))]
    InvalidConfig { errors: Vec<String> },

    /// A link with this id already exists in the configuration.
    #[error("duplicate link id: {0}")]
    DuplicateLinkId(String),

    /// No link with this id exists in the configuration.
    #[error("link not found: {0}")]
    LinkNotFound(String),

    /// A curated pattern table entry is unusable.
    #[error("invalid pattern table: {0}")]
    PatternTable(String),
}
