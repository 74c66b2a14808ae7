// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use anyhow::Context;
use budget_link_core::{LinkingConfig, PatternTable};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum request body size in MB.
    pub max_body_size_mb: usize,
    /// Maximum number of live linking sessions; the oldest is evicted beyond it.
    pub max_sessions: usize,
    /// Project pattern table (JSON). The built-in table is used when unset.
    pub pattern_table_path: Option<String>,
    /// Server-wide confidence threshold, replacing the one stored in configs.
    pub require_confidence: Option<f64>,
    /// Allowed CORS origins (comma-separated, or "*" for all in development).
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 8080),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            max_body_size_mb: env_or("MAX_BODY_SIZE_MB", 20),
            max_sessions: env_or("MAX_SESSIONS", 64).max(1),
            pattern_table_path: std::env::var("PATTERN_TABLE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            require_confidence: std::env::var("REQUIRE_CONFIDENCE")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| {
                    // Default: allow common development origins
                    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173".into()
                })
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Reads the configured pattern table, or the built-in one.
    pub fn load_pattern_table(&self) -> anyhow::Result<PatternTable> {
        let Some(path) = &self.pattern_table_path else {
            return Ok(PatternTable::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading pattern table {path}"))?;
        PatternTable::from_json(&json).with_context(|| format!("loading pattern table {path}"))
    }

    /// Applies server-wide policy to a config before it is validated.
    pub fn apply_policy(&self, config: &mut LinkingConfig) {
        if let Some(threshold) = self.require_confidence {
            config.settings.require_confidence = threshold;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            request_timeout_secs: 30,
            max_body_size_mb: 20,
            max_sessions: 64,
            pattern_table_path: None,
            require_confidence: None,
            cors_origins: vec!["*".to_string()],
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
