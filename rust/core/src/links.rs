// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Confidence-scored manual link table.
//!
//! Operators curate explicit (3D element, budget item) pairs ahead of deploy
//! when automatic matching misses a naming convention. The table travels as
//! a versioned [`LinkingConfig`] in JSON, with a flat CSV view for
//! spreadsheet review.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::csv::{parse_records, write_row};
use crate::error::{Error, Result};

/// Column header of the CSV exchange format.
pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Elemento 3D",
    "Categoria 3D",
    "Item Código",
    "Item Descrição",
    "Tipo Link",
    "Confiança",
    "Validado",
];

/// How a link was established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Exact,
    Category,
    #[default]
    Manual,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Exact => "exact",
            LinkType::Category => "category",
            LinkType::Manual => "manual",
        }
    }
}

impl FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(LinkType::Exact),
            "category" => Ok(LinkType::Category),
            "manual" => Ok(LinkType::Manual),
            other => Err(format!("unknown link type: {other}")),
        }
    }
}

/// The 3D side of a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element3D {
    pub id: String,
    pub name: String,
    pub category: String,
    pub keywords: Vec<String>,
}

/// The budget side of a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetItemRef {
    pub id: String,
    pub code: String,
    pub description: String,
    pub category: String,
}

/// One curated (element, budget item) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManualLink {
    pub id: String,
    #[serde(rename = "element3D")]
    pub element_3d: Element3D,
    pub budget_item: BudgetItemRef,
    pub link_type: LinkType,
    /// 0-100.
    pub confidence: f64,
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

impl ManualLink {
    /// New, not yet validated link stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        element_3d: Element3D,
        budget_item: BudgetItemRef,
        link_type: LinkType,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            element_3d,
            budget_item,
            link_type,
            confidence,
            validated: false,
            notes: None,
            created_at: now(),
        }
    }
}

/// Per-project knobs stored with the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkingSettings {
    pub auto_validate: bool,
    /// Links below this confidence are reported as warnings.
    pub require_confidence: f64,
    pub enable_preview: bool,
}

impl Default for LinkingSettings {
    fn default() -> Self {
        Self {
            auto_validate: true,
            require_confidence: 80.0,
            enable_preview: true,
        }
    }
}

/// Versioned manual link table for one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkingConfig {
    pub version: String,
    pub last_updated: String,
    pub project: String,
    pub links: Vec<ManualLink>,
    pub settings: LinkingSettings,
}

impl LinkingConfig {
    pub fn new(project: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            last_updated: now(),
            project: project.into(),
            links: Vec::new(),
            settings: LinkingSettings::default(),
        }
    }

    pub fn get_link(&self, id: &str) -> Option<&ManualLink> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Links pointing at the budget item with `code`.
    pub fn links_for_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ManualLink> + 'a {
        let code = code.trim();
        self.links.iter().filter(move |l| l.budget_item.code.trim() == code)
    }

    pub fn add_link(&mut self, link: ManualLink) -> Result<()> {
        if self.get_link(&link.id).is_some() {
            return Err(Error::DuplicateLinkId(link.id));
        }
        let link = self.auto_validated(link);
        self.links.push(link);
        self.touch();
        Ok(())
    }

    /// Replaces the link with the same id; returns the previous version.
    pub fn update_link(&mut self, link: ManualLink) -> Result<ManualLink> {
        let link = self.auto_validated(link);
        let slot = self
            .links
            .iter_mut()
            .find(|l| l.id == link.id)
            .ok_or_else(|| Error::LinkNotFound(link.id.clone()))?;
        let previous = std::mem::replace(slot, link);
        self.touch();
        Ok(previous)
    }

    pub fn remove_link(&mut self, id: &str) -> Result<ManualLink> {
        let pos = self
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::LinkNotFound(id.to_string()))?;
        let removed = self.links.remove(pos);
        self.touch();
        Ok(removed)
    }

    /// Stamps `last_updated` with the current time.
    pub fn touch(&mut self) {
        self.last_updated = now();
    }

    fn auto_validated(&self, mut link: ManualLink) -> ManualLink {
        if self.settings.auto_validate
            && (0.0..=100.0).contains(&link.confidence)
            && link.confidence >= self.settings.require_confidence
        {
            link.validated = true;
        }
        link
    }
}

/// Outcome of [`validate`]. Errors block save and export; warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks a link table for structural problems.
pub fn validate(config: &LinkingConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.version.trim().is_empty() {
        errors.push("version is not defined".to_string());
    }
    if config.project.trim().is_empty() {
        errors.push("project name is not defined".to_string());
    }
    if config.links.is_empty() {
        warnings.push("no links defined".to_string());
    }

    for (index, link) in config.links.iter().enumerate() {
        let n = index + 1;
        if link.id.trim().is_empty() {
            errors.push(format!("Link {n}: id is not defined"));
        }
        if link.element_3d.id.trim().is_empty() {
            errors.push(format!("Link {n}: 3D element id is not defined"));
        }
        if link.budget_item.id.trim().is_empty() {
            errors.push(format!("Link {n}: budget item id is not defined"));
        }
        if !(0.0..=100.0).contains(&link.confidence) {
            errors.push(format!("Link {n}: invalid confidence ({})", link.confidence));
        }
        if link.confidence < config.settings.require_confidence {
            warnings.push(format!("Link {n}: low confidence ({}%)", link.confidence));
        }
    }

    let mut seen = FxHashSet::default();
    let mut reported = FxHashSet::default();
    let mut duplicates = Vec::new();
    for link in &config.links {
        if !seen.insert(link.id.as_str()) && reported.insert(link.id.as_str()) {
            duplicates.push(link.id.as_str());
        }
    }
    if !duplicates.is_empty() {
        errors.push(format!("duplicate link ids: {}", duplicates.join(", ")));
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Export encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Serializes a table. Refuses tables with validation errors.
///
/// JSON is pretty-printed. CSV has one row per link under [`CSV_HEADER`].
pub fn export_config(config: &LinkingConfig, format: ExportFormat) -> Result<String> {
    let report = validate(config);
    if !report.is_valid {
        return Err(Error::InvalidConfig {
            errors: report.errors,
        });
    }

    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        ExportFormat::Csv => Ok(export_csv(config)),
    }
}

fn export_csv(config: &LinkingConfig) -> String {
    let mut lines = Vec::with_capacity(config.links.len() + 1);
    lines.push(write_row(&CSV_HEADER));
    for link in &config.links {
        let confidence = link.confidence.to_string();
        lines.push(write_row(&[
            link.id.as_str(),
            link.element_3d.name.as_str(),
            link.element_3d.category.as_str(),
            link.budget_item.code.as_str(),
            link.budget_item.description.as_str(),
            link.link_type.as_str(),
            confidence.as_str(),
            if link.validated { "Sim" } else { "Não" },
        ]));
    }
    lines.join("\n")
}

/// A table accepted by [`try_import_config`], with its non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Imported {
    pub config: LinkingConfig,
    pub warnings: Vec<String>,
}

/// Parses and validates a JSON table.
pub fn try_import_config(text: &str) -> Result<Imported> {
    let config: LinkingConfig = serde_json::from_str(text)?;
    accept(config)
}

/// Parses and validates a JSON table; `None` when it is malformed or has
/// validation errors. Problems are logged, warnings included.
pub fn import_config(text: &str) -> Option<LinkingConfig> {
    match try_import_config(text) {
        Ok(imported) => Some(imported.config),
        Err(err) => {
            tracing::error!(error = %err, "Rejected linking config import");
            None
        }
    }
}

/// Builds a table for `project` from the CSV view.
///
/// CSV carries no separate ids for the element and budget sides, so the
/// element name and the budget code stand in for them.
pub fn import_csv(text: &str, project: &str) -> Result<Imported> {
    let mut records = parse_records(text)?.into_iter();

    match records.next() {
        Some(header) if header_matches(&header.fields) => {}
        other => {
            return Err(Error::Csv {
                line: other.map_or(1, |r| r.line),
                message: format!("expected header: {}", CSV_HEADER.join(",")),
            })
        }
    }

    let mut config = LinkingConfig::new(project, "1.0.0");
    for record in records {
        let line = record.line;
        let row = record.fields;
        if row.len() != CSV_HEADER.len() {
            return Err(Error::Csv {
                line,
                message: format!("expected {} fields, found {}", CSV_HEADER.len(), row.len()),
            });
        }
        let csv_err = |message: String| Error::Csv { line, message };

        let confidence: f64 = row[6]
            .trim()
            .parse()
            .map_err(|_| csv_err(format!("invalid confidence: {}", row[6])))?;
        let link_type: LinkType = row[5].parse().map_err(csv_err)?;
        let validated = parse_flag(&row[7])
            .ok_or_else(|| csv_err(format!("invalid validated flag: {}", row[7])))?;

        let name = row[1].trim().to_string();
        let code = row[3].trim().to_string();
        config.links.push(ManualLink {
            id: row[0].trim().to_string(),
            element_3d: Element3D {
                id: name.clone(),
                name,
                category: row[2].trim().to_string(),
                keywords: Vec::new(),
            },
            budget_item: BudgetItemRef {
                id: code.clone(),
                code,
                description: row[4].trim().to_string(),
                category: String::new(),
            },
            link_type,
            confidence,
            validated,
            notes: None,
            created_at: config.last_updated.clone(),
        });
    }

    accept(config)
}

fn accept(config: LinkingConfig) -> Result<Imported> {
    let report = validate(&config);
    if !report.is_valid {
        return Err(Error::InvalidConfig {
            errors: report.errors,
        });
    }
    if !report.warnings.is_empty() {
        tracing::warn!(warnings = ?report.warnings, "Linking config imported with warnings");
    }
    Ok(Imported {
        config,
        warnings: report.warnings,
    })
}

fn header_matches(header: &[String]) -> bool {
    header.len() == CSV_HEADER.len()
        && header
            .iter()
            .zip(CSV_HEADER)
            .all(|(got, want)| got.trim() == want)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "sim" | "true" | "yes" | "1" => Some(true),
        "não" | "nao" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
