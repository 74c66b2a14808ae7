// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene-name pattern generation for budget codes.
//!
//! Two tiers: a curated, project-scoped table of hand-written pattern lists
//! for well-known structural codes, and a generic fallback synthesized from
//! the code itself. Curated entries always take precedence.

use std::sync::OnceLock;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::material::{Color, HighlightStyle};
use crate::normalize::{normalize_code, underscore_variant, SEPARATOR};

/// Highest zero-padded suffix enumerated by the fallback generator.
pub const MAX_NUMERIC_SUFFIX: u32 = 10;

/// Structural role of a curated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Viga,
    Pilar,
    Laje,
    Fundacao,
    Grupo,
    Unknown,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Viga => "viga",
            ElementType::Pilar => "pilar",
            ElementType::Laje => "laje",
            ElementType::Fundacao => "fundacao",
            ElementType::Grupo => "grupo",
            ElementType::Unknown => "unknown",
        }
    }
}

/// Hand-authored pattern list for one budget code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedEntry {
    pub code: String,
    #[serde(default)]
    pub label: String,
    pub element_type: ElementType,
    pub color: Color,
    #[serde(default)]
    pub description: String,
    pub search_patterns: Vec<String>,
}

/// Project-scoped curated pattern table plus the default highlight look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternTable {
    pub entries: Vec<CuratedEntry>,
    pub default_color: Color,
    pub highlight_opacity: f32,
    pub emissive_intensity: f32,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::reference().clone()
    }
}

impl PatternTable {
    /// Table with no curated entries; every code goes through the fallback.
    pub fn empty() -> Self {
        let style = HighlightStyle::default();
        Self {
            entries: Vec::new(),
            default_color: style.color,
            highlight_opacity: style.opacity,
            emissive_intensity: style.emissive_intensity,
        }
    }

    /// The compiled-in table for the reference structural project.
    pub fn reference() -> &'static PatternTable {
        static REFERENCE: OnceLock<PatternTable> = OnceLock::new();
        REFERENCE.get_or_init(build_reference_table)
    }

    /// Loads and checks a project table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: PatternTable = serde_json::from_str(json)?;
        table.check()?;
        Ok(table)
    }

    fn check(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for (index, entry) in self.entries.iter().enumerate() {
            let code = normalize_code(&entry.code);
            if code.is_empty() {
                return Err(Error::PatternTable(format!("entry {} has no code", index + 1)));
            }
            if entry.search_patterns.iter().all(|p| p.trim().is_empty()) {
                return Err(Error::PatternTable(format!(
                    "entry {code} has no search patterns"
                )));
            }
            if !seen.insert(code.clone()) {
                return Err(Error::PatternTable(format!("code {code} listed twice")));
            }
        }
        Ok(())
    }

    /// Curated entry for `code`: an exact code match first, otherwise the
    /// first entry with a search pattern contained in the code.
    pub fn find_entry(&self, code: &str) -> Option<&CuratedEntry> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .or_else(|| {
                self.entries.iter().find(|entry| {
                    entry
                        .search_patterns
                        .iter()
                        .any(|p| !p.is_empty() && code.contains(p.as_str()))
                })
            })
    }

    /// Ordered, de-duplicated patterns for `code`. Deterministic.
    pub fn generate(&self, code: &str) -> Vec<String> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Vec::new();
        }
        match self.find_entry(&code) {
            Some(entry) => dedup_in_order(entry.search_patterns.iter().cloned()),
            None => fallback_patterns(&code),
        }
    }

    pub fn color_for(&self, code: &str) -> Color {
        self.find_entry(code)
            .map(|e| e.color)
            .unwrap_or(self.default_color)
    }

    pub fn element_type_for(&self, code: &str) -> ElementType {
        self.find_entry(code)
            .map(|e| e.element_type)
            .unwrap_or(ElementType::Unknown)
    }

    pub fn description_for(&self, code: &str) -> Option<&str> {
        self.find_entry(code).map(|e| e.description.as_str())
    }

    /// Highlight look for a code: the curated color, or the table default.
    pub fn style_for(&self, code: &str) -> HighlightStyle {
        HighlightStyle {
            color: self.color_for(code),
            emissive_intensity: self.emissive_intensity,
            opacity: self.highlight_opacity,
        }
    }

    /// Table-wide highlight look.
    pub fn default_style(&self) -> HighlightStyle {
        HighlightStyle {
            color: self.default_color,
            emissive_intensity: self.emissive_intensity,
            opacity: self.highlight_opacity,
        }
    }
}

/// Patterns for `code` using the compiled-in reference table.
pub fn generate_patterns(code: &str) -> Vec<String> {
    PatternTable::reference().generate(code)
}

/// Generic patterns: the bare code, the code with a trailing separator, the
/// dot-substituted variant, and zero-padded numeric suffixes `001..=010`.
fn fallback_patterns(code: &str) -> Vec<String> {
    let variant = underscore_variant(code);
    let mut patterns = Vec::with_capacity(3 + 2 * MAX_NUMERIC_SUFFIX as usize);
    patterns.push(code.to_string());
    patterns.push(format!("{code}{SEPARATOR}"));
    patterns.push(format!("{variant}{SEPARATOR}"));
    for n in 1..=MAX_NUMERIC_SUFFIX {
        patterns.push(format!("{code}{SEPARATOR}{n:03}"));
        patterns.push(format!("{variant}{SEPARATOR}{n:03}"));
    }
    dedup_in_order(patterns)
}

fn dedup_in_order(patterns: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    patterns
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

fn build_reference_table() -> PatternTable {
    const VIGA: Color = Color(0xFF6B35);
    const PILAR: Color = Color(0x4ECDC4);
    const LAJE: Color = Color(0x45B7D1);
    const GRUPO: Color = Color(0x96CEB4);

    fn entry(
        code: &str,
        label: &str,
        element_type: ElementType,
        color: Color,
        description: &str,
        patterns: &[&str],
    ) -> CuratedEntry {
        CuratedEntry {
            code: code.to_string(),
            label: label.to_string(),
            element_type,
            color,
            description: description.to_string(),
            search_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    use ElementType::*;
    let entries = vec![
        entry(
            "1",
            "Fundação",
            Grupo,
            GRUPO,
            "Grupo principal - Fundação",
            &["1_", "1.1_", "1.2_", "1.3_", "Fundacao", "Fundação"],
        ),
        entry(
            "1.1",
            "Vigas da Fundação",
            Viga,
            VIGA,
            "Vigas baldrame da fundação",
            &["1.1_", "1.1_.001", "1.1_.002", "1.1_.003", "Viga_Fundacao", "Viga_Fundação"],
        ),
        entry(
            "1.2",
            "Pilares da Fundação",
            Pilar,
            PILAR,
            "Pilares da fundação",
            &["1.2_", "1.2_.001", "1.2_.002", "1.2_.003", "Pilar_Fundacao", "Pilar_Fundação"],
        ),
        entry(
            "1.3",
            "Fundações",
            Fundacao,
            LAJE,
            "Sapatas e fundações",
            &["1.3_", "1.3_.001", "1.3_.002", "1.3_.003", "Sapata", "Fundacao_Base"],
        ),
        entry(
            "2",
            "Térreo",
            Grupo,
            GRUPO,
            "Grupo principal - Térreo",
            &["2_", "2.1_", "2.2_", "2.3_", "Terreo", "Térreo"],
        ),
        entry(
            "2.1",
            "Vigas do Térreo",
            Viga,
            VIGA,
            "Vigas do pavimento térreo",
            &["2.1_", "2.1_.001", "2.1_.002", "2.1_.003", "2.1_.004", "Viga_Terreo", "Viga_Térreo"],
        ),
        entry(
            "2.2",
            "Pilares do Térreo",
            Pilar,
            PILAR,
            "Pilares do pavimento térreo",
            &[
                "2.2_",
                "2.2_.001",
                "2.2_.002",
                "2.2_.003",
                "2.2_.004",
                "Pilar_Terreo",
                "Pilar_Térreo",
            ],
        ),
        entry(
            "2.3",
            "Lajes do Térreo",
            Laje,
            LAJE,
            "Lajes do pavimento térreo",
            &["2.3_", "2.3_.001", "2.3_.002", "2.3_.003", "Laje_Terreo", "Laje_Térreo"],
        ),
        entry(
            "3",
            "Pavimento Superior",
            Grupo,
            GRUPO,
            "Grupo principal - Pavimento Superior",
            &["3_", "3.1_", "3.2_", "3.3_", "Pavimento_Superior", "Superior"],
        ),
        entry(
            "3.1",
            "Vigas do Pavimento Superior",
            Viga,
            VIGA,
            "Vigas do pavimento superior",
            &["3.1_", "3.1_.001", "3.1_.002", "3.1_.003", "3.1_.004", "Viga_Superior"],
        ),
        entry(
            "3.2",
            "Pilares do Pavimento Superior",
            Pilar,
            PILAR,
            "Pilares do pavimento superior",
            &["3.2_", "3.2_.001", "3.2_.002", "3.2_.003", "3.2_.004", "Pilar_Superior"],
        ),
        entry(
            "3.3",
            "Lajes do Pavimento Superior",
            Laje,
            LAJE,
            "Lajes do pavimento superior",
            &["3.3_", "3.3_.001", "3.3_.002", "3.3_.003", "Laje_Superior"],
        ),
    ];

    PatternTable {
        entries,
        ..PatternTable::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_code_returns_its_list_verbatim() {
        let patterns = generate_patterns("2.1");
        assert_eq!(
            patterns,
            ["2.1_", "2.1_.001", "2.1_.002", "2.1_.003", "2.1_.004", "Viga_Terreo", "Viga_Térreo"]
        );
    }

    #[test]
    fn fallback_for_unknown_code() {
        let patterns = PatternTable::empty().generate("4.7");
        assert_eq!(&patterns[..3], ["4.7", "4.7_", "4_7_"]);
        assert!(patterns.contains(&"4.7_001".to_string()));
        assert!(patterns.contains(&"4_7_010".to_string()));
        assert!(!patterns.contains(&"4.7_011".to_string()));
        assert_eq!(patterns.len(), 3 + 2 * MAX_NUMERIC_SUFFIX as usize);
    }

    #[test]
    fn fallback_deduplicates_dotless_codes() {
        // "5" and its underscore variant coincide
        let patterns = PatternTable::empty().generate("5");
        assert_eq!(&patterns[..2], ["5", "5_"]);
        assert_eq!(patterns.len(), 2 + MAX_NUMERIC_SUFFIX as usize);
        let unique: FxHashSet<_> = patterns.iter().collect();
        assert_eq!(unique.len(), patterns.len());
    }

    #[test]
    fn generation_is_deterministic() {
        let table = PatternTable::empty();
        assert_eq!(table.generate("9.2"), table.generate("9.2"));
        assert_eq!(generate_patterns("1.1"), generate_patterns("1.1"));
    }

    #[test]
    fn empty_code_yields_no_patterns() {
        assert!(generate_patterns("").is_empty());
        assert!(generate_patterns("   ").is_empty());
    }

    #[test]
    fn curated_metadata_lookups() {
        let table = PatternTable::reference();
        assert_eq!(table.color_for("2.2"), Color(0x4ECDC4));
        assert_eq!(table.element_type_for("3.3"), ElementType::Laje);
        assert_eq!(table.element_type_for("9.9"), ElementType::Unknown);
        assert_eq!(table.color_for("9.9"), table.default_color);
        assert_eq!(table.description_for("1.3"), Some("Sapatas e fundações"));
    }

    #[test]
    fn entry_found_when_code_contains_a_pattern() {
        let table = PatternTable::reference();
        let entry = table.find_entry("Viga_Terreo_X").unwrap();
        assert_eq!(entry.code, "2.1");
    }

    #[test]
    fn from_json_rejects_duplicate_codes() {
        let json = r##"{
            "entries": [
                {"code": "1", "elementType": "grupo", "color": "#96ceb4", "searchPatterns": ["1_"]},
                {"code": "1", "elementType": "viga", "color": "#ff6b35", "searchPatterns": ["1.1_"]}
            ],
            "defaultColor": "#ff6b35",
            "highlightOpacity": 0.8,
            "emissiveIntensity": 0.3
        }"##;
        assert!(matches!(PatternTable::from_json(json), Err(Error::PatternTable(_))));
    }

    #[test]
    fn from_json_loads_project_table() {
        let json = r##"{
            "entries": [
                {"code": "1.3", "elementType": "fundacao", "color": "#45b7d1",
                 "searchPatterns": ["1.3_.028", "1.3_.029", "1.3_.030"]}
            ],
            "defaultColor": "#ff6b35",
            "highlightOpacity": 0.8,
            "emissiveIntensity": 0.3
        }"##;
        let table = PatternTable::from_json(json).unwrap();
        assert_eq!(table.generate("1.3"), ["1.3_.028", "1.3_.029", "1.3_.030"]);
        assert_eq!(table.generate("1.4")[0], "1.4");
    }
}
