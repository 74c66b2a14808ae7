// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic summary of how well an index covers a budget.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::index::CorrespondenceIndex;
use crate::normalize::{normalize_code, normalize_element_name};
use crate::suggest::{suggest_links, LinkSuggestion};
use crate::types::{flatten_elements, BudgetItem, SceneElement};

/// Element names listed per item in a report.
pub const SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCoverage {
    pub code: String,
    pub description: String,
    pub count: usize,
    /// First few matched element names.
    pub sample: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingReport {
    pub generated_at: String,
    pub total_items: usize,
    pub total_elements: usize,
    pub with_matches: Vec<ItemCoverage>,
    pub without_matches: Vec<ItemCoverage>,
    /// Scene names no budget code claimed, in scene order.
    pub unclaimed_elements: Vec<String>,
    /// Unclaimed elements that have keyword suggestions among the items
    /// without matches.
    pub suggestions: Vec<LinkSuggestion>,
    /// Rounded percentage of items with at least one match.
    pub success_rate: u32,
}

impl LinkingReport {
    pub fn build(
        items: &[BudgetItem],
        elements: &[SceneElement],
        index: &CorrespondenceIndex,
    ) -> Self {
        let mut seen_codes = FxHashSet::default();
        let mut with_matches = Vec::new();
        let mut without_matches = Vec::new();
        let mut unmatched_items = Vec::new();

        for item in items {
            let code = normalize_code(&item.code);
            if code.is_empty() || !seen_codes.insert(code.clone()) {
                continue;
            }
            let names = index.get(&code).unwrap_or_default();
            let coverage = ItemCoverage {
                code,
                description: item.description.clone(),
                count: names.len(),
                sample: names.iter().take(SAMPLE_SIZE).cloned().collect(),
            };
            if coverage.count > 0 {
                with_matches.push(coverage);
            } else {
                without_matches.push(coverage);
                unmatched_items.push(item.clone());
            }
        }

        let claimed = index.matched_names();
        let mut seen_names = FxHashSet::default();
        let flat = flatten_elements(elements);
        let total_elements = flat.len();
        let unclaimed_elements: Vec<String> = flat
            .into_iter()
            .map(|e| normalize_element_name(&e.name))
            .filter(|name| !name.is_empty() && !claimed.contains(name.as_str()))
            .filter(|name| seen_names.insert(name.clone()))
            .collect();

        let suggestions = suggest_links(&unclaimed_elements, &unmatched_items)
            .into_iter()
            .filter(|s| !s.budget_codes.is_empty())
            .collect();

        let total_items = with_matches.len() + without_matches.len();
        let success_rate = if total_items == 0 {
            0
        } else {
            (with_matches.len() as f64 * 100.0 / total_items as f64).round() as u32
        };

        tracing::debug!(
            with_matches = with_matches.len(),
            without_matches = without_matches.len(),
            unclaimed = unclaimed_elements.len(),
            success_rate,
            "Built linking report"
        );

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_items,
            total_elements,
            with_matches,
            without_matches,
            unclaimed_elements,
            suggestions,
            success_rate,
        }
    }
}
