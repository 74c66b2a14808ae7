// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyword suggestions for elements automatic matching left unclaimed.

use serde::Serialize;

use crate::normalize::normalize_code;
use crate::types::BudgetItem;

/// (element keyword, budget keyword) pairs. An element whose name contains
/// the first is suggested for items whose text contains the second.
pub const KEYWORD_RULES: &[(&str, &str)] = &[
    ("pilar", "estrutura"),
    ("viga", "estrutura"),
    ("laje", "estrutura"),
    ("parede", "alvenaria"),
    ("piso", "revestimento"),
    ("janela", "esquadria"),
    ("porta", "esquadria"),
    ("telhado", "cobertura"),
];

/// Candidate budget codes for one scene element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSuggestion {
    pub element: String,
    pub budget_codes: Vec<String>,
}

/// One suggestion per element, in input order. Matching ignores case and
/// looks at an item's description, category and subcategory.
pub fn suggest_links(elements: &[String], items: &[BudgetItem]) -> Vec<LinkSuggestion> {
    let item_texts: Vec<(String, String)> = items
        .iter()
        .map(|item| (normalize_code(&item.code), item_text(item)))
        .filter(|(code, _)| !code.is_empty())
        .collect();

    elements
        .iter()
        .map(|element| {
            let lower = element.to_lowercase();
            let mut budget_codes: Vec<String> = Vec::new();
            for (code, text) in &item_texts {
                let hit = KEYWORD_RULES
                    .iter()
                    .any(|&(el, kw)| lower.contains(el) && text.contains(kw));
                if hit && !budget_codes.contains(code) {
                    budget_codes.push(code.clone());
                }
            }
            LinkSuggestion {
                element: element.clone(),
                budget_codes,
            }
        })
        .collect()
}

fn item_text(item: &BudgetItem) -> String {
    let mut text = format!("{} {}", item.description, item.category);
    if let Some(sub) = &item.subcategory {
        text.push(' ');
        text.push_str(sub);
    }
    text.to_lowercase()
}
