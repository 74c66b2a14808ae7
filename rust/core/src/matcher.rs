// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pluggable code-to-element matching strategies.
//!
//! Each strategy answers one question: does this scene element represent this
//! budget code? A [`MatcherChain`] runs them in a fixed priority order and
//! reports which one accepted the pair. The order only affects diagnostics;
//! an element is linked as soon as any strategy accepts it.

use serde::{Deserialize, Serialize};

use crate::normalize::{element_prefix, underscore_variant};

/// Which rule linked an element to a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Element prefix equals the code.
    Exact,
    /// Element prefix starts with the code.
    Prefix,
    /// Element prefix contains the code.
    Contains,
    /// Element name starts with the dot-substituted code.
    UnderscoreVariant,
}

/// A scene element name prepared for matching.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub prefix: &'a str,
}

impl<'a> Candidate<'a> {
    /// `None` when the name has no separator: such elements never match.
    pub fn new(name: &'a str) -> Option<Self> {
        element_prefix(name).map(|prefix| Self { name, prefix })
    }
}

/// One matching strategy.
pub trait Matcher: Send + Sync {
    fn kind(&self) -> MatchKind;

    /// `code` is already normalized and non-empty.
    fn matches(&self, code: &str, candidate: &Candidate<'_>) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl Matcher for ExactMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Exact
    }

    fn matches(&self, code: &str, candidate: &Candidate<'_>) -> bool {
        candidate.prefix == code
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixMatcher;

impl Matcher for PrefixMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Prefix
    }

    fn matches(&self, code: &str, candidate: &Candidate<'_>) -> bool {
        candidate.prefix.starts_with(code)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContainsMatcher;

impl Matcher for ContainsMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::Contains
    }

    fn matches(&self, code: &str, candidate: &Candidate<'_>) -> bool {
        candidate.prefix.contains(code)
    }
}

/// Matches names spelled with the dot-substituted code (`"2.1"` -> `"2_1"`).
///
/// The prefix cannot hold a separator, so the variant is tested against the
/// whole name, anchored at its start. Searching anywhere in the name would
/// reach into the suffix and claim elements of other codes (`"1.2_1"` for
/// `"2.1"`). Codes without a dot have no distinct variant and are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnderscoreVariantMatcher;

impl Matcher for UnderscoreVariantMatcher {
    fn kind(&self) -> MatchKind {
        MatchKind::UnderscoreVariant
    }

    fn matches(&self, code: &str, candidate: &Candidate<'_>) -> bool {
        let variant = underscore_variant(code);
        if variant == code {
            return false;
        }
        candidate.name.starts_with(&variant)
    }
}

/// Strategies composed in priority order.
pub struct MatcherChain {
    matchers: Vec<Box<dyn Matcher>>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Exact, prefix, contains, underscore variant.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ExactMatcher),
            Box::new(PrefixMatcher),
            Box::new(ContainsMatcher),
            Box::new(UnderscoreVariantMatcher),
        ])
    }

    /// First strategy that accepts the pair, if any. Empty codes never match.
    pub fn first_match(&self, code: &str, candidate: &Candidate<'_>) -> Option<MatchKind> {
        if code.is_empty() {
            return None;
        }
        self.matchers
            .iter()
            .find(|m| m.matches(code, candidate))
            .map(|m| m.kind())
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Default for MatcherChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for MatcherChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.matchers.iter().map(|m| m.kind()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(code: &str, name: &str) -> Option<MatchKind> {
        let candidate = Candidate::new(name)?;
        MatcherChain::standard().first_match(code, &candidate)
    }

    #[test]
    fn priority_order() {
        assert_eq!(kind("2.1", "2.1_.001"), Some(MatchKind::Exact));
        assert_eq!(kind("2.1", "2.15_.001"), Some(MatchKind::Prefix));
        assert_eq!(kind("2.1", "12.1_"), Some(MatchKind::Contains));
        assert_eq!(kind("2.1", "2_1_001"), Some(MatchKind::UnderscoreVariant));
    }

    #[test]
    fn variant_does_not_reach_into_suffix() {
        assert_eq!(kind("2.1", "1.2_1"), None);
        assert_eq!(kind("2.1", "Viga_2_1_001"), None);
        assert_eq!(kind("1.2.3", "1_2_3_001"), Some(MatchKind::UnderscoreVariant));
        assert_eq!(kind("1.2.3", "1_2.3_001"), None);
    }

    #[test]
    fn sibling_codes_do_not_match() {
        assert_eq!(kind("2.1", "2.2_.001"), None);
        assert_eq!(kind("2.1", "2_.001"), None);
    }

    #[test]
    fn names_without_separator_never_match() {
        assert!(Candidate::new("2.1").is_none());
        assert_eq!(kind("2.1", "2.1"), None);
    }

    #[test]
    fn empty_code_never_matches() {
        assert_eq!(kind("", "2.1_.001"), None);
        assert_eq!(kind("", "_"), None);
    }

    #[test]
    fn dotless_code_has_no_variant_rule() {
        // "5" inside the suffix must not count: only the prefix is searched
        assert_eq!(kind("5", "2.1_.005"), None);
        assert_eq!(kind("5", "5_"), Some(MatchKind::Exact));
    }

    #[test]
    fn custom_chain() {
        let chain = MatcherChain::new(vec![Box::new(ExactMatcher)]);
        let candidate = Candidate::new("2.15_").unwrap();
        assert_eq!(chain.first_match("2.1", &candidate), None);
        assert_eq!(chain.len(), 1);
    }
}
