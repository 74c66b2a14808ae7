// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier normalization for budget codes and scene element names.
//!
//! Matching is case-sensitive: names are trimmed and otherwise left as the
//! authoring tool wrote them.

/// Character that separates the code-like prefix of an element name from its
/// disambiguating suffix (`"2.1_.037"`).
pub const SEPARATOR: char = '_';

/// Trims surrounding whitespace from a budget code.
#[inline]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_string()
}

/// Trims surrounding whitespace from a scene element name. Case is preserved.
#[inline]
pub fn normalize_element_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Part of an element name before the first [`SEPARATOR`].
///
/// Returns `None` for names without a separator; such elements never take
/// part in prefix matching.
#[inline]
pub fn element_prefix(name: &str) -> Option<&str> {
    name.find(SEPARATOR).map(|idx| &name[..idx])
}

/// The code with every `.` turned into the separator (`"1.2.3"` -> `"1_2_3"`).
#[inline]
pub fn underscore_variant(code: &str) -> String {
    code.replace('.', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_but_keeps_case() {
        assert_eq!(normalize_code("  2.1 "), "2.1");
        assert_eq!(normalize_element_name("\tViga_Terreo "), "Viga_Terreo");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn prefix_stops_at_first_separator() {
        assert_eq!(element_prefix("2.1_.037"), Some("2.1"));
        assert_eq!(element_prefix("2.1_"), Some("2.1"));
        assert_eq!(element_prefix("1_2_3"), Some("1"));
        assert_eq!(element_prefix("_x"), Some(""));
        assert_eq!(element_prefix("Pilar"), None);
    }

    #[test]
    fn underscore_variant_replaces_every_dot() {
        assert_eq!(underscore_variant("2.1"), "2_1");
        assert_eq!(underscore_variant("1.2.3"), "1_2_3");
        assert_eq!(underscore_variant("7"), "7");
    }
}
