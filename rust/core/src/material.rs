// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Renderer-agnostic material descriptions.
//!
//! The engine never touches renderer objects. It reads and writes
//! [`MaterialSnapshot`] values through a [`crate::SceneHandle`], which keeps
//! the saved originals comparable by value.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// 24-bit RGB color, serialized as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);

    /// Parses `#rrggbb` or `rrggbb` (case-insensitive).
    pub fn from_hex(s: &str) -> Option<Color> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xFF_FFFF)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| de::Error::custom(format!("invalid color: {s}")))
    }
}

/// Value copy of the visual state of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSnapshot {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialSnapshot {
    /// Plain concrete grey, used when an element has no saved original.
    pub fn neutral() -> Self {
        Self {
            color: Color(0x8B8B8B),
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
            transparent: false,
            roughness: 0.8,
            metalness: 0.1,
        }
    }
}

impl Default for MaterialSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Look of highlighted elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    pub color: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
}

impl HighlightStyle {
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Material assigned to highlighted elements: the color with a matching
    /// emissive tint.
    pub fn to_material(&self) -> MaterialSnapshot {
        MaterialSnapshot {
            color: self.color,
            emissive: self.color,
            emissive_intensity: self.emissive_intensity,
            opacity: self.opacity,
            transparent: self.opacity < 1.0,
            roughness: 0.5,
            metalness: 0.0,
        }
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color(0xFF6B35),
            emissive_intensity: 0.3,
            opacity: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_parsing() {
        assert_eq!(Color::from_hex("#ff6b35"), Some(Color(0xFF6B35)));
        assert_eq!(Color::from_hex("8B8B8B"), Some(Color(0x8B8B8B)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gggggg"), None);
        assert_eq!(Color(0x00AB00).to_string(), "#00ab00");
    }

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color(0x45B7D1)).unwrap();
        assert_eq!(json, "\"#45b7d1\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color(0x45B7D1));
    }

    #[test]
    fn highlight_material_is_emissive_and_translucent() {
        let material = HighlightStyle::default().to_material();
        assert_eq!(material.emissive, material.color);
        assert!(material.transparent);
        assert_ne!(material, MaterialSnapshot::neutral());
    }
}
