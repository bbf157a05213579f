use serde::{Deserialize, Serialize};
use std::fmt;

/// Color returned for names that no registry entry matches.
pub const DEFAULT_COLOR: &str = "#000000";

/// A CSS-style color value attached to a character or place.
///
/// Stored verbatim; no validation is applied on input. Rendering code is
/// expected to cope with whatever the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Creates a color from any string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw color text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives a translucent variant of this color.
    ///
    /// `#rrggbb` becomes `rgba(r, g, b, alpha)`, `rgba(...)` gets its alpha
    /// replaced, and `rgb(...)` is promoted to `rgba(...)`. Any other value
    /// is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::Color;
    ///
    /// assert_eq!(Color::new("#ff8000").with_alpha(0.3), "rgba(255, 128, 0, 0.3)");
    /// assert_eq!(Color::new("rgb(1, 2, 3)").with_alpha(0.1), "rgba(1, 2, 3, 0.1)");
    /// assert_eq!(Color::new("red").with_alpha(0.5), "red");
    /// ```
    pub fn with_alpha(&self, alpha: f64) -> String {
        let value = self.0.as_str();

        if let Some(hex) = value.strip_prefix('#') {
            return match parse_hex_triplet(hex) {
                Some((r, g, b)) => format!("rgba({r}, {g}, {b}, {alpha})"),
                None => value.to_string(),
            };
        }

        let channels = if value.starts_with("rgba") {
            parse_functional(value, "rgba", 4)
        } else if value.starts_with("rgb") {
            parse_functional(value, "rgb", 3)
        } else {
            None
        };

        match channels {
            Some([r, g, b]) => format!("rgba({r}, {g}, {b}, {alpha})"),
            None => value.to_string(),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn parse_hex_triplet(hex: &str) -> Option<(u8, u8, u8)> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parses `name(a, b, c[, alpha])`, returning the three integer channels.
fn parse_functional(value: &str, name: &str, arity: usize) -> Option<[u32; 3]> {
    let inner = value
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != arity {
        return None;
    }

    let mut channels = [0u32; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }
    if arity == 4 {
        parts[3].parse::<f64>().ok()?;
    }
    Some(channels)
}
