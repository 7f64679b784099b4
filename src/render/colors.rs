//! Color handling for grid rendering.
//!
//! Colors travel as CSS strings, which Canvas 2D accepts directly. The only
//! parsing needed is turning the `#RRGGBB` theme into a translucent `rgba()`
//! fill and deciding whether a provider-supplied color is usable.

/// A CSS color string (e.g., "#FF0000", "rgba(255, 0, 0, 0.5)")
pub type CssColor = String;

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// CSS `rgba()` with the given alpha.
    pub fn to_rgba_css(self, alpha: f64) -> CssColor {
        format!("rgba({},{},{}, {})", self.r, self.g, self.b, alpha)
    }
}

/// Translucent fill derived from the theme color.
///
/// Themes that are not `#RRGGBB` fall back to the default accent.
pub fn theme_fill(theme: &str, alpha: f64) -> CssColor {
    Rgb::from_hex(theme)
        .or_else(|| Rgb::from_hex(palette::DEFAULT_THEME))
        .unwrap_or_default()
        .to_rgba_css(alpha)
}

/// Cell backgrounds must be a 7-character hex or an `rgb…` expression.
pub fn is_usable_background(color: &str) -> bool {
    color.trim().chars().count() == 7 || color.starts_with("rgb")
}

/// Cell text colors must be a 7-character hex.
pub fn is_usable_text_color(color: &str) -> bool {
    color.trim().chars().count() == 7
}

/// Fixed colors used by the grid chrome.
pub mod palette {
    pub const DEFAULT_THEME: &str = "#2196F3";

    /// Header band background.
    pub const HEADER_FILL: &str = "rgba(130,130,130,0.075)";

    /// Header separators and gridlines.
    pub const GRID_LINE: &str = "rgba(130,130,130,0.35)";

    /// Scrollbar track background.
    pub const SCROLLBAR_TRACK: &str = "rgba(130, 130, 130, 0.3)";

    pub const TEXT_LIGHT: &str = "#000000";
    pub const TEXT_DARK: &str = "#ffffff";
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#2196F3"), Some(Rgb::new(0x21, 0x96, 0xF3)));
        assert_eq!(Rgb::from_hex("ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_theme_fill() {
        assert_eq!(theme_fill("#2196F3", 0.05), "rgba(33,150,243, 0.05)");
        assert_eq!(theme_fill("#ff0000", 0.15), "rgba(255,0,0, 0.15)");
        assert_eq!(theme_fill("blue", 0.05), "rgba(33,150,243, 0.05)");
    }

    #[test]
    fn test_usable_colors() {
        assert!(is_usable_background("#ff0000"));
        assert!(is_usable_background(" #ff0000 "));
        assert!(is_usable_background("rgb(1,2,3)"));
        assert!(is_usable_background("rgba(1,2,3,0.5)"));
        assert!(!is_usable_background("red"));

        assert!(is_usable_text_color("#00ff00"));
        assert!(!is_usable_text_color("rgb(1,2,3)"));
        assert!(!is_usable_text_color("#0f0"));
    }
}
