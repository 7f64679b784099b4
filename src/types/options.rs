use serde::{Deserialize, Serialize};

use super::lenient::lenient_u32;
use super::SelectionMode;
use crate::error::Result;

pub const DEFAULT_THEME: &str = "#2196F3";
pub const DEFAULT_FONT: &str = "Arial";
pub const DEFAULT_TAG: &str = "worksheet tag";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Construction options for a grid.
///
/// Every key is optional. Unknown keys are ignored and malformed minimums
/// decode to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    /// Accent color (`#RRGGBB`) for selection and scrollbar thumbs.
    pub theme: String,
    pub gridlines: bool,
    pub row_headers: bool,
    pub col_headers: bool,
    pub sel_mode: SelectionMode,
    /// Font family for headers and cell text.
    pub def_font: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub min_row: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub min_col: u32,
    /// Passed through to the content provider with every lookup.
    pub tag: String,
    /// Reserved; accepted and carried but not acted on.
    pub can_resize: bool,
    /// ISO 4217 code used for currency-formatted cells.
    pub currency_code: String,
    /// Switch the default text color to white.
    pub dark_mode: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            gridlines: true,
            row_headers: true,
            col_headers: true,
            sel_mode: SelectionMode::Default,
            def_font: DEFAULT_FONT.to_string(),
            min_row: 0,
            min_col: 0,
            tag: DEFAULT_TAG.to_string(),
            can_resize: true,
            currency_code: DEFAULT_CURRENCY.to_string(),
            dark_mode: false,
        }
    }
}

impl GridOptions {
    /// Decode options from a JSON object string.
    ///
    /// # Errors
    /// Returns [`crate::SheetgridError::Options`] when the input is not JSON
    /// or a typed field has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options.sanitized())
    }

    /// Replace blank strings with their defaults.
    pub fn sanitized(mut self) -> Self {
        if self.theme.trim().is_empty() {
            self.theme = DEFAULT_THEME.to_string();
        }
        if self.def_font.trim().is_empty() {
            self.def_font = DEFAULT_FONT.to_string();
        }
        if self.tag.is_empty() {
            self.tag = DEFAULT_TAG.to_string();
        }
        if self.currency_code.trim().is_empty() {
            self.currency_code = DEFAULT_CURRENCY.to_string();
        }
        self
    }

    /// Text color used when a cell does not specify one.
    pub fn default_text_color(&self) -> &'static str {
        if self.dark_mode {
            "#ffffff"
        } else {
            "#000000"
        }
    }
}
