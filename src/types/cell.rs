use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::lenient::{lenient_bool, lenient_span, lenient_string, value_to_i64};

/// Number format of a cell as reported by the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellFormat {
    #[default]
    Default,
    Text,
    Number,
    Currency,
    Percent,
    Date,
    Time,
    DateTime,
}

impl CellFormat {
    /// Map a wire code (0..=7) to a format; unknown codes fall back to `Default`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Text,
            2 => Self::Number,
            3 => Self::Currency,
            4 => Self::Percent,
            5 => Self::Date,
            6 => Self::Time,
            7 => Self::DateTime,
            _ => Self::Default,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Text => 1,
            Self::Number => 2,
            Self::Currency => 3,
            Self::Percent => 4,
            Self::Date => 5,
            Self::Time => 6,
            Self::DateTime => 7,
        }
    }

    /// Numeric formats read right-aligned unless the cell says otherwise.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Currency | Self::Percent)
    }
}

/// Horizontal alignment requested by the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAlignment {
    /// Use the format's natural alignment.
    #[default]
    Default,
    Left,
    Center,
    Right,
    Justify,
}

impl CellAlignment {
    /// Map a wire code (1..=5) to an alignment; anything else is `Default`.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Left,
            3 => Self::Center,
            4 => Self::Right,
            5 => Self::Justify,
            _ => Self::Default,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Default => 1,
            Self::Left => 2,
            Self::Center => 3,
            Self::Right => 4,
            Self::Justify => 5,
        }
    }
}

/// Alignment actually used when placing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Canvas `textAlign` keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

macro_rules! code_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = serde_json::Value::deserialize(deserializer)?;
                Ok(value_to_i64(&value).map_or_else(Self::default, Self::from_code))
            }
        }
    };
}

code_serde!(CellFormat);
code_serde!(CellAlignment);

/// Displayable content of a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellContent {
    Text(String),
    Number(f64),
}

impl CellContent {
    /// Numeric view of the content; text is parsed when it looks like a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Text as it would appear without any number formatting.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_plain_number(*n),
        }
    }
}

/// Integers print without a fractional part (`12`, not `12.0`).
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn lenient_content<'de, D>(deserializer: D) -> Result<Option<CellContent>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(CellContent::Text(s)),
        serde_json::Value::Number(n) => n.as_f64().map(CellContent::Number),
        serde_json::Value::Bool(true) => Some(CellContent::Text("true".to_string())),
        _ => None,
    })
}

/// One cell as supplied by the content provider for a single frame.
///
/// Field names follow the compact wire keys (`v`, `f`, `a`, ...) and also
/// accept their long spellings. Every field is optional and decodes
/// leniently: malformed values fall back to the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellValue {
    #[serde(
        rename = "v",
        alias = "value",
        deserialize_with = "lenient_content",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<CellContent>,
    #[serde(rename = "f", alias = "format")]
    pub format: CellFormat,
    #[serde(rename = "a", alias = "alignment")]
    pub alignment: CellAlignment,
    #[serde(rename = "b", alias = "bold", deserialize_with = "lenient_bool")]
    pub bold: bool,
    #[serde(
        rename = "c",
        alias = "textColor",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_color: Option<String>,
    #[serde(
        rename = "bg",
        alias = "backgroundColor",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
    #[serde(
        rename = "img",
        alias = "imageURL",
        alias = "imageUrl",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(rename = "cw", alias = "colSpan", deserialize_with = "lenient_span")]
    pub col_span: u32,
    #[serde(rename = "rh", alias = "rowSpan", deserialize_with = "lenient_span")]
    pub row_span: u32,
}

impl Default for CellValue {
    fn default() -> Self {
        Self {
            value: None,
            format: CellFormat::Default,
            alignment: CellAlignment::Default,
            bold: false,
            text_color: None,
            background_color: None,
            image_url: None,
            col_span: 1,
            row_span: 1,
        }
    }
}

impl CellValue {
    /// A plain text cell.
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            value: Some(CellContent::Text(s.into())),
            ..Self::default()
        }
    }

    /// A numeric cell with the given format.
    pub fn number(n: f64, format: CellFormat) -> Self {
        Self {
            value: Some(CellContent::Number(n)),
            format,
            ..Self::default()
        }
    }

    /// Resolve the alignment used for text placement.
    ///
    /// `Default` takes the format-implied alignment: Number, Currency and
    /// Percent go right, everything else left. `Justify` has no single-line
    /// meaning and renders left.
    pub fn text_align(&self) -> TextAlign {
        match self.alignment {
            CellAlignment::Left | CellAlignment::Justify => TextAlign::Left,
            CellAlignment::Center => TextAlign::Center,
            CellAlignment::Right => TextAlign::Right,
            CellAlignment::Default if self.format.is_numeric() => TextAlign::Right,
            CellAlignment::Default => TextAlign::Left,
        }
    }

    /// True when either span covers more than this cell.
    pub fn is_merged(&self) -> bool {
        self.col_span > 1 || self.row_span > 1
    }
}
