//! Number formatting for cell text.
//!
//! Only the currency format changes how a value reads; every other format
//! shows the value as supplied. In the browser the currency text comes from
//! `Intl.NumberFormat` so it follows the user's locale. Everywhere else a
//! small built-in table produces en-US style output.

use crate::types::{CellContent, CellFormat, CellValue};

/// Symbol and minor-unit digits for the currencies the built-in formatter knows.
fn currency_info(code: &str) -> Option<(&'static str, usize)> {
    let info = match code {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        "CNY" => ("CN¥", 2),
        "INR" => ("₹", 2),
        "KRW" => ("₩", 0),
        "CAD" => ("CA$", 2),
        "AUD" => ("A$", 2),
        "MXN" => ("MX$", 2),
        "BRL" => ("R$", 2),
        _ => return None,
    };
    Some(info)
}

/// Format a value as currency without any platform support.
///
/// Unknown codes are written as a prefix (`CHF 1,234.50`).
pub fn format_currency(value: f64, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let (prefix, decimals) = match currency_info(&code) {
        Some((symbol, decimals)) => (symbol.to_string(), decimals),
        None => (format!("{code}\u{a0}"), 2),
    };
    let body = format_with_thousands(value.abs(), decimals);
    if value < 0.0 && body.chars().any(|c| matches!(c, '1'..='9')) {
        format!("-{prefix}{body}")
    } else {
        format!("{prefix}{body}")
    }
}

fn format_with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.prec$}", value, prec = decimals.min(10));
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((int_part, dec)) => (int_part, Some(dec)),
        None => (formatted.as_str(), None),
    };

    let mut with_sep = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_sep.push(',');
        }
        with_sep.push(c);
    }
    let int_with_sep: String = with_sep.chars().rev().collect();

    match dec_part {
        Some(dec) => format!("{int_with_sep}.{dec}"),
        None => int_with_sep,
    }
}

#[cfg(target_arch = "wasm32")]
fn platform_currency(value: f64, code: &str) -> Option<String> {
    use wasm_bindgen::JsValue;

    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"style".into(), &"currency".into()).ok()?;
    js_sys::Reflect::set(&options, &"currency".into(), &JsValue::from_str(code)).ok()?;
    let formatter = js_sys::Intl::NumberFormat::new(&js_sys::Array::new(), &options);
    formatter
        .format()
        .call1(&JsValue::NULL, &JsValue::from_f64(value))
        .ok()?
        .as_string()
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_currency(_value: f64, _code: &str) -> Option<String> {
    None
}

/// Text to draw for a cell, or `None` when the cell has no content.
///
/// Currency cells whose value is not numeric show the raw text.
pub fn cell_text(cell: &CellValue, currency_code: &str) -> Option<String> {
    let content = cell.value.as_ref()?;
    if let CellContent::Text(s) = content {
        if s.is_empty() {
            return None;
        }
    }
    if cell.format == CellFormat::Currency {
        if let Some(n) = content.as_f64() {
            return Some(
                platform_currency(n, currency_code)
                    .unwrap_or_else(|| format_currency(n, currency_code)),
            );
        }
    }
    Some(content.display_text())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1234.5, "USD", "$1,234.50")]
    #[test_case(0.0, "USD", "$0.00")]
    #[test_case(-1234.5, "USD", "-$1,234.50")]
    #[test_case(1_000_000.0, "EUR", "€1,000,000.00")]
    #[test_case(1234.4, "JPY", "¥1,234")]
    #[test_case(12.0, "gbp", "£12.00")]
    #[test_case(5.0, "CHF", "CHF\u{a0}5.00")]
    #[test_case(-0.001, "USD", "$0.00")]
    fn currency(value: f64, code: &str, expected: &str) {
        assert_eq!(format_currency(value, code), expected);
    }

    #[test]
    fn currency_cells_are_formatted() {
        let cell = CellValue::number(1234.5, CellFormat::Currency);
        let text = cell_text(&cell, "USD").unwrap();
        assert_eq!(text, "$1,234.50");
        assert_ne!(text, "1234.5");
    }

    #[test]
    fn numeric_text_in_currency_cells_is_formatted() {
        let mut cell = CellValue::text("99");
        cell.format = CellFormat::Currency;
        assert_eq!(cell_text(&cell, "USD").unwrap(), "$99.00");

        let mut cell = CellValue::text("n/a");
        cell.format = CellFormat::Currency;
        assert_eq!(cell_text(&cell, "USD").unwrap(), "n/a");
    }

    #[test]
    fn other_formats_show_raw_value() {
        assert_eq!(
            cell_text(&CellValue::number(0.25, CellFormat::Percent), "USD").unwrap(),
            "0.25"
        );
        assert_eq!(cell_text(&CellValue::text("hi"), "USD").unwrap(), "hi");
        assert_eq!(cell_text(&CellValue::default(), "USD"), None);
    }
}
