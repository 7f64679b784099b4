//! Text fitting and placement inside a cell.

use crate::types::TextAlign;

/// Drop trailing characters one at a time until `measure` reports a width
/// no larger than `max_width`. May return an empty string.
pub fn truncate_to_fit(
    text: &str,
    max_width: f64,
    mut measure: impl FnMut(&str) -> f64,
) -> String {
    let mut fitted = text.to_string();
    while !fitted.is_empty() && measure(&fitted) > max_width {
        fitted.pop();
    }
    fitted
}

/// Anchor x for text with the given alignment in a cell spanning `[x, x + width]`.
pub fn text_x(align: TextAlign, x: f64, width: f64) -> f64 {
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x + (width / 2.0).floor(),
        TextAlign::Right => x + width,
    }
}

/// Canvas font string: `[bold ]{12 * scale}px {family}`.
pub fn cell_font(bold: bool, scale: f64, family: &str) -> String {
    let size = 12.0 * scale;
    if bold {
        format!("bold {size}px {family}")
    } else {
        format!("{size}px {family}")
    }
}
