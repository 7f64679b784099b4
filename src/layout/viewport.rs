//! Viewport state: origin, extent, size overrides and surface dimensions.

use std::collections::HashMap;

use crate::cell_ref::col_label;
use crate::types::GridOptions;

/// Default column width in CSS pixels.
pub const DEFAULT_COL_WIDTH: f64 = 100.0;

/// Default row height in CSS pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 24.0;

/// Height of the column header band in CSS pixels.
pub const COL_HEADER_HEIGHT: f64 = 24.0;

/// Width of the row header band in CSS pixels.
pub const ROW_HEADER_WIDTH: f64 = 36.0;

/// Default number of columns before the host sets an extent.
pub const DEFAULT_TOTAL_COLUMNS: u32 = 24;

/// Default number of rows before the host sets an extent.
pub const DEFAULT_TOTAL_ROWS: u32 = 1000;

/// Everything the layout walk needs to know about one grid.
///
/// Positions produced from a viewport are in device pixels: every CSS size
/// is multiplied by `scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridViewport {
    /// First row drawn (clamped to `[min_row, total_rows]`).
    pub origin_row: u32,
    /// First column drawn (clamped to `[min_col, total_columns]`).
    pub origin_col: u32,
    pub total_rows: u32,
    pub total_columns: u32,
    pub min_row: u32,
    pub min_col: u32,
    /// Column width overrides keyed by label, CSS pixels.
    pub col_sizes: HashMap<String, u32>,
    /// Row height overrides keyed by row index, CSS pixels.
    pub row_sizes: HashMap<u32, u32>,
    /// Device pixel ratio.
    pub scale: f64,
    /// Surface width in device pixels.
    pub width: f64,
    /// Surface height in device pixels.
    pub height: f64,
    pub row_headers: bool,
    pub col_headers: bool,
}

impl Default for GridViewport {
    fn default() -> Self {
        Self::new(&GridOptions::default())
    }
}

impl GridViewport {
    pub fn new(options: &GridOptions) -> Self {
        Self {
            origin_row: options.min_row,
            origin_col: options.min_col,
            total_rows: DEFAULT_TOTAL_ROWS,
            total_columns: DEFAULT_TOTAL_COLUMNS,
            min_row: options.min_row,
            min_col: options.min_col,
            col_sizes: HashMap::new(),
            row_sizes: HashMap::new(),
            scale: 1.0,
            width: 1.0,
            height: 1.0,
            row_headers: options.row_headers,
            col_headers: options.col_headers,
        }
    }

    /// Set the logical extent and re-clamp the origin.
    pub fn set_extent(&mut self, rows: u32, columns: u32) {
        self.total_rows = rows;
        self.total_columns = columns;
        self.clamp_origin();
    }

    /// Resize the surface (device pixels) and record the new device pixel ratio.
    pub fn resize(&mut self, width: f64, height: f64, scale: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
    }

    pub fn set_min_row(&mut self, min: u32) {
        self.min_row = min;
        if self.origin_row < min {
            self.origin_row = min;
        }
    }

    pub fn set_min_col(&mut self, min: u32) {
        self.min_col = min;
        if self.origin_col < min {
            self.origin_col = min;
        }
    }

    /// Move the row origin, clamping into `[min_row, total_rows]`.
    pub fn set_origin_row(&mut self, row: i64) {
        self.origin_row = clamp_index(row, self.min_row, self.total_rows);
    }

    /// Move the column origin, clamping into `[min_col, total_columns]`.
    pub fn set_origin_col(&mut self, col: i64) {
        self.origin_col = clamp_index(col, self.min_col, self.total_columns);
    }

    /// Shift the origin by whole rows/columns.
    pub fn scroll_by(&mut self, cols: i64, rows: i64) {
        self.set_origin_col(i64::from(self.origin_col) + cols);
        self.set_origin_row(i64::from(self.origin_row) + rows);
    }

    /// Pull the origin back inside its bounds after an extent or minimum change.
    pub fn clamp_origin(&mut self) {
        self.set_origin_row(i64::from(self.origin_row));
        self.set_origin_col(i64::from(self.origin_col));
    }

    /// Width of a column in device pixels.
    pub fn col_width(&self, col: u32) -> f64 {
        self.col_sizes
            .get(&col_label(col))
            .map_or(DEFAULT_COL_WIDTH, |&w| f64::from(w))
            * self.scale
    }

    /// Height of a row in device pixels.
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_sizes
            .get(&row)
            .map_or(DEFAULT_ROW_HEIGHT, |&h| f64::from(h))
            * self.scale
    }

    /// X where the first visible column starts (right of the row header band).
    pub fn content_left(&self) -> f64 {
        if self.row_headers {
            (ROW_HEADER_WIDTH + 1.0) * self.scale
        } else {
            0.0
        }
    }

    /// Y where the first visible row starts (below the column header band).
    pub fn content_top(&self) -> f64 {
        if self.col_headers {
            (COL_HEADER_HEIGHT + 1.0) * self.scale
        } else {
            0.0
        }
    }
}

fn clamp_index(value: i64, min: u32, max: u32) -> u32 {
    let clamped = value.min(i64::from(max)).max(i64::from(min));
    u32::try_from(clamped).unwrap_or(min)
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
    fn origin_starts_at_minimums() {
        let options = GridOptions {
            min_row: 3,
            min_col: 2,
            ..GridOptions::default()
        };
        let vp = GridViewport::new(&options);
        assert_eq!((vp.origin_row, vp.origin_col), (3, 2));
    }

    #[test]
    fn origin_is_clamped() {
        let mut vp = GridViewport::default();
        vp.set_extent(10, 5);
        vp.set_origin_row(-4);
        assert_eq!(vp.origin_row, 0);
        vp.set_origin_row(50);
        assert_eq!(vp.origin_row, 10);
        vp.set_origin_col(7);
        assert_eq!(vp.origin_col, 5);

        vp.set_extent(4, 2);
        assert_eq!((vp.origin_row, vp.origin_col), (4, 2));
    }

    #[test]
    fn raising_minimum_drags_origin() {
        let mut vp = GridViewport::default();
        vp.set_min_row(6);
        assert_eq!(vp.origin_row, 6);
        vp.set_min_row(2);
        assert_eq!(vp.origin_row, 6);
        vp.set_origin_row(0);
        assert_eq!(vp.origin_row, 2);
    }

    #[test]
    fn sizes_scale_with_device_ratio() {
        let mut vp = GridViewport::default();
        vp.resize(800.0, 600.0, 2.0);
        vp.col_sizes.insert("B".to_string(), 40);
        vp.row_sizes.insert(3, 30);
        assert_eq!(vp.col_width(0), 200.0);
        assert_eq!(vp.col_width(1), 80.0);
        assert_eq!(vp.row_height(0), 48.0);
        assert_eq!(vp.row_height(3), 60.0);
        assert_eq!(vp.content_left(), 74.0);
        assert_eq!(vp.content_top(), 50.0);
    }

    #[test]
    fn hidden_headers_start_content_at_zero() {
        let mut vp = GridViewport::default();
        vp.row_headers = false;
        vp.col_headers = false;
        assert_eq!(vp.content_left(), 0.0);
        assert_eq!(vp.content_top(), 0.0);
    }
}
