//! The visible-region walk.
//!
//! Columns and rows are walked from the origin, accumulating device-pixel
//! sizes, until the next gridline lands more than one cell past the surface
//! edge. The same walk feeds rendering, hit-testing and cell rectangles so
//! the three can never disagree.

use serde::Serialize;

use super::GridViewport;
use crate::cell_ref::{col_label, NO_COLUMN, NO_ROW};

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink by `d` on every side.
    pub fn inset(&self, d: f64) -> Self {
        Self::new(
            self.x + d,
            self.y + d,
            self.width - 2.0 * d,
            self.height - 2.0 * d,
        )
    }
}

/// One visible column or row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    /// Column or row index.
    pub index: u32,
    /// Leading edge (x for columns, y for rows).
    pub start: f64,
    /// Width or height.
    pub size: f64,
    /// Crisp trailing gridline: `floor(start + size) + 0.5`.
    pub line: f64,
}

impl Span {
    /// Open-interval containment: a point on either gridline matches nothing.
    ///
    /// At fractional scales `line` can fall short of `start + size`, leaving
    /// a sliver between the gridline and the next span's start that belongs
    /// to no cell.
    pub fn contains(&self, p: f64) -> bool {
        p > self.start && p < self.line
    }
}

/// Result of one walk over a viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisibleLayout {
    pub columns: Vec<Span>,
    pub rows: Vec<Span>,
}

/// Pixel point resolved to a logical cell; each axis resolves independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellHit {
    pub col: Option<u32>,
    pub row: Option<u32>,
}

impl CellHit {
    /// Both axes landed inside a visible cell.
    pub fn is_cell(&self) -> bool {
        self.col.is_some() && self.row.is_some()
    }

    /// Column label, or the no-column sentinel.
    pub fn col_label(&self) -> String {
        self.col.map_or_else(|| NO_COLUMN.to_string(), col_label)
    }

    /// Row index, or the no-row sentinel.
    pub fn row_value(&self) -> i64 {
        self.row.map_or(i64::from(NO_ROW), i64::from)
    }
}

/// Walk one axis from `first` through `last` (inclusive) starting at `origin`.
///
/// The walk stops at the first span whose trailing gridline lies more than
/// its own size past `limit`, which keeps one partially visible span of
/// overscan.
pub fn walk_axis(
    first: u32,
    last: u32,
    origin: f64,
    limit: f64,
    size_of: impl Fn(u32) -> f64,
) -> Vec<Span> {
    let mut spans = Vec::new();
    if first > last {
        return spans;
    }
    let mut cursor = origin;
    for index in first..=last {
        let size = size_of(index);
        let line = (cursor + size).floor() + 0.5;
        if line > limit + size {
            break;
        }
        spans.push(Span {
            index,
            start: cursor,
            size,
            line,
        });
        cursor += size;
    }
    spans
}

impl VisibleLayout {
    /// Walk the viewport once.
    pub fn compute(vp: &GridViewport) -> Self {
        let columns = walk_axis(
            vp.origin_col,
            vp.total_columns,
            vp.content_left(),
            vp.width,
            |c| vp.col_width(c),
        );
        let rows = walk_axis(
            vp.origin_row,
            vp.total_rows,
            vp.content_top(),
            vp.height,
            |r| vp.row_height(r),
        );
        Self { columns, rows }
    }

    pub fn visible_columns(&self) -> u32 {
        u32::try_from(self.columns.len()).unwrap_or(u32::MAX)
    }

    pub fn visible_rows(&self) -> u32 {
        u32::try_from(self.rows.len()).unwrap_or(u32::MAX)
    }

    pub fn first_column(&self) -> Option<u32> {
        self.columns.first().map(|s| s.index)
    }

    pub fn first_row(&self) -> Option<u32> {
        self.rows.first().map(|s| s.index)
    }

    pub fn column(&self, index: u32) -> Option<&Span> {
        self.columns.iter().find(|s| s.index == index)
    }

    pub fn row(&self, index: u32) -> Option<&Span> {
        self.rows.iter().find(|s| s.index == index)
    }

    /// Resolve a device-pixel point.
    ///
    /// Neighboring spans overlap by the half pixel between a span's start and
    /// its gridline; the later span wins there.
    pub fn hit_test(&self, x: f64, y: f64) -> CellHit {
        CellHit {
            col: self.columns.iter().rfind(|s| s.contains(x)).map(|s| s.index),
            row: self.rows.iter().rfind(|s| s.contains(y)).map(|s| s.index),
        }
    }

    /// Rectangle of a cell. An axis that is not visible contributes a zero
    /// offset and extent, so a fully off-screen cell yields [`Rect::ZERO`].
    pub fn cell_rect(&self, col: Option<u32>, row: u32) -> Rect {
        let (x, width) = col
            .and_then(|c| self.column(c))
            .map_or((0.0, 0.0), |s| (s.start, s.size));
        let (y, height) = self.row(row).map_or((0.0, 0.0), |s| (s.start, s.size));
        Rect::new(x, y, width, height)
    }
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

    fn viewport(width: f64, height: f64, rows: u32, cols: u32) -> GridViewport {
        let mut vp = GridViewport::default();
        vp.set_extent(rows, cols);
        vp.resize(width, height, 1.0);
        vp
    }

    #[test]
    fn walk_stops_one_span_past_the_edge() {
        let spans = walk_axis(0, 100, 0.0, 250.0, |_| 100.0);
        // 100.5, 200.5, 300.5 fit under 350; 400.5 does not.
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[2].start, 200.0);
        assert_eq!(spans[2].line, 300.5);
    }

    #[test]
    fn walk_is_inclusive_of_last() {
        let spans = walk_axis(2, 4, 0.0, 10_000.0, |_| 10.0);
        let indices: Vec<u32> = spans.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![2, 3, 4]);
    }

    #[test]
    fn fractional_sizes_leave_a_sliver_past_the_gridline() {
        let spans = walk_axis(0, 1, 0.0, 100.0, |_| 10.75);
        assert_eq!(spans[0].line, 10.5);
        assert_eq!(spans[1].start, 10.75);
        assert!(spans[0].contains(10.4));
        assert!(!spans.iter().any(|s| s.contains(10.6)));
        assert!(spans[1].contains(10.8));
    }

    #[test]
    fn empty_walk_when_origin_past_last() {
        assert!(walk_axis(5, 4, 0.0, 100.0, |_| 10.0).is_empty());
    }

    #[test]
    fn headers_offset_the_first_cell() {
        let vp = viewport(500.0, 300.0, 10, 5);
        let layout = VisibleLayout::compute(&vp);
        assert_eq!(layout.columns[0].start, 37.0);
        assert_eq!(layout.rows[0].start, 25.0);
        assert_eq!(layout.visible_columns(), 5);
        assert_eq!(layout.first_column(), Some(0));
        assert_eq!(layout.first_row(), Some(0));
    }

    #[test]
    fn row_overrides_drive_every_row() {
        let mut vp = viewport(500.0, 300.0, 10, 5);
        vp.row_sizes.insert(1, 50);
        let layout = VisibleLayout::compute(&vp);
        assert_eq!(layout.rows[1].size, 50.0);
        assert_eq!(layout.rows[2].start, 25.0 + 24.0 + 50.0);
    }

    #[test]
    fn hit_test_uses_open_intervals() {
        let vp = viewport(500.0, 300.0, 10, 5);
        let layout = VisibleLayout::compute(&vp);

        let hit = layout.hit_test(150.0, 60.0);
        assert_eq!(hit.col, Some(1));
        assert_eq!(hit.row, Some(1));
        assert!(hit.is_cell());
        assert_eq!(hit.col_label(), "B");

        // Exactly on the leading edge of column A.
        let edge = layout.hit_test(37.0, 60.0);
        assert_eq!(edge.col, None);
        assert_eq!(edge.col_label(), "-A");

        // Between B's start (137) and A's gridline (137.5) B wins.
        assert_eq!(layout.hit_test(137.2, 60.0).col, Some(1));
        assert_eq!(layout.hit_test(137.0, 60.0).col, Some(0));

        // Inside the header band.
        let header = layout.hit_test(150.0, 10.0);
        assert_eq!(header.row, None);
        assert_eq!(header.row_value(), -1);
        assert_eq!(header.col, Some(1));
    }

    #[test]
    fn cell_rect_matches_spans() {
        let vp = viewport(500.0, 300.0, 10, 5);
        let layout = VisibleLayout::compute(&vp);
        assert_eq!(
            layout.cell_rect(Some(2), 3),
            Rect::new(237.0, 25.0 + 72.0, 100.0, 24.0)
        );
        assert_eq!(layout.cell_rect(Some(40), 90), Rect::ZERO);
        assert_eq!(layout.cell_rect(None, 0), Rect::new(0.0, 25.0, 0.0, 24.0));
    }

    #[test]
    fn origin_skips_leading_cells() {
        let mut vp = viewport(500.0, 300.0, 100, 50);
        vp.set_origin_col(10);
        vp.set_origin_row(20);
        let layout = VisibleLayout::compute(&vp);
        assert_eq!(layout.first_column(), Some(10));
        assert_eq!(layout.first_row(), Some(20));
        assert_eq!(layout.cell_rect(Some(9), 20).width, 0.0);
    }
}
