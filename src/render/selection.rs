//! Selection overlay helpers.
//!
//! These helpers keep selection math testable without depending on Canvas APIs.

use crate::cell_ref::col_index;
use crate::layout::{Rect, VisibleLayout};
use crate::types::{CellAddr, Selection, SelectionMode};

/// Where the selection lands on screen this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionGeometry {
    /// Union of the anchor and live endpoint rectangles.
    pub area: Rect,
    /// The anchor cell alone.
    pub anchor: Rect,
}

impl SelectionGeometry {
    /// Closed outline of `area` on crisp half-pixel coordinates.
    pub fn outline(&self) -> [(f64, f64); 5] {
        let sx = self.area.x.floor() + 0.5;
        let sy = self.area.y.floor() + 0.5;
        let ex = self.area.right().floor() + 0.5;
        let ey = self.area.bottom().floor() + 0.5;
        [(sx, sy), (sx, ey), (ex, ey), (ex, sy), (sx, sy)]
    }

    /// Closed outline of the anchor cell.
    pub fn anchor_outline(&self) -> [(f64, f64); 5] {
        let a = self.anchor;
        [
            (a.x, a.y),
            (a.x, a.bottom()),
            (a.right(), a.bottom()),
            (a.right(), a.y),
            (a.x, a.y),
        ]
    }
}

fn addr_rect(layout: &VisibleLayout, addr: &CellAddr) -> Rect {
    layout.cell_rect(col_index(&addr.col), addr.row)
}

/// Resolve the drawable part of a selection.
///
/// In row mode the area always runs to the right edge of the surface.
pub fn selection_geometry(
    selection: &Selection,
    layout: &VisibleLayout,
    mode: SelectionMode,
    surface_width: f64,
) -> Option<SelectionGeometry> {
    let (start, tmp) = selection.drawable()?;
    let a = addr_rect(layout, start);
    let b = addr_rect(layout, tmp);

    let (start_x, mut end_x) = if a.x > b.x {
        (b.x, a.right())
    } else {
        (a.x, b.right())
    };
    let (start_y, end_y) = if a.y > b.y {
        (b.y, a.bottom())
    } else {
        (a.y, b.bottom())
    };
    if mode == SelectionMode::Row {
        end_x = surface_width;
    }

    Some(SelectionGeometry {
        area: Rect::new(start_x, start_y, end_x - start_x, end_y - start_y),
        anchor: a,
    })
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
    use crate::layout::GridViewport;

    fn layout() -> VisibleLayout {
        let mut vp = GridViewport::default();
        vp.set_extent(10, 5);
        vp.resize(500.0, 300.0, 1.0);
        VisibleLayout::compute(&vp)
    }

    #[test]
    fn area_spans_both_endpoints_in_any_order() {
        let layout = layout();
        let sel = Selection {
            start: Some(CellAddr::new("C", 4)),
            end: None,
            tmp: Some(CellAddr::new("A", 1)),
        };
        let geo = selection_geometry(&sel, &layout, SelectionMode::Default, 500.0).unwrap();
        assert_eq!(geo.area, Rect::new(37.0, 49.0, 300.0, 96.0));
        assert_eq!(geo.anchor, Rect::new(237.0, 121.0, 100.0, 24.0));
    }

    #[test]
    fn row_mode_runs_to_surface_edge() {
        let layout = layout();
        let sel = Selection::range(CellAddr::new("A", 2), CellAddr::new("E", 2));
        let geo = selection_geometry(&sel, &layout, SelectionMode::Row, 500.0).unwrap();
        assert_eq!(geo.area.x, 37.0);
        assert_eq!(geo.area.right(), 500.0);
    }

    #[test]
    fn outline_is_crisp() {
        let layout = layout();
        let sel = Selection::range(CellAddr::new("A", 0), CellAddr::new("A", 0));
        let geo = selection_geometry(&sel, &layout, SelectionMode::Default, 500.0).unwrap();
        let outline = geo.outline();
        assert_eq!(outline[0], (37.5, 25.5));
        assert_eq!(outline[2], (137.5, 49.5));
        assert_eq!(outline[4], outline[0]);
    }

    #[test]
    fn nothing_without_both_endpoints() {
        let layout = layout();
        let sel = Selection {
            start: Some(CellAddr::new("A", 0)),
            end: None,
            tmp: None,
        };
        assert!(selection_geometry(&sel, &layout, SelectionMode::Default, 500.0).is_none());
    }
}
