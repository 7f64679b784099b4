//! Synthetic scrollbar geometry.
//!
//! A bar is shown on an axis when fewer cells are visible than the grid
//! holds. The thumb length is proportional to the visible share with a
//! minimum size; its offset is proportional to the first visible index.

use serde::Serialize;

use crate::layout::{GridViewport, Rect, VisibleLayout};

/// Bar thickness in CSS pixels.
pub const SCROLLBAR_THICKNESS: f64 = 8.0;

/// Minimum thumb length in CSS pixels.
pub const MIN_SCROLL_TRACK: f64 = 48.0;

/// Geometry of one bar: the full-length track and the thumb on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollbarGeometry {
    pub track: Rect,
    pub thumb: Rect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Scrollbars {
    pub vertical: Option<ScrollbarGeometry>,
    pub horizontal: Option<ScrollbarGeometry>,
}

/// Thumb length and offset along a bar of `length` device pixels.
///
/// The offset ratio is `first / (total + visible)` clamped to `[0, 100]`.
pub fn thumb_extent(length: f64, visible: u32, total: u32, first: u32, scale: f64) -> (f64, f64) {
    let total_f = f64::from(total);
    let visible_f = f64::from(visible);
    let mut thumb = if total == 0 {
        length
    } else {
        (length * visible_f / total_f).round()
    };
    let min_thumb = MIN_SCROLL_TRACK * scale;
    if thumb < min_thumb {
        thumb = min_thumb;
    }
    let denominator = total_f + visible_f;
    let ratio = if denominator > 0.0 {
        (f64::from(first) / denominator).clamp(0.0, 100.0)
    } else {
        0.0
    };
    (thumb, (length * ratio).round())
}

/// Compute both bars for a frame.
pub fn compute_scrollbars(vp: &GridViewport, layout: &VisibleLayout) -> Scrollbars {
    let thickness = SCROLLBAR_THICKNESS * vp.scale;

    let vertical = (layout.visible_rows() < vp.total_rows).then(|| {
        let x = vp.width - thickness;
        let (len, offset) = thumb_extent(
            vp.height,
            layout.visible_rows(),
            vp.total_rows,
            layout.first_row().unwrap_or(0),
            vp.scale,
        );
        ScrollbarGeometry {
            track: Rect::new(x, 0.0, thickness, vp.height),
            thumb: Rect::new(x, offset, thickness, len),
        }
    });

    let horizontal = (layout.visible_columns() < vp.total_columns).then(|| {
        let y = vp.height - thickness;
        let bar_width = if vertical.is_some() {
            vp.width - thickness
        } else {
            vp.width
        };
        let (len, offset) = thumb_extent(
            bar_width,
            layout.visible_columns(),
            vp.total_columns,
            layout.first_column().unwrap_or(0),
            vp.scale,
        );
        ScrollbarGeometry {
            track: Rect::new(0.0, y, bar_width, thickness),
            thumb: Rect::new(offset, y, len, thickness),
        }
    });

    Scrollbars {
        vertical,
        horizontal,
    }
}

/// Origin index for a pointer dragged to `coord` along a bar of `length`.
#[allow(clippy::cast_possible_truncation)]
pub fn drag_origin(total: u32, coord: f64, length: f64) -> i64 {
    if length <= 0.0 || !coord.is_finite() {
        return 0;
    }
    (f64::from(total) * coord / length).round() as i64
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
    use test_case::test_case;

    fn frame(width: f64, height: f64, rows: u32, cols: u32) -> (GridViewport, VisibleLayout) {
        let mut vp = GridViewport::default();
        vp.set_extent(rows, cols);
        vp.resize(width, height, 1.0);
        let layout = VisibleLayout::compute(&vp);
        (vp, layout)
    }

    #[test_case(300.0, 10, 1000, 0, 48.0, 0.0 ; "minimum thumb")]
    #[test_case(300.0, 50, 100, 0, 150.0, 0.0 ; "half visible")]
    #[test_case(300.0, 50, 100, 50, 150.0, 100.0 ; "scrolled")]
    #[test_case(300.0, 0, 0, 0, 300.0, 0.0 ; "empty grid")]
    fn thumb_math(length: f64, visible: u32, total: u32, first: u32, thumb: f64, offset: f64) {
        assert_eq!(thumb_extent(length, visible, total, first, 1.0), (thumb, offset));
    }

    #[test]
    fn no_bars_when_everything_fits() {
        let (vp, layout) = frame(500.0, 300.0, 10, 5);
        let bars = compute_scrollbars(&vp, &layout);
        assert_eq!(bars, Scrollbars::default());
    }

    #[test]
    fn narrow_surface_shows_horizontal_bar() {
        let (vp, layout) = frame(250.0, 300.0, 10, 5);
        let bars = compute_scrollbars(&vp, &layout);
        assert!(bars.vertical.is_none());
        let h = bars.horizontal.unwrap();
        assert_eq!(h.track, Rect::new(0.0, 292.0, 250.0, 8.0));
        assert!(h.thumb.width >= MIN_SCROLL_TRACK);
        assert_eq!(h.thumb.width, 150.0);
    }

    #[test]
    fn vertical_bar_shortens_horizontal() {
        let (vp, layout) = frame(250.0, 300.0, 1000, 50);
        let bars = compute_scrollbars(&vp, &layout);
        let v = bars.vertical.unwrap();
        let h = bars.horizontal.unwrap();
        assert_eq!(v.track, Rect::new(242.0, 0.0, 8.0, 300.0));
        assert_eq!(v.thumb.height, MIN_SCROLL_TRACK);
        assert_eq!(h.track.width, 242.0);
    }

    #[test]
    fn thumb_scales_with_device_ratio() {
        let mut vp = GridViewport::default();
        vp.set_extent(1000, 5);
        vp.resize(1000.0, 600.0, 2.0);
        let layout = VisibleLayout::compute(&vp);
        let v = compute_scrollbars(&vp, &layout).vertical.unwrap();
        assert_eq!(v.track.width, 16.0);
        assert_eq!(v.thumb.height, 96.0);
    }

    #[test]
    fn drag_maps_pointer_to_origin() {
        assert_eq!(drag_origin(1000, 150.0, 300.0), 500);
        assert_eq!(drag_origin(10, 299.0, 300.0), 10);
        assert_eq!(drag_origin(10, 0.0, 300.0), 0);
        assert_eq!(drag_origin(10, 5.0, 0.0), 0);
    }
}
