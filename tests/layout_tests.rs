//! Layout engine tests: visible window, hit-testing, cell rectangles,
//! size overrides and device pixel scaling.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::HashMap;

use common::attached_grid;
use sheetgrid::layout::{walk_axis, GridViewport, VisibleLayout};
use sheetgrid::render::compute_scrollbars;
use sheetgrid::{GridOptions, Rect};

fn small_grid(width: f64) -> sheetgrid::Grid<common::RecordingSurface> {
    let (mut grid, _host) = attached_grid(GridOptions::default(), width, 300.0, 1.0);
    grid.set_size(10, 5);
    grid
}

#[test]
fn five_columns_fit_in_500px() {
    let grid = small_grid(500.0);
    let layout = grid.layout();
    assert_eq!(layout.visible_columns(), 5);
    let bars = compute_scrollbars(grid.viewport(), &layout);
    assert!(bars.horizontal.is_none());
    assert!(bars.vertical.is_none());
}

#[test]
fn narrow_surface_shows_column_scrollbar() {
    let grid = small_grid(250.0);
    let layout = grid.layout();
    let visible = layout.visible_columns();
    assert!((2..=3).contains(&visible), "visible = {visible}");

    let bar = compute_scrollbars(grid.viewport(), &layout)
        .horizontal
        .expect("column scrollbar");
    assert_eq!(bar.track, Rect::new(0.0, 292.0, 250.0, 8.0));
    assert!(bar.thumb.width >= 48.0);
    assert_eq!(bar.thumb.width, 150.0);
}

#[test]
fn spans_follow_the_header_offset() {
    let grid = small_grid(500.0);
    let layout = grid.layout();
    let a = layout.column(0).unwrap();
    assert_eq!((a.start, a.size, a.line), (37.0, 100.0, 137.5));
    let b = layout.column(1).unwrap();
    assert_eq!((b.start, b.line), (137.0, 237.5));
    let row0 = layout.row(0).unwrap();
    assert_eq!((row0.start, row0.size, row0.line), (25.0, 24.0, 49.5));
}

#[test]
fn points_strictly_inside_resolve_to_their_cell() {
    let grid = small_grid(500.0);
    for (x, y, col, row) in [
        (40.0, 30.0, "A", 0),
        (136.0, 48.0, "A", 0),
        (138.0, 50.0, "B", 1),
        (300.0, 140.0, "C", 4),
    ] {
        let hit = grid.hit_test(x, y);
        assert!(hit.is_cell(), "({x}, {y})");
        assert_eq!(hit.col_label(), col);
        assert_eq!(hit.row_value(), row);
    }
}

#[test]
fn band_edges_and_headers_hit_nothing() {
    let grid = small_grid(500.0);
    let on_edge = grid.hit_test(37.0, 30.0);
    assert_eq!(on_edge.col, None);
    assert_eq!(on_edge.row, Some(0));

    let on_top = grid.hit_test(60.0, 25.0);
    assert_eq!(on_top.col_label(), "A");
    assert_eq!(on_top.row, None);

    let header = grid.hit_test(10.0, 10.0);
    assert!(!header.is_cell());
    assert_eq!(header.col_label(), "-A");
    assert_eq!(header.row_value(), -1);
}

#[test]
fn cell_rects_and_off_screen_cells() {
    let grid = small_grid(500.0);
    assert_eq!(grid.cell_rect("B", 2), Rect::new(137.0, 73.0, 100.0, 24.0));
    assert_eq!(grid.cell_rect("Q", 200), Rect::ZERO);
    assert_eq!(grid.cell_rect("not a label", 0), Rect::new(0.0, 25.0, 0.0, 24.0));
}

#[test]
fn device_pixel_ratio_scales_everything() {
    let (mut grid, _host) = attached_grid(GridOptions::default(), 250.0, 150.0, 2.0);
    grid.set_size(10, 5);
    assert_eq!(grid.viewport().width, 500.0);
    assert_eq!(grid.viewport().height, 300.0);

    let a = *grid.layout().column(0).unwrap();
    assert_eq!((a.start, a.size, a.line), (74.0, 200.0, 274.5));

    // CSS-pixel pointers are scaled before hit-testing.
    let hit = grid.hit_test(50.0, 30.0);
    assert_eq!(hit.col_label(), "A");
    assert_eq!(hit.row_value(), 0);
}

#[test]
fn fractional_ratio_floors_surface_size() {
    let (grid, _host) = attached_grid(GridOptions::default(), 333.0, 201.0, 1.5);
    assert_eq!(grid.viewport().width, 499.0);
    assert_eq!(grid.viewport().height, 301.0);
    assert_eq!(grid.viewport().scale, 1.5);
}

#[test]
fn size_overrides_apply_and_clear() {
    let mut grid = small_grid(500.0);
    grid.set_column_sizes(Some(HashMap::from([("B".to_string(), 50)])));
    grid.set_row_sizes(Some(HashMap::from([(1, 40)])));

    let layout = grid.layout();
    assert_eq!(layout.column(1).unwrap().size, 50.0);
    assert_eq!(layout.column(2).unwrap().start, 187.0);
    assert_eq!(layout.row(1).unwrap().size, 40.0);
    assert_eq!(layout.row(2).unwrap().start, 89.0);

    let mut images = sheetgrid::ImageCache::default();
    grid.render(&mut images);
    grid.set_column_sizes(None);
    assert!(grid.is_dirty());
    assert!(grid.viewport().col_sizes.is_empty());
    assert_eq!(grid.layout().column(1).unwrap().size, 100.0);

    let before = grid.viewport().clone();
    grid.set_column_sizes(None);
    assert_eq!(grid.viewport(), &before);
}

#[test]
fn headers_off_start_cells_at_the_edge() {
    let options = GridOptions {
        row_headers: false,
        col_headers: false,
        ..GridOptions::default()
    };
    let (mut grid, _host) = attached_grid(options, 500.0, 300.0, 1.0);
    grid.set_size(10, 5);
    assert_eq!(grid.cell_rect("A", 0), Rect::new(0.0, 0.0, 100.0, 24.0));
}

#[test]
fn minimums_clamp_the_origin() {
    let mut grid = small_grid(500.0);
    grid.set_min_row(3);
    grid.set_min_col(1);
    assert_eq!(grid.viewport().origin_row, 3);
    assert_eq!(grid.viewport().origin_col, 1);
    let layout = grid.layout();
    assert_eq!(layout.first_row(), Some(3));
    assert_eq!(layout.first_column(), Some(1));
    assert_eq!(grid.cell_rect("B", 3), Rect::new(37.0, 25.0, 100.0, 24.0));
}

#[test]
fn extent_is_inclusive() {
    let mut vp = GridViewport::default();
    vp.set_extent(2, 1);
    vp.resize(2000.0, 2000.0, 1.0);
    let layout = VisibleLayout::compute(&vp);
    assert_eq!(layout.visible_columns(), 2);
    assert_eq!(layout.visible_rows(), 3);
}

#[test]
fn walk_is_shared_with_custom_sizes() {
    let spans = walk_axis(0, 3, 0.0, 1000.0, |i| f64::from(i + 1) * 10.5);
    let lines: Vec<f64> = spans.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![10.5, 31.5, 63.5, 105.5]);
}
