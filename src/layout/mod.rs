//! Layout engine: which columns and rows are on screen and where.
//!
//! This module handles:
//! - Viewport state (origin, extent, size overrides, device scale)
//! - The shared column/row walk that produces visible spans
//! - Hit-testing points and resolving cell rectangles from those spans

mod grid_layout;
mod viewport;

pub use grid_layout::{walk_axis, CellHit, Rect, Span, VisibleLayout};
pub use viewport::{
    GridViewport, COL_HEADER_HEIGHT, DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT, DEFAULT_TOTAL_COLUMNS,
    DEFAULT_TOTAL_ROWS, ROW_HEADER_WIDTH,
};
