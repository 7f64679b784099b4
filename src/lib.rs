//! sheetgrid - virtualized spreadsheet grid for the web
//!
//! Draws a scrollable grid of labelled columns and numbered rows onto a
//! Canvas 2D surface via WebAssembly:
//! - Only the visible window of cells is laid out and painted
//! - Per-column and per-row size overrides, merged spans, images
//! - Rectangular and whole-row selection by pointer drag
//! - Synthetic scrollbars, wheel scrolling, HiDPI scaling
//! - Cell content pulled on demand from a host-supplied provider
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridHost } from 'sheetgrid';
//! await init();
//! const host = new GridHost();
//! const grid = host.create(document.getElementById('holder'), { selMode: 'row' });
//! grid.setSize(500, 26);
//! grid.on('cellValue', (tag, col, row) => ({ v: `${col}${row}` }));
//! ```

pub mod cell_ref;
pub mod error;
pub mod listeners;
pub mod numfmt;
pub mod types;

// Rendering modules (Canvas 2D)
pub mod layout;
pub mod render;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::{Result, SheetgridError};
pub use layout::{CellHit, GridViewport, Rect, VisibleLayout};
pub use listeners::{
    CellValueProvider, ContextMenuObserver, HoverObserver, ResizeObserver, SelectionObserver,
};
pub use render::{FrameStats, ImageCache, Surface};
pub use types::*;
pub use viewer::{
    Grid, GridRegistry, HostElement, ImageLoader, PointerButton, PointerEvent, RESIZE_DEBOUNCE_MS,
    WHEEL_MIN_INTERVAL_MS, WHEEL_STEP_PX,
};
#[cfg(target_arch = "wasm32")]
pub use viewer::{GridHost, SheetGrid};

/// Column label for a zero-based index (`0` → `"A"`, `26` → `"AA"`).
#[must_use]
#[wasm_bindgen(js_name = indexToLabel)]
pub fn index_to_label(index: i32) -> String {
    cell_ref::index_to_label(index)
}

/// Zero-based index of a column label, or `-1` when it is not one.
#[must_use]
#[wasm_bindgen(js_name = labelToIndex)]
pub fn label_to_index(label: &str) -> i32 {
    cell_ref::label_to_index(label)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
