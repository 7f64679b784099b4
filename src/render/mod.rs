//! Rendering engine.
//!
//! This module provides:
//! - The `Surface` drawing abstraction and per-frame parameters
//! - The frame pipeline (chrome, cells, selection, scrollbars)
//! - Scrollbar and selection geometry, text fitting, color helpers
//! - The shared image cache
//! - A Canvas 2D surface for the browser

pub mod backend;
pub mod cache;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod colors;
pub mod pipeline;
pub mod scrollbar;
pub mod selection;
pub mod text;

// Re-export commonly used types
pub use backend::{RenderParams, Surface, TextBaseline, TextStyle};
pub use cache::{ImageCache, ImageLookup, LruCache, DEFAULT_IMAGE_CAPACITY};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use colors::{palette, CssColor};
pub use pipeline::{render_frame, CellDescriptor, FrameStats};
pub use scrollbar::{
    compute_scrollbars, drag_origin, ScrollbarGeometry, Scrollbars, MIN_SCROLL_TRACK,
    SCROLLBAR_THICKNESS,
};
pub use selection::{selection_geometry, SelectionGeometry};
