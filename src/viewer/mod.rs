//! The interactive grid instance and its registry.
//!
//! A [`Grid`] owns one viewport, its selection state machine and its
//! observers. It paints onto a [`Surface`] it is attached to and asks a
//! [`HostElement`] for its size and whether it is still in the page.
//! A [`GridRegistry`] owns many grids, the shared image cache and the
//! frame scheduler.
//!
//! Browser wiring (canvas creation, DOM listeners, observers and the
//! animation frame loop) lives in the wasm-only `bindings` module.

#[cfg(target_arch = "wasm32")]
mod bindings;
mod events;
mod registry;
mod scroll;

use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
pub use bindings::{GridHost, SheetGrid};
pub use events::{PointerButton, PointerEvent};
pub use registry::{GridRegistry, ImageLoader, RESIZE_DEBOUNCE_MS};
pub use scroll::{WHEEL_MIN_INTERVAL_MS, WHEEL_STEP_PX};

use crate::cell_ref::col_index;
use crate::layout::{CellHit, GridViewport, Rect, VisibleLayout};
use crate::listeners::{
    CellValueProvider, ContextMenuObserver, HoverObserver, Listeners, ResizeObserver,
    SelectionObserver,
};
use crate::render::{
    render_frame, CellDescriptor, FrameStats, ImageCache, RenderParams, Scrollbars, Surface,
};
use crate::types::{GridId, GridOptions, Selection};

/// The element a grid lives in.
pub trait HostElement {
    /// Layout size in CSS pixels.
    fn size(&self) -> (f64, f64);

    fn device_pixel_ratio(&self) -> f64;

    /// True while the host is in the document and still holds the surface.
    fn is_attached(&self) -> bool;

    /// Remove the surface from the host. Called once on detach.
    fn release(&mut self) {}
}

/// Which scrollbar, if any, the pointer is dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ScrollDrag {
    #[default]
    None,
    Vertical,
    Horizontal,
}

/// One virtualized grid.
pub struct Grid<S: Surface> {
    id: GridId,
    options: GridOptions,
    viewport: GridViewport,
    selection: Selection,
    selecting: bool,
    drag: ScrollDrag,
    /// Bars drawn by the last frame; pointer input hit-tests against these.
    scrollbars: Scrollbars,
    dirty: bool,
    last_wheel_ms: Option<f64>,
    listeners: Listeners,
    surface: Option<S>,
    host: Option<Box<dyn HostElement>>,
    descriptors: Vec<CellDescriptor>,
}

impl<S: Surface> Grid<S> {
    /// Create a detached grid.
    pub fn new(id: GridId, options: GridOptions) -> Self {
        let options = options.sanitized();
        Self {
            id,
            viewport: GridViewport::new(&options),
            options,
            selection: Selection::default(),
            selecting: false,
            drag: ScrollDrag::None,
            scrollbars: Scrollbars::default(),
            dirty: true,
            last_wheel_ms: None,
            listeners: Listeners::default(),
            surface: None,
            host: None,
            descriptors: Vec::new(),
        }
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn viewport(&self) -> &GridViewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// True between a pointer-down on a cell and the matching pointer-up.
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Scrollbars as drawn by the most recent frame.
    pub fn scrollbars(&self) -> &Scrollbars {
        &self.scrollbars
    }

    // ===== Lifecycle =====

    /// Attach to a surface inside `host` and size it from the host.
    pub fn attach(&mut self, surface: S, host: Box<dyn HostElement>) {
        self.surface = Some(surface);
        self.host = Some(host);
        self.dirty = true;
        tracing::debug!(grid = %self.id, "attached");
        self.resize();
    }

    /// Release the host and surface. Idempotent.
    pub fn detach(&mut self) {
        if let Some(mut host) = self.host.take() {
            host.release();
        }
        if self.surface.take().is_some() {
            tracing::debug!(grid = %self.id, "detached");
        }
        self.selecting = false;
        self.drag = ScrollDrag::None;
    }

    /// Detach when the host has left the document or lost the surface.
    /// Returns whether the grid is still attached.
    pub fn check_attached(&mut self) -> bool {
        let attached = self.host.as_ref().is_some_and(|h| h.is_attached());
        if !attached {
            self.detach();
        }
        self.is_attached()
    }

    /// Re-read the host size: surface = floor(css size × device ratio).
    pub fn resize(&mut self) {
        let Some(host) = self.host.as_ref() else {
            return;
        };
        if self.surface.is_none() {
            return;
        }
        let (width, height) = host.size();
        let ratio = host.device_pixel_ratio();
        self.resize_to(width, height, ratio);
    }

    /// Apply explicit CSS dimensions and device pixel ratio.
    pub fn resize_to(&mut self, css_width: f64, css_height: f64, ratio: f64) {
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        self.viewport
            .resize((css_width * ratio).floor(), (css_height * ratio).floor(), ratio);
        self.dirty = true;
        tracing::debug!(
            grid = %self.id,
            width = self.viewport.width,
            height = self.viewport.height,
            scale = ratio,
            "resized"
        );
        if let Some(observer) = self.listeners.resize.as_mut() {
            observer.resized();
        }
    }

    // ===== Host operations =====

    /// Set the logical extent.
    pub fn set_size(&mut self, rows: u32, columns: u32) {
        self.viewport.set_extent(rows, columns);
        self.dirty = true;
    }

    /// Replace column width overrides; `None` clears them.
    pub fn set_column_sizes(&mut self, sizes: Option<HashMap<String, u32>>) {
        self.viewport.col_sizes = sizes.unwrap_or_default();
        self.viewport.col_sizes.retain(|_, w| *w > 0);
        self.dirty = true;
    }

    /// Replace row height overrides; `None` clears them.
    pub fn set_row_sizes(&mut self, sizes: Option<HashMap<u32, u32>>) {
        self.viewport.row_sizes = sizes.unwrap_or_default();
        self.viewport.row_sizes.retain(|_, h| *h > 0);
        self.dirty = true;
    }

    pub fn set_min_row(&mut self, min: u32) {
        self.viewport.set_min_row(min);
        self.dirty = true;
    }

    pub fn set_min_col(&mut self, min: u32) {
        self.viewport.set_min_col(min);
        self.dirty = true;
    }

    /// Replace the selection; `None` clears it. A selection without a live
    /// endpoint uses its anchor.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(Selection::normalized).unwrap_or_default();
        self.dirty = true;
    }

    /// Cell content changed outside the grid: schedule a repaint that
    /// re-queries the provider for every visible cell.
    pub fn data_changed(&mut self) {
        self.descriptors.clear();
        self.dirty = true;
    }

    // ===== Observers =====

    pub fn set_cell_value_provider(&mut self, provider: Option<Box<dyn CellValueProvider>>) {
        self.listeners.cell_value = provider;
        self.dirty = true;
    }

    pub fn on_resize(&mut self, observer: Option<Box<dyn ResizeObserver>>) {
        self.listeners.resize = observer;
    }

    pub fn on_hover(&mut self, observer: Option<Box<dyn HoverObserver>>) {
        self.listeners.hover = observer;
    }

    pub fn on_context_menu(&mut self, observer: Option<Box<dyn ContextMenuObserver>>) {
        self.listeners.context_menu = observer;
    }

    pub fn on_selection(&mut self, observer: Option<Box<dyn SelectionObserver>>) {
        self.listeners.selection = observer;
    }

    // ===== Geometry =====

    /// Walk the current viewport.
    pub fn layout(&self) -> VisibleLayout {
        VisibleLayout::compute(&self.viewport)
    }

    /// Resolve a point given in CSS pixels relative to the surface.
    pub fn hit_test(&self, x: f64, y: f64) -> CellHit {
        let scale = self.viewport.scale;
        self.layout().hit_test(x * scale, y * scale)
    }

    /// Device-pixel rectangle of a cell; zero extent on axes that are off screen.
    pub fn cell_rect(&self, col: &str, row: u32) -> Rect {
        self.layout().cell_rect(col_index(col), row)
    }

    // ===== Rendering =====

    /// Paint a frame if anything changed since the last one.
    pub fn render(&mut self, images: &mut ImageCache<S::Image>) -> Option<FrameStats> {
        if !self.dirty {
            return None;
        }
        let surface = self.surface.as_mut()?;
        let layout = VisibleLayout::compute(&self.viewport);
        let params = RenderParams {
            viewport: &self.viewport,
            layout: &layout,
            selection: &self.selection,
            options: &self.options,
        };
        images.begin_frame(self.id);
        let stats = render_frame(
            surface,
            &params,
            self.listeners.cell_value.as_deref(),
            images,
            self.id,
            &mut self.descriptors,
        );
        images.end_frame(self.id);
        self.scrollbars = stats.scrollbars;
        self.dirty = false;
        Some(stats)
    }
}

impl<S: Surface> std::fmt::Debug for Grid<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("id", &self.id)
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .field("attached", &self.is_attached())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
