//! Capability traits through which a grid talks to its host.
//!
//! Each notification has its own trait so hosts implement only what they
//! need. Closures with the matching signature implement the traits directly.

use crate::types::{CellAddr, CellValue};

/// Supplies cell content on demand, once per visible cell per frame.
pub trait CellValueProvider {
    /// Content for `(tag, col, row)`, or `None` to leave the cell empty.
    fn cell_value(&self, tag: &str, col: &str, row: u32) -> Option<CellValue>;
}

impl<F> CellValueProvider for F
where
    F: Fn(&str, &str, u32) -> Option<CellValue>,
{
    fn cell_value(&self, tag: &str, col: &str, row: u32) -> Option<CellValue> {
        self(tag, col, row)
    }
}

/// Told after the surface dimensions change.
pub trait ResizeObserver {
    fn resized(&mut self);
}

impl<F: FnMut()> ResizeObserver for F {
    fn resized(&mut self) {
        self();
    }
}

/// Told on every pointer move. `col` is `-A` and `row` is `-1` when the
/// pointer is outside every cell.
pub trait HoverObserver {
    fn hover(&mut self, col: &str, row: i64, page_x: f64, page_y: f64);
}

impl<F: FnMut(&str, i64, f64, f64)> HoverObserver for F {
    fn hover(&mut self, col: &str, row: i64, page_x: f64, page_y: f64) {
        self(col, row, page_x, page_y);
    }
}

/// Told when the secondary button goes down over the grid.
pub trait ContextMenuObserver {
    fn context_menu(&mut self, col: &str, row: i64, page_x: f64, page_y: f64);
}

impl<F: FnMut(&str, i64, f64, f64)> ContextMenuObserver for F {
    fn context_menu(&mut self, col: &str, row: i64, page_x: f64, page_y: f64) {
        self(col, row, page_x, page_y);
    }
}

/// Told once per committed drag with the anchor and final endpoint.
pub trait SelectionObserver {
    fn selection_changed(&mut self, start: Option<&CellAddr>, end: Option<&CellAddr>);
}

impl<F: FnMut(Option<&CellAddr>, Option<&CellAddr>)> SelectionObserver for F {
    fn selection_changed(&mut self, start: Option<&CellAddr>, end: Option<&CellAddr>) {
        self(start, end);
    }
}

/// Registered observers for one grid.
#[derive(Default)]
pub struct Listeners {
    pub cell_value: Option<Box<dyn CellValueProvider>>,
    pub resize: Option<Box<dyn ResizeObserver>>,
    pub hover: Option<Box<dyn HoverObserver>>,
    pub context_menu: Option<Box<dyn ContextMenuObserver>>,
    pub selection: Option<Box<dyn SelectionObserver>>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("cell_value", &self.cell_value.is_some())
            .field("resize", &self.resize.is_some())
            .field("hover", &self.hover.is_some())
            .field("context_menu", &self.context_menu.is_some())
            .field("selection", &self.selection.is_some())
            .finish()
    }
}
