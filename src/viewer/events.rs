//! Pointer input: scrollbar drags, the selection state machine, hover and
//! context-menu notifications.
//!
//! Pointer coordinates are CSS pixels relative to the surface; they are
//! scaled to device pixels before being compared with anything drawn.

use super::{Grid, ScrollDrag};
use crate::cell_ref::col_label;
use crate::layout::CellHit;
use crate::render::{drag_origin, Surface, SCROLLBAR_THICKNESS};
use crate::types::{CellAddr, SelectionMode};

/// Mouse button that produced a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// One pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    /// Position relative to the surface, CSS pixels.
    pub x: f64,
    pub y: f64,
    /// Position relative to the page, passed through to observers.
    pub page_x: f64,
    pub page_y: f64,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            page_x: x,
            page_y: y,
            button: PointerButton::Primary,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_page(mut self, page_x: f64, page_y: f64) -> Self {
        self.page_x = page_x;
        self.page_y = page_y;
        self
    }
}

impl<S: Surface> Grid<S> {
    /// Pointer pressed.
    ///
    /// Inside a scrollbar band this starts a drag and moves the origin.
    /// Over a cell it starts a selection. The secondary button also reports
    /// a context-menu request, with sentinels when no cell is under it.
    pub fn pointer_down(&mut self, event: PointerEvent) {
        if !self.is_attached() {
            return;
        }
        let (x, y) = self.device_point(&event);

        if let Some(drag) = self.scrollbar_band(x, y) {
            self.drag = drag;
            self.drag_scrollbar(x, y);
            return;
        }

        let hit = self.layout().hit_test(x, y);
        if let (Some(col), Some(row)) = (hit.col, hit.row) {
            let (start_col, tmp_col) = match self.options.sel_mode {
                SelectionMode::Default => (col_label(col), col_label(col)),
                SelectionMode::Row => (self.first_column_label(), self.last_column_label()),
            };
            self.selection.start = Some(CellAddr::new(start_col, row));
            self.selection.tmp = Some(CellAddr::new(tmp_col, row));
            self.selection.end = None;
            self.selecting = true;
            self.dirty = true;
        }

        if event.button == PointerButton::Secondary {
            if let Some(observer) = self.listeners.context_menu.as_mut() {
                observer.context_menu(&hit.col_label(), hit.row_value(), event.page_x, event.page_y);
            }
        }
    }

    /// Pointer moved, pressed or not.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        if !self.is_attached() {
            return;
        }
        let (x, y) = self.device_point(&event);

        if self.drag != ScrollDrag::None {
            self.drag_scrollbar(x, y);
            return;
        }

        let hit = self.layout().hit_test(x, y);
        self.extend_selection(&hit);

        if let Some(observer) = self.listeners.hover.as_mut() {
            observer.hover(&hit.col_label(), hit.row_value(), event.page_x, event.page_y);
        }
    }

    /// Pointer released: end any scrollbar drag and commit a live selection.
    pub fn pointer_up(&mut self) {
        if !self.is_attached() {
            return;
        }
        self.drag = ScrollDrag::None;

        if !self.selecting {
            return;
        }
        self.selecting = false;
        self.selection.end = self.selection.tmp.clone();
        self.dirty = true;

        if let Some(observer) = self.listeners.selection.as_mut() {
            observer.selection_changed(self.selection.start.as_ref(), self.selection.end.as_ref());
        }
    }

    fn extend_selection(&mut self, hit: &CellHit) {
        if !self.selecting {
            return;
        }
        let Some(start) = self.selection.start.as_ref() else {
            return;
        };
        let (Some(col), Some(row)) = (hit.col, hit.row) else {
            return;
        };
        let tmp = match self.options.sel_mode {
            SelectionMode::Default => CellAddr::new(col_label(col), row),
            SelectionMode::Row => CellAddr::new(self.last_column_label(), start.row),
        };
        self.selection.tmp = Some(tmp);
        self.selection.end = None;
        self.dirty = true;
    }

    fn device_point(&self, event: &PointerEvent) -> (f64, f64) {
        let scale = self.viewport.scale;
        (event.x * scale, event.y * scale)
    }

    /// Which bar band, if any, holds a device-pixel point. Only bars drawn by
    /// the last frame count.
    fn scrollbar_band(&self, x: f64, y: f64) -> Option<ScrollDrag> {
        let thickness = SCROLLBAR_THICKNESS * self.viewport.scale;
        if self.scrollbars.vertical.is_some() && x > self.viewport.width - thickness {
            return Some(ScrollDrag::Vertical);
        }
        if self.scrollbars.horizontal.is_some() && y > self.viewport.height - thickness {
            return Some(ScrollDrag::Horizontal);
        }
        None
    }

    fn drag_scrollbar(&mut self, x: f64, y: f64) {
        let vp = &mut self.viewport;
        match self.drag {
            ScrollDrag::Vertical => {
                let row = drag_origin(vp.total_rows, y, vp.height);
                vp.set_origin_row(row);
            }
            ScrollDrag::Horizontal => {
                let col = drag_origin(vp.total_columns, x, vp.width);
                vp.set_origin_col(col);
            }
            ScrollDrag::None => return,
        }
        self.dirty = true;
    }

    fn first_column_label(&self) -> String {
        col_label(self.viewport.min_col)
    }

    fn last_column_label(&self) -> String {
        col_label(self.viewport.total_columns)
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
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::layout::Rect;
    use crate::render::{ImageCache, TextStyle};
    use crate::types::{GridId, GridOptions, SelectionMode};
    use crate::viewer::HostElement;

    struct NullSurface;

    impl Surface for NullSurface {
        type Image = ();
        fn set_size(&mut self, _: u32, _: u32) {}
        fn clear_rect(&mut self, _: Rect) {}
        fn fill_rect(&mut self, _: Rect, _: &str) {}
        fn stroke_path(&mut self, _: &[(f64, f64)], _: &str, _: f64) {}
        fn set_font(&mut self, _: &str) {}
        fn measure_text(&mut self, _: &str) -> f64 {
            0.0
        }
        fn fill_text(&mut self, _: &str, _: f64, _: f64, _: TextStyle<'_>) {}
        fn draw_image(&mut self, _: &(), _: Rect) {}
    }

    struct FixedHost(f64, f64);

    impl HostElement for FixedHost {
        fn size(&self) -> (f64, f64) {
            (self.0, self.1)
        }
        fn device_pixel_ratio(&self) -> f64 {
            1.0
        }
        fn is_attached(&self) -> bool {
            true
        }
    }

    fn grid(mode: SelectionMode) -> Grid<NullSurface> {
        let options = GridOptions {
            sel_mode: mode,
            ..GridOptions::default()
        };
        let mut grid = Grid::new(GridId(1), options);
        grid.attach(NullSurface, Box::new(FixedHost(500.0, 300.0)));
        grid.set_size(10, 5);
        grid
    }

    // Column A spans x in (37, 137.5), row 0 spans y in (25, 49.5).
    fn center(col: u32, row: u32) -> PointerEvent {
        PointerEvent::at(
            37.0 + f64::from(col) * 100.0 + 50.0,
            25.0 + f64::from(row) * 24.0 + 12.0,
        )
    }

    #[test]
    fn drag_commits_once() {
        let mut g = grid(SelectionMode::Default);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        g.on_selection(Some(Box::new(
            move |start: Option<&CellAddr>, end: Option<&CellAddr>| {
                sink.borrow_mut().push((start.cloned(), end.cloned()));
            },
        )));

        g.pointer_down(center(0, 1));
        assert!(g.is_selecting());
        assert_eq!(g.selection().tmp, Some(CellAddr::new("A", 1)));
        assert!(g.selection().end.is_none());

        g.pointer_move(center(2, 3));
        assert_eq!(g.selection().tmp, Some(CellAddr::new("C", 3)));
        g.pointer_up();

        assert!(!g.is_selecting());
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            (Some(CellAddr::new("A", 1)), Some(CellAddr::new("C", 3)))
        );
    }

    #[test]
    fn row_mode_pins_row_and_spans_columns() {
        let mut g = grid(SelectionMode::Row);
        g.pointer_down(center(1, 2));
        assert_eq!(g.selection().start, Some(CellAddr::new("A", 2)));
        assert_eq!(g.selection().tmp, Some(CellAddr::new("F", 2)));

        g.pointer_move(center(3, 5));
        assert_eq!(g.selection().tmp, Some(CellAddr::new("F", 2)));
        g.pointer_up();
        assert_eq!(g.selection().end, Some(CellAddr::new("F", 2)));
    }

    #[test]
    fn down_outside_cells_does_not_select() {
        let mut g = grid(SelectionMode::Default);
        g.pointer_down(PointerEvent::at(10.0, 10.0));
        assert!(!g.is_selecting());
        assert!(g.selection().is_empty());
    }

    #[test]
    fn move_off_grid_keeps_last_cell_and_reports_sentinel() {
        let mut g = grid(SelectionMode::Default);
        let hovers = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hovers);
        g.on_hover(Some(Box::new(move |col: &str, row: i64, _: f64, _: f64| {
            sink.borrow_mut().push((col.to_string(), row));
        })));

        g.pointer_down(center(1, 1));
        g.pointer_move(PointerEvent::at(5.0, 5.0));
        assert_eq!(g.selection().tmp, Some(CellAddr::new("B", 1)));
        assert_eq!(hovers.borrow().as_slice(), &[("-A".to_string(), -1)]);
    }

    #[test]
    fn secondary_button_reports_context_menu() {
        let mut g = grid(SelectionMode::Default);
        let menus = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&menus);
        g.on_context_menu(Some(Box::new(
            move |col: &str, row: i64, px: f64, py: f64| {
                sink.borrow_mut().push((col.to_string(), row, px, py));
            },
        )));

        g.pointer_down(
            center(0, 0)
                .with_page(300.0, 400.0)
                .with_button(PointerButton::Secondary),
        );
        g.pointer_down(PointerEvent::at(5.0, 5.0).with_button(PointerButton::Secondary));
        g.pointer_down(center(1, 1));

        let menus = menus.borrow();
        assert_eq!(menus.len(), 2);
        assert_eq!(menus[0], ("A".to_string(), 0, 300.0, 400.0));
        assert_eq!(menus[1], ("-A".to_string(), -1, 5.0, 5.0));
    }

    #[test]
    fn vertical_bar_drag_moves_origin() {
        let mut g = grid(SelectionMode::Default);
        g.set_size(1000, 5);
        let mut images = ImageCache::default();
        g.render(&mut images);
        assert!(g.scrollbars().vertical.is_some());

        g.pointer_down(PointerEvent::at(496.0, 150.0));
        assert_eq!(g.viewport().origin_row, 500);
        assert!(!g.is_selecting());

        g.pointer_move(PointerEvent::at(200.0, 30.0));
        assert_eq!(g.viewport().origin_row, 100);

        g.pointer_up();
        g.pointer_move(PointerEvent::at(496.0, 270.0));
        assert_eq!(g.viewport().origin_row, 100);
    }

    #[test]
    fn detached_grid_ignores_input() {
        let mut g = grid(SelectionMode::Default);
        g.detach();
        g.pointer_down(center(0, 0));
        assert!(g.selection().is_empty());
    }

    #[test]
    fn dom_buttons() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other(4));
    }
}
