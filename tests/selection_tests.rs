//! Pointer interaction: selection drags, hover, context menu and scrollbar drags.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{attached_grid, RecordingSurface};
use sheetgrid::cell_ref::{NO_COLUMN, NO_ROW};
use sheetgrid::types::{CellAddr, GridOptions, Selection, SelectionMode};
use sheetgrid::{Grid, ImageCache, PointerButton, PointerEvent};

type Commits = Rc<RefCell<Vec<(Option<CellAddr>, Option<CellAddr>)>>>;
type Reports = Rc<RefCell<Vec<(String, i64, f64, f64)>>>;

fn grid(options: GridOptions) -> Grid<RecordingSurface> {
    let (mut grid, _host) = attached_grid(options, 500.0, 300.0, 1.0);
    grid.set_size(10, 5);
    grid
}

fn record_commits(grid: &mut Grid<RecordingSurface>) -> Commits {
    let commits: Commits = Rc::default();
    let sink = Rc::clone(&commits);
    grid.on_selection(Some(Box::new(
        move |start: Option<&CellAddr>, end: Option<&CellAddr>| {
            sink.borrow_mut().push((start.cloned(), end.cloned()));
        },
    )));
    commits
}

fn record_hover(grid: &mut Grid<RecordingSurface>) -> Reports {
    let reports: Reports = Rc::default();
    let sink = Rc::clone(&reports);
    grid.on_hover(Some(Box::new(move |col: &str, row: i64, px: f64, py: f64| {
        sink.borrow_mut().push((col.to_string(), row, px, py));
    })));
    reports
}

fn record_context_menu(grid: &mut Grid<RecordingSurface>) -> Reports {
    let reports: Reports = Rc::default();
    let sink = Rc::clone(&reports);
    grid.on_context_menu(Some(Box::new(
        move |col: &str, row: i64, px: f64, py: f64| {
            sink.borrow_mut().push((col.to_string(), row, px, py));
        },
    )));
    reports
}

#[test]
fn drag_selects_a_range_and_commits_once() {
    let mut grid = grid(GridOptions::default());
    let commits = record_commits(&mut grid);

    grid.pointer_down(PointerEvent::at(60.0, 60.0));
    assert!(grid.is_selecting());
    assert_eq!(grid.selection().start, Some(CellAddr::new("A", 1)));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("A", 1)));
    assert_eq!(grid.selection().end, None);

    grid.pointer_move(PointerEvent::at(160.0, 80.0));
    grid.pointer_move(PointerEvent::at(260.0, 110.0));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("C", 3)));
    assert_eq!(grid.selection().end, None);
    assert!(commits.borrow().is_empty());

    grid.pointer_up();
    assert!(!grid.is_selecting());
    assert_eq!(grid.selection().end, Some(CellAddr::new("C", 3)));
    assert_eq!(
        *commits.borrow(),
        vec![(Some(CellAddr::new("A", 1)), Some(CellAddr::new("C", 3)))]
    );

    // A stray release commits nothing.
    grid.pointer_up();
    assert_eq!(commits.borrow().len(), 1);
}

#[test]
fn moves_without_a_press_leave_the_selection_alone() {
    let mut grid = grid(GridOptions::default());
    grid.set_selection(Some(Selection::range(
        CellAddr::new("B", 2),
        CellAddr::new("B", 2),
    )));
    grid.pointer_move(PointerEvent::at(260.0, 110.0));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("B", 2)));
}

#[test]
fn hover_reports_every_move_with_page_coordinates() {
    let mut grid = grid(GridOptions::default());
    let hovers = record_hover(&mut grid);

    grid.pointer_move(PointerEvent::at(60.0, 60.0).with_page(160.0, 460.0));
    grid.pointer_move(PointerEvent::at(10.0, 10.0));

    let hovers = hovers.borrow();
    assert_eq!(hovers.len(), 2);
    assert_eq!(hovers[0], ("A".to_string(), 1, 160.0, 460.0));
    assert_eq!(hovers[1], (NO_COLUMN.to_string(), i64::from(NO_ROW), 10.0, 10.0));
}

#[test]
fn row_mode_selects_whole_rows() {
    let options = GridOptions {
        sel_mode: SelectionMode::Row,
        ..GridOptions::default()
    };
    let mut grid = grid(options);
    let commits = record_commits(&mut grid);

    grid.pointer_down(PointerEvent::at(260.0, 60.0));
    assert_eq!(grid.selection().start, Some(CellAddr::new("A", 1)));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("F", 1)));

    // Dragging to another row keeps the anchor row.
    grid.pointer_move(PointerEvent::at(60.0, 110.0));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("F", 1)));

    grid.pointer_up();
    assert_eq!(
        *commits.borrow(),
        vec![(Some(CellAddr::new("A", 1)), Some(CellAddr::new("F", 1)))]
    );
}

#[test]
fn row_mode_starts_at_the_minimum_column() {
    let options = GridOptions {
        sel_mode: SelectionMode::Row,
        min_col: 2,
        ..GridOptions::default()
    };
    let mut grid = grid(options);
    grid.pointer_down(PointerEvent::at(60.0, 30.0));
    assert_eq!(grid.selection().start, Some(CellAddr::new("C", 0)));
}

#[test]
fn secondary_button_reports_context_menu() {
    let mut grid = grid(GridOptions::default());
    let menus = record_context_menu(&mut grid);

    grid.pointer_down(
        PointerEvent::at(160.0, 80.0)
            .with_button(PointerButton::Secondary)
            .with_page(900.0, 700.0),
    );
    grid.pointer_up();
    grid.pointer_down(PointerEvent::at(5.0, 5.0).with_button(PointerButton::Secondary));
    grid.pointer_down(PointerEvent::at(160.0, 80.0));

    let menus = menus.borrow();
    assert_eq!(menus.len(), 2);
    assert_eq!(menus[0], ("B".to_string(), 2, 900.0, 700.0));
    assert_eq!(menus[1].0, NO_COLUMN);
    assert_eq!(menus[1].1, -1);
}

#[test]
fn pointer_coordinates_scale_with_device_ratio() {
    let (mut grid, _host) = attached_grid(GridOptions::default(), 250.0, 150.0, 2.0);
    grid.set_size(10, 5);
    // CSS (30, 30) is device (60, 60): column A starts at 74 on a 2x surface.
    grid.pointer_down(PointerEvent::at(30.0, 30.0));
    assert_eq!(grid.selection().start, None);

    grid.pointer_down(PointerEvent::at(60.0, 30.0));
    assert_eq!(grid.selection().start, Some(CellAddr::new("A", 0)));
}

#[test]
fn external_selection_is_silent_and_normalized() {
    let mut grid = grid(GridOptions::default());
    let commits = record_commits(&mut grid);
    grid.set_selection(Some(Selection {
        start: Some(CellAddr::new("D", 4)),
        end: None,
        tmp: None,
    }));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("D", 4)));
    assert!(grid.is_dirty());
    assert!(commits.borrow().is_empty());

    grid.set_selection(None);
    assert!(grid.selection().is_empty());
}

#[test]
fn horizontal_bar_drag_moves_column_origin() {
    let mut grid = grid(GridOptions::default());
    grid.set_size(10, 100);
    let mut images = ImageCache::default();
    grid.render(&mut images).unwrap();
    assert!(grid.scrollbars().horizontal.is_some());
    assert!(grid.scrollbars().vertical.is_none());

    grid.pointer_down(PointerEvent::at(250.0, 296.0));
    assert_eq!(grid.viewport().origin_col, 50);
    assert!(!grid.is_selecting());

    grid.pointer_move(PointerEvent::at(100.0, 10.0));
    assert_eq!(grid.viewport().origin_col, 20);

    grid.pointer_up();
    grid.pointer_move(PointerEvent::at(400.0, 10.0));
    assert_eq!(grid.viewport().origin_col, 20);
}

#[test]
fn bars_only_count_once_drawn() {
    let mut grid = grid(GridOptions::default());
    grid.set_size(10, 100);
    // No frame yet, so the bottom strip is still cell area.
    grid.pointer_down(PointerEvent::at(250.0, 296.0));
    assert_eq!(grid.viewport().origin_col, 0);
}

#[test]
fn detached_grids_ignore_pointers() {
    let mut grid = grid(GridOptions::default());
    let commits = record_commits(&mut grid);
    grid.detach();
    grid.pointer_down(PointerEvent::at(60.0, 60.0));
    grid.pointer_move(PointerEvent::at(260.0, 110.0));
    grid.pointer_up();
    assert!(grid.selection().is_empty());
    assert!(commits.borrow().is_empty());
}
