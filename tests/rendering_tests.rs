//! Frame pipeline tests against a recording surface.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use common::{attached_grid, provider, text_cell, Op, RecordingSurface};
use sheetgrid::render::palette;
use sheetgrid::types::{CellAddr, CellAlignment, CellFormat, CellValue, Selection, SelectionMode};
use sheetgrid::{Grid, GridOptions, ImageCache, Rect, TextAlign};

fn grid_with(
    options: GridOptions,
    cells: Vec<((&str, u32), CellValue)>,
) -> Grid<RecordingSurface> {
    let (mut grid, _host) = attached_grid(options, 500.0, 300.0, 1.0);
    grid.set_size(10, 5);
    let cells: HashMap<(String, u32), CellValue> = cells
        .into_iter()
        .map(|((col, row), value)| ((col.to_string(), row), value))
        .collect();
    grid.set_cell_value_provider(Some(Box::new(provider(cells))));
    grid
}

fn render(grid: &mut Grid<RecordingSurface>) -> &RecordingSurface {
    let mut images = ImageCache::default();
    grid.render(&mut images).expect("frame");
    grid.surface().unwrap()
}

#[test]
fn frame_starts_by_sizing_and_clearing() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    let surface = render(&mut grid);
    assert_eq!(surface.ops[0], Op::SetSize(500, 300));
    assert_eq!(surface.ops[1], Op::Clear(Rect::new(0.0, 0.0, 500.0, 300.0)));
}

#[test]
fn clean_grids_skip_frames() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    let mut images = ImageCache::default();
    assert!(grid.render(&mut images).is_some());
    assert!(!grid.is_dirty());
    assert!(grid.render(&mut images).is_none());
    grid.data_changed();
    assert!(grid.render(&mut images).is_some());
}

#[test]
fn data_changed_repaints_with_fresh_provider_values() {
    let (mut grid, _host) = attached_grid(GridOptions::default(), 500.0, 300.0, 1.0);
    grid.set_size(10, 5);
    let status = Rc::new(RefCell::new("pending".to_string()));
    let source = Rc::clone(&status);
    grid.set_cell_value_provider(Some(Box::new(
        move |_: &str, col: &str, row: u32| -> Option<CellValue> {
            (col == "B" && row == 2).then(|| text_cell(&source.borrow()))
        },
    )));

    let mut images = ImageCache::default();
    grid.render(&mut images).unwrap();
    assert!(grid.surface().unwrap().texts().contains(&"pending"));

    *status.borrow_mut() = "shipped".to_string();
    assert!(grid.render(&mut images).is_none());

    grid.data_changed();
    grid.render(&mut images).unwrap();
    let texts = grid.surface().unwrap().texts();
    assert!(texts.contains(&"shipped"));
    assert!(!texts.contains(&"pending"));
}

#[test]
fn header_bands_separators_and_labels() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    let surface = render(&mut grid);

    let fills = surface.fills();
    assert!(fills.contains(&(Rect::new(0.0, 0.0, 500.0, 24.0), palette::HEADER_FILL)));
    assert!(fills.contains(&(Rect::new(0.0, 25.0, 36.0, 276.0), palette::HEADER_FILL)));

    let strokes = surface.strokes();
    assert!(strokes.contains(&(&[(0.0, 24.5), (500.0, 24.5)][..], palette::GRID_LINE, 1.0)));
    assert!(strokes.contains(&(&[(36.5, 0.0), (36.5, 300.0)][..], palette::GRID_LINE, 1.0)));

    let texts = surface.texts();
    for label in ["A", "B", "C", "D", "E", "0", "1", "10"] {
        assert!(texts.contains(&label), "missing {label}");
    }
    assert!(!texts.contains(&"F"));

    match surface.text_op("A").unwrap() {
        Op::Text { x, y, align, .. } => {
            assert_eq!((*x, *y), (87.0, 18.0));
            assert_eq!(*align, TextAlign::Center);
        }
        other => panic!("unexpected {other:?}"),
    }
    match surface.text_op("0").unwrap() {
        Op::Text { x, y, .. } => assert_eq!((*x, *y), (18.0, 43.5)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn disabled_chrome_is_not_painted() {
    let options = GridOptions {
        gridlines: false,
        row_headers: false,
        col_headers: false,
        ..GridOptions::default()
    };
    let mut grid = grid_with(options, vec![]);
    let surface = render(&mut grid);
    assert!(surface.strokes().is_empty());
    assert!(surface.fills().is_empty());
    assert!(surface.texts().is_empty());
}

#[test]
fn gridlines_sit_on_span_lines() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    let surface = render(&mut grid);
    let strokes = surface.strokes();
    assert!(strokes.contains(&(&[(137.5, 0.0), (137.5, 300.0)][..], palette::GRID_LINE, 1.0)));
    assert!(strokes.contains(&(&[(0.0, 49.5), (500.0, 49.5)][..], palette::GRID_LINE, 1.0)));
}

#[test]
fn col_span_widens_cell_and_clears_interior_lines() {
    let merged = CellValue {
        background_color: Some("#ff0000".to_string()),
        col_span: 3,
        ..CellValue::text("wide")
    };
    let mut grid = grid_with(GridOptions::default(), vec![(("A", 0), merged)]);
    let surface = render(&mut grid);

    let inset = Rect::new(38.0, 26.0, 298.0, 22.0);
    assert!(surface.clears().contains(&inset));
    assert!(surface.fills().contains(&(inset, "#ff0000")));

    let last_line = surface
        .ops
        .iter()
        .rposition(|op| matches!(op, Op::Stroke(_, c, _) if c == palette::GRID_LINE))
        .unwrap();
    let clear = surface.position(|op| *op == Op::Clear(inset)).unwrap();
    assert!(clear > last_line);
}

#[test]
fn row_span_grows_downward() {
    let merged = CellValue {
        background_color: Some("rgb(0, 128, 0)".to_string()),
        row_span: 2,
        ..CellValue::default()
    };
    let mut grid = grid_with(GridOptions::default(), vec![(("B", 1), merged)]);
    let surface = render(&mut grid);
    assert!(surface
        .fills()
        .contains(&(Rect::new(138.0, 50.0, 98.0, 46.0), "rgb(0, 128, 0)")));
}

#[test]
fn unusable_backgrounds_are_ignored() {
    let cell = CellValue {
        background_color: Some("red".to_string()),
        ..CellValue::text("x")
    };
    let mut grid = grid_with(GridOptions::default(), vec![(("A", 0), cell)]);
    let surface = render(&mut grid);
    assert!(!surface.fills().iter().any(|(_, c)| *c == "red"));
}

#[test]
fn currency_cells_are_formatted() {
    let cell = CellValue::number(1234.5, CellFormat::Currency);
    let mut grid = grid_with(GridOptions::default(), vec![(("A", 0), cell)]);
    let surface = render(&mut grid);

    assert!(!surface.texts().contains(&"1234.5"));
    match surface.text_op("$1,234.50").expect("formatted text") {
        Op::Text { x, y, align, .. } => {
            assert_eq!(*align, TextAlign::Right);
            assert_eq!((*x, *y), (137.0, 49.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn currency_code_option_is_used() {
    let options = GridOptions {
        currency_code: "EUR".to_string(),
        ..GridOptions::default()
    };
    let cell = CellValue::number(-2.5, CellFormat::Currency);
    let mut grid = grid_with(options, vec![(("B", 2), cell)]);
    let surface = render(&mut grid);
    assert!(surface.texts().contains(&"-€2.50"));
}

#[test]
fn long_text_is_truncated_to_the_cell() {
    // 7px per character, 100px cell: 14 characters fit.
    let cell = CellValue::text("ABCDEFGHIJKLMNOPQRST");
    let mut grid = grid_with(GridOptions::default(), vec![(("C", 3), cell)]);
    let surface = render(&mut grid);
    assert!(surface.texts().contains(&"ABCDEFGHIJKLMN"));
    assert!(!surface.texts().contains(&"ABCDEFGHIJKLMNOPQRST"));
}

#[test]
fn alignment_and_bold() {
    let cell = CellValue {
        alignment: CellAlignment::Center,
        bold: true,
        ..CellValue::text("mid")
    };
    let mut grid = grid_with(GridOptions::default(), vec![(("A", 0), cell)]);
    let surface = render(&mut grid);

    let font = surface.position(|op| *op == Op::Font("bold 12px Arial".to_string()));
    let text = surface.position(|op| matches!(op, Op::Text { text, .. } if text == "mid"));
    assert!(font.unwrap() < text.unwrap());
    match surface.text_op("mid").unwrap() {
        Op::Text { x, align, .. } => {
            assert_eq!(*align, TextAlign::Center);
            assert_eq!(*x, 87.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn text_colors() {
    let red = CellValue {
        text_color: Some("#ff0000".to_string()),
        ..CellValue::text("red")
    };
    let named = CellValue {
        text_color: Some("blue".to_string()),
        ..CellValue::text("named")
    };
    let mut grid = grid_with(
        GridOptions::default(),
        vec![(("A", 0), red), (("A", 1), named)],
    );
    let surface = render(&mut grid);
    let color_of = |needle: &str| match surface.text_op(needle).unwrap() {
        Op::Text { color, .. } => color.clone(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(color_of("red"), "#ff0000");
    assert_eq!(color_of("named"), palette::TEXT_LIGHT);
}

#[test]
fn dark_mode_switches_default_text_color() {
    let options = GridOptions {
        dark_mode: true,
        ..GridOptions::default()
    };
    let mut grid = grid_with(options, vec![(("A", 0), CellValue::text("hi"))]);
    let surface = render(&mut grid);
    match surface.text_op("hi").unwrap() {
        Op::Text { color, .. } => assert_eq!(color, palette::TEXT_DARK),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn empty_and_missing_cells_draw_no_text() {
    let cells = vec![
        (("A", 0), CellValue::text("")),
        (("B", 0), CellValue::number(0.0, CellFormat::Number)),
    ];
    let mut grid = grid_with(GridOptions::default(), cells);
    let mut images = ImageCache::default();
    let stats = grid.render(&mut images).unwrap();
    assert_eq!(stats.cells_painted, 2);
    let texts = grid.surface().unwrap().texts();
    assert!(!texts.contains(&""));
    assert_eq!(texts.iter().filter(|t| **t == "0").count(), 2);
}

#[test]
fn provider_is_asked_for_every_visible_cell() {
    let (mut grid, _host) = attached_grid(GridOptions::default(), 500.0, 300.0, 1.0);
    grid.set_size(10, 5);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    grid.set_cell_value_provider(Some(Box::new(move |tag: &str, _: &str, _: u32| -> Option<CellValue> {
        assert_eq!(tag, "worksheet tag");
        counter.set(counter.get() + 1);
        None
    })));
    let mut images = ImageCache::default();
    let stats = grid.render(&mut images).unwrap();
    assert_eq!(calls.get(), 5 * 11);
    assert_eq!(stats.cells_painted, 0);
}

#[test]
fn selection_fill_and_outline_in_default_mode() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    grid.set_selection(Some(Selection::range(
        CellAddr::new("A", 1),
        CellAddr::new("B", 2),
    )));
    let surface = render(&mut grid);

    let area = Rect::new(37.0, 49.0, 200.0, 48.0);
    assert!(surface.fills().contains(&(area, "rgba(33,150,243, 0.05)")));
    // Fill goes under the header bands.
    let fill = surface
        .position(|op| *op == Op::Fill(area, "rgba(33,150,243, 0.05)".to_string()))
        .unwrap();
    let band = surface
        .position(|op| matches!(op, Op::Fill(_, c) if c == palette::HEADER_FILL))
        .unwrap();
    assert!(fill < band);

    let theme_strokes: Vec<f64> = surface
        .strokes()
        .iter()
        .filter(|(_, c, _)| *c == "#2196F3")
        .map(|(_, _, w)| *w)
        .collect();
    assert_eq!(theme_strokes, vec![1.0, 2.0]);
}

#[test]
fn row_mode_fills_to_the_edge_without_outline() {
    let options = GridOptions {
        sel_mode: SelectionMode::Row,
        ..GridOptions::default()
    };
    let mut grid = grid_with(options, vec![]);
    grid.set_selection(Some(Selection::range(
        CellAddr::new("A", 1),
        CellAddr::new("E", 1),
    )));
    let surface = render(&mut grid);
    assert!(surface
        .fills()
        .contains(&(Rect::new(37.0, 49.0, 463.0, 24.0), "rgba(33,150,243, 0.15)")));
    assert!(!surface.strokes().iter().any(|(_, c, _)| *c == "#2196F3"));
}

#[test]
fn selection_without_live_endpoint_uses_anchor() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    grid.set_selection(Some(Selection {
        start: Some(CellAddr::new("C", 2)),
        end: None,
        tmp: None,
    }));
    assert_eq!(grid.selection().tmp, Some(CellAddr::new("C", 2)));
    let surface = render(&mut grid);
    assert!(surface.fills().contains(&(
        Rect::new(237.0, 73.0, 100.0, 24.0),
        "rgba(33,150,243, 0.05)"
    )));

    grid.set_selection(None);
    assert!(grid.selection().is_empty());
}

#[test]
fn scrollbars_paint_track_then_thumb() {
    let mut grid = grid_with(GridOptions::default(), vec![]);
    grid.set_size(1000, 5);
    let surface = render(&mut grid);
    let fills = surface.fills();
    let track = fills
        .iter()
        .position(|(r, c)| *c == palette::SCROLLBAR_TRACK && *r == Rect::new(492.0, 0.0, 8.0, 300.0))
        .unwrap();
    let thumb = fills
        .iter()
        .position(|(r, c)| *c == "#2196F3" && r.x == 492.0)
        .unwrap();
    assert!(track < thumb);
    // 12 of 1000 rows visible: thumb clamps to the minimum length.
    assert_eq!(fills[thumb].0.height, 48.0);
    assert_eq!(grid.scrollbars().vertical.unwrap().thumb.height, 48.0);
}
