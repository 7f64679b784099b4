//! Common test utilities: a recording drawing surface and host doubles.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use sheetgrid::render::{Surface, TextStyle};
use sheetgrid::types::{CellValue, GridId, GridOptions, TextAlign};
use sheetgrid::{Grid, HostElement, Rect};

// ============================================================================
// Recording surface
// ============================================================================

/// One drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetSize(u32, u32),
    Clear(Rect),
    Fill(Rect, String),
    Stroke(Vec<(f64, f64)>, String, f64),
    Font(String),
    Text {
        text: String,
        x: f64,
        y: f64,
        color: String,
        align: TextAlign,
    },
    Image(String, Rect),
}

/// Surface that records every call. Text is measured at `char_width` per
/// character.
#[derive(Debug)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    pub char_width: f64,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            char_width: 7.0,
        }
    }
}

impl RecordingSurface {
    pub fn fills(&self) -> Vec<(Rect, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill(rect, color) => Some((*rect, color.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn clears(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Clear(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn strokes(&self) -> Vec<(&[(f64, f64)], &str, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Stroke(points, color, width) => Some((points.as_slice(), color.as_str(), *width)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_op(&self, needle: &str) -> Option<&Op> {
        self.ops
            .iter()
            .find(|op| matches!(op, Op::Text { text, .. } if text == needle))
    }

    pub fn images(&self) -> Vec<(&str, Rect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Image(name, rect) => Some((name.as_str(), *rect)),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, pred: impl Fn(&Op) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }
}

#[allow(clippy::cast_precision_loss)]
impl Surface for RecordingSurface {
    type Image = String;

    fn set_size(&mut self, width: u32, height: u32) {
        self.ops.clear();
        self.ops.push(Op::SetSize(width, height));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(Op::Clear(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ops.push(Op::Fill(rect, color.to_string()));
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], color: &str, line_width: f64) {
        self.ops
            .push(Op::Stroke(points.to_vec(), color.to_string(), line_width));
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(Op::Font(font.to_string()));
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle<'_>) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            x,
            y,
            color: style.color.to_string(),
            align: style.align,
        });
    }

    fn draw_image(&mut self, image: &String, rect: Rect) {
        self.ops.push(Op::Image(image.clone(), rect));
    }
}

// ============================================================================
// Host double
// ============================================================================

/// Host with adjustable size and attachment.
#[derive(Debug, Clone)]
pub struct TestHost {
    pub size: Rc<Cell<(f64, f64)>>,
    pub ratio: Rc<Cell<f64>>,
    pub attached: Rc<Cell<bool>>,
    pub released: Rc<Cell<u32>>,
}

impl TestHost {
    pub fn new(width: f64, height: f64, ratio: f64) -> Self {
        Self {
            size: Rc::new(Cell::new((width, height))),
            ratio: Rc::new(Cell::new(ratio)),
            attached: Rc::new(Cell::new(true)),
            released: Rc::new(Cell::new(0)),
        }
    }
}

impl HostElement for TestHost {
    fn size(&self) -> (f64, f64) {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio.get()
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn release(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

// ============================================================================
// Builders
// ============================================================================

/// An attached grid on a `width` × `height` CSS-pixel host.
pub fn attached_grid(
    options: GridOptions,
    width: f64,
    height: f64,
    ratio: f64,
) -> (Grid<RecordingSurface>, TestHost) {
    let host = TestHost::new(width, height, ratio);
    let mut grid = Grid::new(GridId(1), options);
    grid.attach(RecordingSurface::default(), Box::new(host.clone()));
    (grid, host)
}

/// Cell provider backed by a map keyed by `(col, row)`.
pub fn provider(
    cells: HashMap<(String, u32), CellValue>,
) -> impl Fn(&str, &str, u32) -> Option<CellValue> {
    move |_tag: &str, col: &str, row: u32| cells.get(&(col.to_string(), row)).cloned()
}

/// Shorthand for a text cell.
pub fn text_cell(text: &str) -> CellValue {
    serde_json::from_value(serde_json::json!({ "v": text })).unwrap()
}
