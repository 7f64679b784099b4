//! Drawing surface abstraction.
//!
//! The pipeline draws through the `Surface` trait so the same frame logic
//! runs against a Canvas 2D context in the browser and against recording
//! doubles in tests and benchmarks.

use crate::layout::{GridViewport, Rect, VisibleLayout};
use crate::types::{GridOptions, Selection, TextAlign};

/// Vertical anchor for `fill_text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Bottom,
}

impl TextBaseline {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetic => "alphabetic",
            Self::Bottom => "bottom",
        }
    }
}

/// Fill parameters for one text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle<'a> {
    pub color: &'a str,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// A 2D pixel surface the grid can paint on.
pub trait Surface {
    /// Decoded image handle drawable on this surface.
    type Image;

    /// Set the backing store size in device pixels. Also resets any state
    /// the surface carries between frames.
    fn set_size(&mut self, width: u32, height: u32);

    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: &str);

    /// Stroke an open polyline through `points`.
    fn stroke_path(&mut self, points: &[(f64, f64)], color: &str, line_width: f64);

    /// Set the font used by subsequent `measure_text` and `fill_text` calls.
    fn set_font(&mut self, font: &str);

    /// Advance width of `text` in device pixels under the current font.
    fn measure_text(&mut self, text: &str) -> f64;

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle<'_>);

    fn draw_image(&mut self, image: &Self::Image, rect: Rect);
}

/// Per-frame inputs to the pipeline.
pub struct RenderParams<'a> {
    pub viewport: &'a GridViewport,
    pub layout: &'a VisibleLayout,
    pub selection: &'a Selection,
    pub options: &'a GridOptions,
}
