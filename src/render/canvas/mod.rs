//! Canvas 2D surface.
//!
//! Draws the grid through `CanvasRenderingContext2d` via web-sys. Text
//! widths are cached per font because truncation measures the same strings
//! repeatedly.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use super::backend::{Surface, TextStyle};
use super::cache::LruCache;
use crate::error::{Result, SheetgridError};
use crate::layout::Rect;

/// Max cached text measurements.
const TEXT_MEASURE_CACHE_CAP: usize = 4096;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    font: String,
    text_measure_cache: LruCache<String, f64>,
}

impl CanvasSurface {
    /// Wrap an existing canvas element.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| SheetgridError::Surface("Failed to get 2d context".to_string()))?
            .ok_or_else(|| SheetgridError::Surface("No 2d context available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| {
                SheetgridError::Surface("Failed to cast to CanvasRenderingContext2d".to_string())
            })?;
        ctx.set_image_smoothing_enabled(false);

        Ok(Self {
            canvas,
            ctx,
            font: String::new(),
            text_measure_cache: LruCache::new(TEXT_MEASURE_CACHE_CAP),
        })
    }

    /// Create a canvas that fills its (positioned) holder.
    pub fn create(document: &Document) -> Result<Self> {
        let canvas = document
            .create_element("canvas")
            .map_err(|_| SheetgridError::Surface("Failed to create canvas".to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SheetgridError::Surface("Element is not a canvas".to_string()))?;
        let style = canvas.style();
        for (name, value) in [
            ("image-rendering", "pixelated"),
            ("width", "100%"),
            ("height", "100%"),
            ("position", "absolute"),
        ] {
            style
                .set_property(name, value)
                .map_err(|_| SheetgridError::Surface(format!("Failed to set {name}")))?;
        }
        Self::new(canvas)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn measure_uncached(&self, text: &str) -> f64 {
        self.ctx
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or(0.0)
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn set_size(&mut self, width: u32, height: u32) {
        // Assigning the size resets the context, so do it every frame like a fresh canvas.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.ctx.set_image_smoothing_enabled(false);
        self.font.clear();
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ctx.clear_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], color: &str, line_width: f64) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_line_width(line_width);
        self.ctx.set_stroke_style_str(color);
        self.ctx.begin_path();
        self.ctx.move_to(*x0, *y0);
        for (x, y) in rest {
            self.ctx.line_to(*x, *y);
        }
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        if self.font != font {
            self.ctx.set_font(font);
            self.font = font.to_string();
        }
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        let key = format!("{}\n{}", self.font, text);
        if let Some(width) = self.text_measure_cache.get(&key) {
            return *width;
        }
        let width = self.measure_uncached(text);
        self.text_measure_cache.insert(key, width);
        width
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle<'_>) {
        self.ctx.set_fill_style_str(style.color);
        self.ctx.set_text_align(style.align.as_str());
        self.ctx.set_text_baseline(style.baseline.as_str());
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn draw_image(&mut self, image: &HtmlImageElement, rect: Rect) {
        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
        );
    }
}
