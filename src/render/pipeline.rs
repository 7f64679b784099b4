//! One full frame: chrome, cells, selection and scrollbars.
//!
//! Paint order matters: the selection fill sits under the headers and cell
//! content, the outline and scrollbars sit on top.

use super::backend::{RenderParams, Surface, TextBaseline, TextStyle};
use super::cache::{ImageCache, ImageLookup};
use super::colors::{is_usable_background, is_usable_text_color, palette, theme_fill};
use super::scrollbar::{compute_scrollbars, Scrollbars};
use super::selection::selection_geometry;
use super::text::{cell_font, text_x, truncate_to_fit};
use crate::cell_ref::col_label;
use crate::layout::{Rect, COL_HEADER_HEIGHT, ROW_HEADER_WIDTH};
use crate::listeners::CellValueProvider;
use crate::numfmt::cell_text;
use crate::types::{GridId, SelectionMode, TextAlign};

/// Fill opacity of the selection in default mode.
const SELECTION_ALPHA: f64 = 0.05;

/// Fill opacity of the selection in row mode.
const ROW_SELECTION_ALPHA: f64 = 0.15;

/// A visible cell queued for content lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDescriptor {
    pub col: u32,
    pub row: u32,
    pub rect: Rect,
}

/// What a frame produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub visible_columns: u32,
    pub visible_rows: u32,
    pub cells_painted: usize,
    pub scrollbars: Scrollbars,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_size(v: f64) -> u32 {
    v.max(0.0).min(f64::from(u32::MAX)) as u32
}

/// Paint one frame for `grid`.
///
/// `descriptors` is scratch space reused across frames; it holds the visible
/// cells collected during the chrome pass.
pub fn render_frame<S: Surface>(
    surface: &mut S,
    params: &RenderParams<'_>,
    provider: Option<&dyn CellValueProvider>,
    images: &mut ImageCache<S::Image>,
    grid: GridId,
    descriptors: &mut Vec<CellDescriptor>,
) -> FrameStats {
    let vp = params.viewport;
    let layout = params.layout;
    let options = params.options;
    let scale = vp.scale;
    let text_color = options.default_text_color();
    let header_font = cell_font(false, scale, &options.def_font);
    let label_style = TextStyle {
        color: text_color,
        align: TextAlign::Center,
        baseline: TextBaseline::Alphabetic,
    };

    surface.set_size(device_size(vp.width), device_size(vp.height));
    surface.clear_rect(Rect::new(0.0, 0.0, vp.width, vp.height));

    let selection = selection_geometry(params.selection, layout, options.sel_mode, vp.width);
    if let Some(geo) = &selection {
        let alpha = match options.sel_mode {
            SelectionMode::Default => SELECTION_ALPHA,
            SelectionMode::Row => ROW_SELECTION_ALPHA,
        };
        surface.fill_rect(geo.area, &theme_fill(&options.theme, alpha));
    }

    if options.col_headers {
        surface.fill_rect(
            Rect::new(0.0, 0.0, vp.width, COL_HEADER_HEIGHT * scale),
            palette::HEADER_FILL,
        );
    }
    if options.row_headers {
        surface.fill_rect(
            Rect::new(
                0.0,
                (COL_HEADER_HEIGHT + 1.0) * scale,
                ROW_HEADER_WIDTH * scale,
                vp.height - COL_HEADER_HEIGHT * scale,
            ),
            palette::HEADER_FILL,
        );
    }
    if options.col_headers {
        let y = (COL_HEADER_HEIGHT * scale).floor() + 0.5;
        surface.stroke_path(&[(0.0, y), (vp.width, y)], palette::GRID_LINE, scale);
    }
    if options.row_headers {
        let x = (ROW_HEADER_WIDTH * scale).floor() + 0.5;
        surface.stroke_path(&[(x, 0.0), (x, vp.height)], palette::GRID_LINE, scale);
    }

    surface.set_font(&header_font);
    for col in &layout.columns {
        if options.col_headers {
            let x = (col.line + col.size / 2.0).floor() - col.size;
            surface.fill_text(&col_label(col.index), x, 18.0 * scale, label_style);
        }
        if options.gridlines {
            surface.stroke_path(
                &[(col.line, 0.0), (col.line, vp.height)],
                palette::GRID_LINE,
                scale,
            );
        }
    }
    for row in &layout.rows {
        if options.row_headers {
            let y = row.line - (row.size / 2.0).floor() + 6.0 * scale;
            surface.fill_text(&row.index.to_string(), 18.0 * scale, y, label_style);
        }
        if options.gridlines {
            surface.stroke_path(
                &[(0.0, row.line), (vp.width, row.line)],
                palette::GRID_LINE,
                scale,
            );
        }
    }

    descriptors.clear();
    if provider.is_some() {
        for col in &layout.columns {
            for row in &layout.rows {
                descriptors.push(CellDescriptor {
                    col: col.index,
                    row: row.index,
                    rect: Rect::new(col.start, row.start, col.size, row.size),
                });
            }
        }
    }

    let mut cells_painted = 0;
    if let Some(provider) = provider {
        for cell in descriptors.iter() {
            if paint_cell(surface, params, provider, images, grid, cell) {
                cells_painted += 1;
            }
        }
    }

    if let (Some(geo), SelectionMode::Default) = (&selection, options.sel_mode) {
        surface.stroke_path(&geo.outline(), &options.theme, scale);
        surface.stroke_path(&geo.anchor_outline(), &options.theme, scale * 2.0);
    }

    let scrollbars = compute_scrollbars(vp, layout);
    for bar in [scrollbars.vertical, scrollbars.horizontal].into_iter().flatten() {
        surface.fill_rect(bar.track, palette::SCROLLBAR_TRACK);
        surface.fill_rect(bar.thumb, &options.theme);
    }

    let stats = FrameStats {
        visible_columns: layout.visible_columns(),
        visible_rows: layout.visible_rows(),
        cells_painted,
        scrollbars,
    };
    tracing::trace!(
        %grid,
        columns = stats.visible_columns,
        rows = stats.visible_rows,
        cells = stats.cells_painted,
        "frame rendered"
    );
    stats
}

/// Paint one cell. Returns false when the provider had nothing for it.
fn paint_cell<S: Surface>(
    surface: &mut S,
    params: &RenderParams<'_>,
    provider: &dyn CellValueProvider,
    images: &mut ImageCache<S::Image>,
    grid: GridId,
    cell: &CellDescriptor,
) -> bool {
    let vp = params.viewport;
    let options = params.options;
    let scale = vp.scale;
    let label = col_label(cell.col);

    let Some(value) = provider.cell_value(&options.tag, &label, cell.row) else {
        return false;
    };

    let mut rect = cell.rect;
    for c in cell.col.saturating_add(1)..cell.col.saturating_add(value.col_span) {
        rect.width += vp.col_width(c).floor();
    }
    for r in cell.row.saturating_add(1)..cell.row.saturating_add(value.row_span) {
        rect.height += vp.row_height(r).floor();
    }
    let inset = rect.inset(scale);

    if value.is_merged() {
        surface.clear_rect(inset);
    }

    if let Some(bg) = value.background_color.as_deref() {
        if is_usable_background(bg) {
            surface.fill_rect(inset, bg);
        }
    }

    if let Some(url) = value.image_url.as_deref() {
        if let ImageLookup::Ready(image) = images.lookup(url, grid) {
            let target = Rect::new(inset.x, inset.y, inset.width.floor(), inset.height.floor());
            surface.draw_image(image, target);
        }
    }

    if let Some(text) = cell_text(&value, &options.currency_code) {
        surface.set_font(&cell_font(value.bold, scale, &options.def_font));
        let color = value
            .text_color
            .as_deref()
            .filter(|c| is_usable_text_color(c))
            .unwrap_or(options.default_text_color());
        let align = value.text_align();
        if rect.width > 0.0 {
            let fitted = truncate_to_fit(&text, rect.width, |t| surface.measure_text(t));
            surface.fill_text(
                &fitted,
                text_x(align, rect.x, rect.width),
                (rect.y + rect.height).floor(),
                TextStyle {
                    color,
                    align,
                    baseline: TextBaseline::Bottom,
                },
            );
        }
    }

    true
}
