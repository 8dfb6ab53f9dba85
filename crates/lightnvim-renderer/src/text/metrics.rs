use glyphon::{Attrs, Buffer as TextBuffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use lightnvim_common::{CellSize, FontDescriptor};

/// Typographic points per inch.
const POINTS_PER_INCH: f32 = 72.0;
/// Logical pixels per inch.
const LOGICAL_DPI: f32 = 96.0;
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;
const DEFAULT_POINTS: f32 = 11.0;

/// Font geometry after fitting glyphs to whole-pixel cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell: CellSize,
    /// Font size in physical pixels, adjusted so one advance equals one cell.
    pub font_px: f32,
    pub line_height: f32,
}

/// Point size to physical pixels at 96 dpi.
pub fn points_to_pixels(points: f32, scale_factor: f64) -> f32 {
    points * LOGICAL_DPI / POINTS_PER_INCH * scale_factor as f32
}

/// Map CSS-style generic names onto glyphon families.
pub fn family_for(name: &str) -> Family<'_> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "monospace" | "mono" => Family::Monospace,
        "serif" => Family::Serif,
        "sans" | "sans-serif" | "sans serif" => Family::SansSerif,
        _ => Family::Name(name.trim()),
    }
}

pub fn base_attrs(font: &FontDescriptor) -> Attrs<'_> {
    let attrs = Attrs::new().family(family_for(&font.family));
    let attrs = if font.is_bold() {
        attrs.weight(Weight::BOLD)
    } else {
        attrs
    };
    if font.is_italic() {
        attrs.style(Style::Italic)
    } else {
        attrs
    }
}

/// Scale the font so its advance lands on a whole pixel.
///
/// Rows are shaped as runs of text, so any fractional advance would drift
/// away from the cell grid across a line.
pub fn fit_to_cell(font_px: f32, advance: f32) -> CellMetrics {
    let line_height = (font_px * LINE_HEIGHT).round().max(1.0);
    let (width, fitted_px) = if advance.is_finite() && advance > 0.0 {
        let width = advance.round().max(1.0);
        (width, font_px * width / advance)
    } else {
        // No glyph to measure; assume the usual monospace proportion.
        ((font_px * 0.6).round().max(1.0), font_px)
    };

    CellMetrics {
        cell: CellSize::new(width as u32, line_height as u32),
        font_px: fitted_px,
        line_height,
    }
}

/// Measure the advance of 'M' in `font` and fit the cell grid to it.
pub(crate) fn measure_cell(
    font_system: &mut FontSystem,
    font: &FontDescriptor,
    scale_factor: f64,
) -> CellMetrics {
    let font_px = points_to_pixels(font.size.unwrap_or(DEFAULT_POINTS), scale_factor);
    let metrics = Metrics::new(font_px, font_px * LINE_HEIGHT);
    let mut buffer = TextBuffer::new(font_system, metrics);
    buffer.set_size(font_system, Some(font_px * 10.0), Some(font_px * LINE_HEIGHT * 2.0));
    buffer.set_text(font_system, "M", base_attrs(font), Shaping::Advanced);
    buffer.shape_until_scroll(font_system, false);

    let advance = buffer
        .layout_runs()
        .next()
        .and_then(|run| run.glyphs.first().map(|glyph| glyph.w))
        .unwrap_or(0.0);

    fit_to_cell(font_px, advance)
}
