use glyphon::{
    Attrs, Buffer as TextBuffer, Cache, Color as GlyphonColor, FontSystem, Metrics, Resolution,
    Shaping, Style, SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer as GlyphonRenderer,
    Viewport, Weight, Wrap,
};
use lightnvim_common::{CellSize, Color, FontDescriptor};
use lightnvim_terminal::{CellView, GridSnapshot};

use super::metrics::{base_attrs, measure_cell, CellMetrics};

/// A shaped row and the cells it was shaped from.
struct CachedRow {
    cells: Vec<CellView>,
    buffer: TextBuffer,
}

/// GPU text renderer backed by glyphon.
pub struct TextRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    _cache: Cache,
    atlas: TextAtlas,
    viewport: Viewport,
    renderer: GlyphonRenderer,
    font: FontDescriptor,
    metrics: CellMetrics,
    scale_factor: f64,
    rows: Vec<CachedRow>,
}

impl TextRenderer {
    /// Create a text renderer for `font`, using system fonts.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        font: FontDescriptor,
        scale_factor: f64,
    ) -> Self {
        let mut font_system = FontSystem::new();
        let cache = Cache::new(device);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let viewport = Viewport::new(device, &cache);
        let renderer =
            GlyphonRenderer::new(&mut atlas, device, wgpu::MultisampleState::default(), None);

        let metrics = measure_cell(&mut font_system, &font, scale_factor);
        tracing::info!(font = %font, cell = ?metrics.cell, "text renderer ready");

        Self {
            font_system,
            swash_cache: SwashCache::new(),
            _cache: cache,
            atlas,
            viewport,
            renderer,
            font,
            metrics,
            scale_factor,
            rows: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> CellSize {
        self.metrics.cell
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    /// Switch fonts and return the new cell size.
    pub fn set_font(&mut self, font: FontDescriptor) -> CellSize {
        self.font = font;
        self.remeasure()
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) -> CellSize {
        self.scale_factor = scale_factor;
        self.remeasure()
    }

    fn remeasure(&mut self) -> CellSize {
        self.metrics = measure_cell(&mut self.font_system, &self.font, self.scale_factor);
        self.rows.clear();
        tracing::debug!(font = %self.font, cell = ?self.metrics.cell, "font metrics updated");
        self.metrics.cell
    }

    /// Shape the visible rows of `snapshot`, reusing rows whose cells did not
    /// change, and upload the glyphs.
    ///
    /// `inverted` names the cell under a block cursor, whose glyph is drawn
    /// in the background color.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare_grid(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        snapshot: &GridSnapshot,
        left: f32,
        top: f32,
        viewport_width: u32,
        viewport_height: u32,
        inverted: Option<(usize, usize)>,
    ) {
        self.viewport.update(
            queue,
            Resolution {
                width: viewport_width,
                height: viewport_height,
            },
        );
        self.atlas.trim();

        let metrics = Metrics::new(self.metrics.font_px, self.metrics.line_height);
        let row_width = snapshot.columns as f32 * self.metrics.cell.width as f32;
        self.rows.truncate(snapshot.lines);

        for (line, row) in snapshot.rows.iter().enumerate() {
            let mut cells = row.clone();
            if let Some((cursor_line, cursor_column)) = inverted {
                if cursor_line == line {
                    if let Some(cell) = cells.iter_mut().find(|c| c.column == cursor_column) {
                        cell.fg = snapshot.background;
                    }
                }
            }

            if self.rows.get(line).is_some_and(|cached| cached.cells == cells) {
                continue;
            }

            let mut buffer = TextBuffer::new(&mut self.font_system, metrics);
            buffer.set_wrap(&mut self.font_system, Wrap::None);
            buffer.set_size(
                &mut self.font_system,
                Some(row_width),
                Some(self.metrics.line_height),
            );

            let base = base_attrs(&self.font);
            let (text, spans) = row_spans(&cells);
            if spans.is_empty() {
                buffer.set_text(&mut self.font_system, " ", base, Shaping::Advanced);
            } else {
                let rich: Vec<(&str, Attrs)> = spans
                    .iter()
                    .map(|span| (&text[span.start..span.end], span_attrs(base, span)))
                    .collect();
                buffer.set_rich_text(&mut self.font_system, rich, base, Shaping::Advanced);
            }
            buffer.shape_until_scroll(&mut self.font_system, false);

            let shaped = CachedRow { cells, buffer };
            if line < self.rows.len() {
                self.rows[line] = shaped;
            } else {
                self.rows.push(shaped);
            }
        }

        let line_height = self.metrics.cell.height as f32;
        let bounds = TextBounds {
            left: 0,
            top: 0,
            right: viewport_width as i32,
            bottom: viewport_height as i32,
        };
        let text_areas = self.rows.iter().enumerate().map(|(line, row)| TextArea {
            buffer: &row.buffer,
            left,
            top: top + line as f32 * line_height,
            scale: 1.0,
            bounds,
            default_color: glyph_color(snapshot.background),
            custom_glyphs: &[],
        });

        self.renderer
            .prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                text_areas,
                &mut self.swash_cache,
            )
            .unwrap_or_else(|e| {
                tracing::warn!("glyphon prepare error: {:?}", e);
            });
    }

    /// Render the previously prepared text into the given render pass.
    pub fn render<'pass>(&'pass self, pass: &mut wgpu::RenderPass<'pass>) {
        self.renderer
            .render(&self.atlas, &self.viewport, pass)
            .unwrap_or_else(|e| {
                tracing::warn!("glyphon render error: {:?}", e);
            });
    }
}

/// A byte range of a row's text sharing one color and style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

/// Concatenate a row's characters and split them into uniform spans.
pub(crate) fn row_spans(cells: &[CellView]) -> (String, Vec<Span>) {
    let mut text = String::with_capacity(cells.len());
    let mut spans: Vec<Span> = Vec::new();

    for cell in cells {
        let start = text.len();
        text.push(cell.c);
        match spans.last_mut() {
            Some(span)
                if span.color == cell.fg && span.bold == cell.bold && span.italic == cell.italic =>
            {
                span.end = text.len();
            }
            _ => spans.push(Span {
                start,
                end: text.len(),
                color: cell.fg,
                bold: cell.bold,
                italic: cell.italic,
            }),
        }
    }

    (text, spans)
}

fn span_attrs<'a>(base: Attrs<'a>, span: &Span) -> Attrs<'a> {
    let attrs = base.color(glyph_color(span.color));
    let attrs = if span.bold {
        attrs.weight(Weight::BOLD)
    } else {
        attrs
    };
    if span.italic {
        attrs.style(Style::Italic)
    } else {
        attrs
    }
}

fn glyph_color(color: Color) -> GlyphonColor {
    GlyphonColor::rgba(color.r, color.g, color.b, color.a)
}
