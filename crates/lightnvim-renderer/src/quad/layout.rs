//! Quads for cell backgrounds and the cursor.

use lightnvim_common::{CellSize, Color, Padding};
use lightnvim_terminal::{CursorShape, CursorView, GridSnapshot};

use super::types::CellQuad;
use crate::gpu::surface_color;

/// Where the grid sits in the window, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub left: f32,
    pub top: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Linearize colors for an sRGB surface.
    pub srgb: bool,
}

impl GridLayout {
    pub fn new(padding: Padding, cell: CellSize, srgb: bool) -> Self {
        Self {
            left: padding.left as f32,
            top: padding.top as f32,
            cell_width: cell.width as f32,
            cell_height: cell.height as f32,
            srgb,
        }
    }

    /// A slice of cell `(line, column)`, in pixels from its top-left corner.
    fn quad(
        &self,
        line: usize,
        column: usize,
        offset: [f32; 2],
        size: [f32; 2],
        color: Color,
    ) -> CellQuad {
        CellQuad {
            cell: [column as f32, line as f32],
            offset,
            size,
            color: surface_color(color, self.srgb),
        }
    }

    /// `span` whole cells starting at `(line, column)`.
    fn run(&self, line: usize, column: usize, span: usize, color: Color) -> CellQuad {
        let size = [span as f32 * self.cell_width, self.cell_height];
        self.quad(line, column, [0.0, 0.0], size, color)
    }
}

/// One quad per horizontal run of cells sharing a non-default background.
pub fn grid_quads(snapshot: &GridSnapshot, layout: &GridLayout) -> Vec<CellQuad> {
    let mut quads = Vec::new();

    for (line, row) in snapshot.rows.iter().enumerate() {
        // (start column, end column exclusive, color)
        let mut run: Option<(usize, usize, Color)> = None;

        for cell in row {
            let end = cell.column + if cell.wide { 2 } else { 1 };
            if cell.bg == snapshot.background {
                if let Some((start, stop, color)) = run.take() {
                    quads.push(layout.run(line, start, stop - start, color));
                }
                continue;
            }
            run = match run {
                Some((start, stop, color)) if stop == cell.column && color == cell.bg => {
                    Some((start, end, color))
                }
                Some((start, stop, color)) => {
                    quads.push(layout.run(line, start, stop - start, color));
                    Some((cell.column, end, cell.bg))
                }
                None => Some((cell.column, end, cell.bg)),
            };
        }

        if let Some((start, stop, color)) = run {
            quads.push(layout.run(line, start, stop - start, color));
        }
    }

    quads
}

/// The cursor's rectangles. Beam width and underline height are
/// `aspect_ratio` of the cell, at least one pixel.
pub fn cursor_quads(cursor: &CursorView, layout: &GridLayout, aspect_ratio: f32) -> Vec<CellQuad> {
    let (w, h) = (layout.cell_width, layout.cell_height);
    let thin = |extent: f32| (extent * aspect_ratio).round().max(1.0);
    // (offset, size) within the cursor cell
    let slices = match cursor.shape {
        CursorShape::Block => vec![([0.0, 0.0], [w, h])],
        CursorShape::Beam => vec![([0.0, 0.0], [thin(w), h])],
        CursorShape::Underline => {
            let t = thin(h);
            vec![([0.0, h - t], [w, t])]
        }
        CursorShape::HollowBlock => vec![
            ([0.0, 0.0], [w, 1.0]),
            ([0.0, h - 1.0], [w, 1.0]),
            ([0.0, 0.0], [1.0, h]),
            ([w - 1.0, 0.0], [1.0, h]),
        ],
    };
    slices
        .into_iter()
        .map(|(offset, size)| layout.quad(cursor.line, cursor.column, offset, size, cursor.color))
        .collect()
}
