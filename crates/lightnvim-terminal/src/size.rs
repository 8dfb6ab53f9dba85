//! Grid geometry implementing alacritty_terminal's `Dimensions` trait.
//!
//! @module terminal/size

use alacritty_terminal::event::WindowSize;
use alacritty_terminal::grid::Dimensions;
use lightnvim_common::{CellSize, Padding, PixelSize};

// =============================================================================
// SIZE INFO
// =============================================================================

/// Terminal dimensions in both pixel and cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeInfo {
    /// Pixel area the terminal occupies, padding included.
    pub area: PixelSize,
    pub cell: CellSize,
    pub padding: Padding,
    columns: usize,
    screen_lines: usize,
}

impl SizeInfo {
    /// Size for a known grid, with the pixel area derived from it.
    pub fn new(columns: usize, screen_lines: usize, cell: CellSize) -> Self {
        let columns = columns.max(1);
        let screen_lines = screen_lines.max(1);
        Self {
            area: PixelSize {
                width: cell.width * columns as u32,
                height: cell.height * screen_lines as u32,
            },
            cell,
            padding: Padding::default(),
            columns,
            screen_lines,
        }
    }

    /// Fit as many whole cells as possible into `area` minus `padding`.
    /// Never smaller than 1x1.
    pub fn from_pixels(area: PixelSize, cell: CellSize, padding: Padding) -> Self {
        let (columns, screen_lines) = cell.cells_in(padding.inner(area));
        Self {
            area,
            cell,
            padding,
            columns,
            screen_lines,
        }
    }

    pub fn window_size(&self) -> WindowSize {
        WindowSize {
            num_lines: clamp_u16(self.screen_lines),
            num_cols: clamp_u16(self.columns),
            cell_width: clamp_u16(self.cell.width as usize),
            cell_height: clamp_u16(self.cell.height as usize),
        }
    }

    pub fn columns_u16(&self) -> u16 {
        clamp_u16(self.columns)
    }

    pub fn lines_u16(&self) -> u16 {
        clamp_u16(self.screen_lines)
    }
}

impl Dimensions for SizeInfo {
    fn columns(&self) -> usize {
        self.columns
    }

    fn screen_lines(&self) -> usize {
        self.screen_lines
    }

    fn total_lines(&self) -> usize {
        // The Term tracks scrollback history itself.
        self.screen_lines
    }
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: CellSize = CellSize::new(10, 20);

    #[test]
    fn new_80x24() {
        let size = SizeInfo::new(80, 24, CELL);
        assert_eq!(size.columns(), 80);
        assert_eq!(size.screen_lines(), 24);
        assert_eq!(size.total_lines(), 24);
        assert_eq!(
            size.area,
            PixelSize {
                width: 800,
                height: 480
            }
        );
    }

    #[test]
    fn from_pixels_subtracts_padding() {
        let area = PixelSize {
            width: 810,
            height: 490,
        };
        let size = SizeInfo::from_pixels(area, CELL, Padding::uniform(5));
        assert_eq!(size.columns(), 80);
        assert_eq!(size.screen_lines(), 24);
    }

    #[test]
    fn from_pixels_minimum_1x1() {
        let area = PixelSize {
            width: 5,
            height: 5,
        };
        let size = SizeInfo::from_pixels(area, CELL, Padding::uniform(50));
        assert_eq!(size.columns(), 1);
        assert_eq!(size.screen_lines(), 1);
    }

    #[test]
    fn window_size_reports_cells() {
        let ws = SizeInfo::new(100, 30, CELL).window_size();
        assert_eq!((ws.num_cols, ws.num_lines), (100, 30));
        assert_eq!((ws.cell_width, ws.cell_height), (10, 20));
    }

    #[test]
    fn term_creation_with_size_info() {
        use crate::event::EventProxy;
        use alacritty_terminal::term::{Config, Term};

        let size = SizeInfo::new(120, 40, CELL);
        let (proxy, _rx) = EventProxy::new();
        let term = Term::new(Config::default(), &size, proxy);

        assert_eq!(term.columns(), 120);
        assert_eq!(term.screen_lines(), 40);
    }
}
