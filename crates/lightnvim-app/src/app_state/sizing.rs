//! Keeps the window an exact multiple of the terminal's character cell.
//!
//! Every allocation computes
//! `allocation - widget + padding + cell * count` per axis and resizes the
//! window to it, unless that size was already requested or the window is
//! maximized. Early allocations happen before the editor has drawn, so the
//! first title change drops the cached size and recomputes once.

use lightnvim_common::{CellSize, OneShot, Padding, PixelSize};
use lightnvim_terminal::Terminal;

/// The window, as seen by the controller.
pub trait SizingHost {
    /// Current inner size in physical pixels.
    fn allocation(&self) -> PixelSize;
    fn is_maximized(&self) -> bool;
    fn request_size(&mut self, size: PixelSize);
}

/// Terminal geometry the target size is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    /// Pixel area the terminal widget covers.
    pub widget: PixelSize,
    pub padding: Padding,
    pub cell: CellSize,
    pub columns: usize,
    pub rows: usize,
}

impl CellGeometry {
    pub fn of(terminal: &Terminal) -> Self {
        Self {
            widget: terminal.widget_size(),
            padding: terminal.padding(),
            cell: CellSize::new(terminal.char_width(), terminal.char_height()),
            columns: terminal.column_count(),
            rows: terminal.row_count(),
        }
    }
}

/// Window size that fits the grid exactly, keeping any space outside the
/// terminal widget.
pub fn target_size(allocation: PixelSize, geometry: &CellGeometry) -> PixelSize {
    let axis = |alloc: u32, widget: u32, padding: u32, cell: u32, count: usize| -> u32 {
        let grid = i64::from(cell).saturating_mul(count as i64);
        let size = i64::from(alloc) - i64::from(widget) + i64::from(padding) + grid;
        size.clamp(1, i64::from(u32::MAX)) as u32
    };
    PixelSize::new(
        axis(
            allocation.width,
            geometry.widget.width,
            geometry.padding.horizontal(),
            geometry.cell.width,
            geometry.columns,
        ),
        axis(
            allocation.height,
            geometry.widget.height,
            geometry.padding.vertical(),
            geometry.cell.height,
            geometry.rows,
        ),
    )
}

#[derive(Debug, Default)]
pub struct SizingController {
    /// Last requested size.
    pending: Option<PixelSize>,
    title_trigger: OneShot,
}

impl SizingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<PixelSize> {
        self.pending
    }

    /// Handle a size allocation. Returns the size requested, if any.
    pub fn on_allocation(
        &mut self,
        host: &mut impl SizingHost,
        geometry: &CellGeometry,
    ) -> Option<PixelSize> {
        let target = target_size(host.allocation(), geometry);
        if self.pending == Some(target) || host.is_maximized() {
            return None;
        }
        self.pending = Some(target);
        tracing::debug!(
            %target,
            cols = geometry.columns,
            rows = geometry.rows,
            "snapping window to cell grid"
        );
        host.request_size(target);
        Some(target)
    }

    /// First title change: forget the cached size and recompute. Later
    /// calls do nothing.
    pub fn on_title_changed(
        &mut self,
        host: &mut impl SizingHost,
        geometry: &CellGeometry,
    ) -> Option<PixelSize> {
        if !self.title_trigger.fire() {
            return None;
        }
        self.pending = None;
        self.on_allocation(host, geometry)
    }

    /// Whether the title trigger has not fired yet.
    pub fn is_unsized(&self) -> bool {
        self.title_trigger.is_armed()
    }
}
