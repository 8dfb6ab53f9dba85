use serde::{Deserialize, Serialize};
use std::fmt;

/// A width/height pair in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel size of one terminal character cell; the resize quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of whole cells that fit in `area`, at least one per axis.
    pub fn cells_in(&self, area: PixelSize) -> (usize, usize) {
        let cols = area.width / self.width.max(1);
        let rows = area.height / self.height.max(1);
        (cols.max(1) as usize, rows.max(1) as usize)
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

/// Space between the window edge and the character grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Padding {
    pub const fn uniform(px: u32) -> Self {
        Self {
            left: px,
            right: px,
            top: px,
            bottom: px,
        }
    }

    pub const fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub const fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let s = |v: u32| (f64::from(v) * factor).round() as u32;
        Self {
            left: s(self.left),
            right: s(self.right),
            top: s(self.top),
            bottom: s(self.bottom),
        }
    }

    /// The area left for the grid inside `outer`.
    pub fn inner(&self, outer: PixelSize) -> PixelSize {
        PixelSize::new(
            outer.width.saturating_sub(self.horizontal()),
            outer.height.saturating_sub(self.vertical()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_in_floors_and_clamps() {
        let cell = CellSize::new(8, 17);
        assert_eq!(cell.cells_in(PixelSize::new(810, 345)), (101, 20));
        assert_eq!(cell.cells_in(PixelSize::new(3, 3)), (1, 1));
    }

    #[test]
    fn padding_sums() {
        let p = Padding {
            left: 1,
            right: 2,
            top: 3,
            bottom: 4,
        };
        assert_eq!(p.horizontal(), 3);
        assert_eq!(p.vertical(), 7);
        assert_eq!(p.inner(PixelSize::new(100, 100)), PixelSize::new(97, 93));
        assert_eq!(p.inner(PixelSize::new(1, 1)), PixelSize::new(0, 0));
    }

    #[test]
    fn padding_scaled() {
        assert_eq!(Padding::uniform(2).scaled(1.5), Padding::uniform(3));
    }

    #[test]
    fn padding_partial_toml() {
        let p: Padding = toml::from_str("left = 4").unwrap();
        assert_eq!(p.left, 4);
        assert_eq!(p.right, 0);
    }

    #[test]
    fn pixel_size_display() {
        assert_eq!(PixelSize::new(640, 480).to_string(), "640x480");
    }
}
