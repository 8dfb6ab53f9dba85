mod color;
mod geometry;
mod x11_colors;

pub use color::*;
pub use geometry::*;
