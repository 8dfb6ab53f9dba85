mod metrics;
mod renderer;

pub use metrics::{family_for, fit_to_cell, points_to_pixels, CellMetrics};
pub use renderer::*;
