//! Cell backgrounds and the cursor, drawn as instanced quads anchored to
//! grid cells. The grid origin and cell size are uniforms, so a quad only
//! records which cell it belongs to.

mod layout;
mod pipeline;
mod renderer;
mod types;

pub use layout::{cursor_quads, grid_quads, GridLayout};
pub use renderer::CellQuadRenderer;
pub use types::CellQuad;
