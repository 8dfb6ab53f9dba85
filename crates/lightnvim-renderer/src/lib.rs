//! GPU rendering of the terminal grid.
//!
//! wgpu draws cell backgrounds and the cursor as instanced quads; glyphon
//! draws the text on top.

pub mod gpu;
pub mod quad;
pub mod render_state;
pub mod text;

pub use gpu::{GpuContext, RendererError};
pub use quad::{CellQuad, CellQuadRenderer};
pub use render_state::{FrameInput, RenderState};
pub use text::{CellMetrics, TextRenderer};
