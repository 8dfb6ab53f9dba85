//! Owns the GPU context and both renderers, and draws whole frames.

mod frame;
mod helpers;
mod state;

pub use frame::FrameInput;
pub use state::RenderState;
