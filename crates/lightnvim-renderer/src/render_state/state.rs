use std::sync::Arc;

use lightnvim_common::{CellSize, FontDescriptor};
use winit::window::Window;

use crate::gpu::{GpuContext, RendererError};
use crate::quad::CellQuadRenderer;
use crate::text::TextRenderer;

/// GPU context plus the quad and text renderers drawing into it.
pub struct RenderState {
    pub gpu: GpuContext,
    pub quad: CellQuadRenderer,
    pub text: TextRenderer,
}

impl RenderState {
    /// Create a fully initialized render state from a window.
    pub async fn new(window: Arc<Window>, font: FontDescriptor) -> Result<Self, RendererError> {
        let gpu = GpuContext::new(window).await?;
        let quad = CellQuadRenderer::new(&gpu.device, gpu.format());
        let text = TextRenderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.format(),
            font,
            gpu.scale_factor,
        );

        Ok(Self { gpu, quad, text })
    }

    /// Handle a window resize by reconfiguring the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    pub fn cell_size(&self) -> CellSize {
        self.text.cell_size()
    }

    /// Switch fonts, returning the new cell size.
    pub fn font(&self) -> &FontDescriptor {
        self.text.font()
    }

    pub fn set_font(&mut self, font: FontDescriptor) -> CellSize {
        self.text.set_font(font)
    }

    /// Re-measure glyphs for a new DPI scale, returning the new cell size.
    pub fn set_scale_factor(&mut self, scale_factor: f64) -> CellSize {
        self.gpu.scale_factor = scale_factor;
        self.text.set_scale_factor(scale_factor)
    }
}
