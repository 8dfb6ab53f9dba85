use lightnvim_common::Padding;
use lightnvim_terminal::{CursorShape, GridSnapshot};

use crate::gpu::{surface_color, RendererError};
use crate::quad::{cursor_quads, grid_quads, GridLayout};

use super::helpers::{clear_color, log_first_frame};
use super::state::RenderState;

/// Everything a frame needs besides the renderer's own state.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub snapshot: &'a GridSnapshot,
    /// Physical-pixel padding around the grid.
    pub padding: Padding,
    /// False during the off phase of a blink.
    pub cursor_visible: bool,
    pub cursor_aspect_ratio: f32,
}

impl RenderState {
    /// Render a complete frame: clear, cell backgrounds, cursor, text.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; the
    /// next redraw paints normally.
    pub fn render_frame(&mut self, input: FrameInput<'_>) -> Result<(), RendererError> {
        let output = match self.gpu.current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface texture timed out, skipping frame");
                return Ok(());
            }
            Err(e) => {
                tracing::error!("Failed to get surface texture: {e}");
                return Err(e.into());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let srgb = self.gpu.is_srgb();
        let layout = GridLayout::new(input.padding, self.text.cell_size(), srgb);
        let snapshot = input.snapshot;

        let mut quads = grid_quads(snapshot, &layout);
        let cursor = snapshot.cursor.filter(|_| input.cursor_visible);
        if let Some(cursor) = cursor {
            quads.extend(cursor_quads(&cursor, &layout, input.cursor_aspect_ratio));
        }
        let inverted = cursor
            .filter(|c| c.shape == CursorShape::Block)
            .map(|c| (c.line, c.column));

        let width = self.gpu.size.width;
        let height = self.gpu.size.height;
        self.quad.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            &quads,
            &layout,
            [width as f32, height as f32],
        );
        self.text.prepare_grid(
            &self.gpu.device,
            &self.gpu.queue,
            snapshot,
            layout.left,
            layout.top,
            width,
            height,
            inverted,
        );

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lightnvim frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lightnvim main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(surface_color(
                            snapshot.background,
                            srgb,
                        ))),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.quad.render(&mut pass);
            self.text.render(&mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        log_first_frame(width, height, self.gpu.format());

        Ok(())
    }
}
