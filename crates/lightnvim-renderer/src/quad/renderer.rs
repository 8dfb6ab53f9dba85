use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::layout::GridLayout;
use super::pipeline::{cell_quad_pipeline, grid_bind_group_layout};
use super::types::{CellQuad, GridUniforms, CORNERS_PER_QUAD, INITIAL_CAPACITY};

/// Draws cell backgrounds and the cursor as instanced, cell-anchored quads.
pub struct CellQuadRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    grid: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
    capacity: u32,
}

impl CellQuadRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let grid_layout = grid_bind_group_layout(device);
        let pipeline = cell_quad_pipeline(device, format, &grid_layout);

        let grid = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cell quad grid"),
            contents: bytemuck::bytes_of(&GridUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cell quad grid bind group"),
            layout: &grid_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: grid.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            instances: instance_buffer(device, INITIAL_CAPACITY),
            grid,
            bind_group,
            count: 0,
            capacity: INITIAL_CAPACITY,
        }
    }

    /// Upload this frame's quads and grid placement.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        quads: &[CellQuad],
        layout: &GridLayout,
        viewport: [f32; 2],
    ) {
        let needed = u32::try_from(quads.len()).unwrap_or(u32::MAX);
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.instances = instance_buffer(device, self.capacity);
            tracing::debug!(capacity = self.capacity, "cell quad buffer grown");
        }
        self.count = needed.min(self.capacity);
        if self.count > 0 {
            queue.write_buffer(
                &self.instances,
                0,
                bytemuck::cast_slice(&quads[..self.count as usize]),
            );
        }

        let grid = GridUniforms {
            viewport,
            origin: [layout.left, layout.top],
            cell: [layout.cell_width, layout.cell_height],
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.grid, 0, bytemuck::bytes_of(&grid));
    }

    pub fn render<'pass>(&'pass self, pass: &mut wgpu::RenderPass<'pass>) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..CORNERS_PER_QUAD, 0..self.count);
    }
}

fn instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("cell quads"),
        size: u64::from(capacity) * std::mem::size_of::<CellQuad>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
