/// A filled rectangle anchored to a grid cell.
///
/// `offset` and `size` are pixels relative to the top-left corner of the
/// anchor cell. A background run spans whole cells from offset zero; cursor
/// shapes are slices of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct CellQuad {
    /// Anchor cell as `[column, line]`.
    pub cell: [f32; 2],
    pub offset: [f32; 2],
    pub size: [f32; 2],
    /// RGBA in surface color space.
    pub color: [f32; 4],
}

/// Grid placement shared by every quad in a frame.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub(crate) struct GridUniforms {
    pub viewport: [f32; 2],
    /// Top-left corner of cell (0, 0), i.e. the padding.
    pub origin: [f32; 2],
    pub cell: [f32; 2],
    pub _pad: [f32; 2],
}

/// Vertices drawn per quad: two triangles, corners generated in the shader.
pub(crate) const CORNERS_PER_QUAD: u32 = 6;

/// A full 200x60 grid of alternating backgrounds still fits without a
/// resize; the buffer grows when a frame needs more.
pub(crate) const INITIAL_CAPACITY: u32 = 4096;
