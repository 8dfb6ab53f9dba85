use lightnvim_common::Color;

/// Errors that can occur during GPU rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("surface error: {0}")]
    SurfaceError(String),

    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    #[error("device error: {0}")]
    DeviceError(String),
}

impl From<wgpu::SurfaceError> for RendererError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RendererError::SurfaceError(e.to_string())
    }
}

impl From<wgpu::RequestDeviceError> for RendererError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RendererError::DeviceError(e.to_string())
    }
}

/// RGBA in the space the surface expects. sRGB surfaces blend in linear
/// space, so their inputs are linearized.
pub fn surface_color(color: Color, srgb: bool) -> [f32; 4] {
    let [r, g, b, a] = color.to_f32_array();
    if srgb {
        [to_linear(r), to_linear(g), to_linear(b), a]
    } else {
        [r, g, b, a]
    }
}

fn to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
