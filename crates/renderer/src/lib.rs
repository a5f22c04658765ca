//! Renderer crate root.
//!
//! `WgpuRenderContext` implements `render_protocol::RenderContext` on top of a
//! wgpu surface. Tile textures are written through CPU staging buffers and
//! uploaded on unlock; fills and texture copies are recorded as quads and
//! drawn in submission order by `present`.
//!
//! Internal architecture overview:
//! - `renderer_init`: device bootstrap, pipelines, bind group layouts.
//! - `renderer_frame`: `RenderContext` impl, resize, and frame submission.
//! - `draw_list`: ordered quad batches shared by the two pipelines.
//! - `texture`: streaming tile textures and their staging buffers.

mod draw_list;
mod renderer_frame;
mod renderer_init;
mod texture;

use render_protocol::Rgba8;

pub use draw_list::{DrawBatch, DrawList};
pub use texture::{GpuTileTexture, padded_pitch};

pub const INITIAL_QUAD_INSTANCE_CAPACITY: usize = 256;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadInstanceGpu {
    /// x, y, width, height in top-down surface pixels.
    pub rect: [f32; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewUniformGpu {
    viewport_size: [f32; 2],
    _padding: [f32; 2],
}

#[derive(Debug, thiserror::Error)]
pub enum RendererCreateError {
    #[error("failed to create wgpu surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible wgpu adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request wgpu device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported texture formats")]
    UnsupportedSurface,
}

#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("surface texture unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    view_uniform_buffer: wgpu::Buffer,
    per_frame_bind_group_layout: wgpu::BindGroupLayout,
    per_frame_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    tile_sampler: wgpu::Sampler,
    solid_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    quad_instance_buffer: wgpu::Buffer,
    quad_instance_capacity: usize,
}

struct FrameState {
    draw_color: Rgba8,
    clear_color: Rgba8,
    draw_list: DrawList<wgpu::BindGroup>,
}

/// wgpu-backed render context for the pixel display.
pub struct WgpuRenderContext {
    gpu_state: GpuState,
    frame_state: FrameState,
}

impl WgpuRenderContext {
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.gpu_state.surface_config.format
    }

    /// Color the surface is cleared to before any quad is drawn.
    pub fn set_clear_color(&mut self, color: Rgba8) {
        self.frame_state.clear_color = color;
    }
}

#[cfg(test)]
mod wgsl_tests;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_structs_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<QuadInstanceGpu>(), 32);
        assert_eq!(std::mem::size_of::<ViewUniformGpu>(), 16);
    }
}
