//! Frame recording and submission.

use render_protocol::{
    RenderContext, Rgba8, ScreenRect, TextureCreateError, TextureLock, TextureLockError,
};

use crate::{DrawBatch, GpuTileTexture, PresentError, ViewUniformGpu, WgpuRenderContext};

impl WgpuRenderContext {
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if self.gpu_state.surface_config.width == width
            && self.gpu_state.surface_config.height == height
        {
            return;
        }
        self.gpu_state.surface_config.width = width;
        self.gpu_state.surface_config.height = height;
        self.gpu_state
            .surface
            .configure(&self.gpu_state.device, &self.gpu_state.surface_config);
    }

    /// Draws every fill and texture copy recorded since the last present, in
    /// order, then presents the surface. The recorded quads are consumed even
    /// when the surface texture cannot be acquired.
    pub fn present(&mut self) -> Result<(), PresentError> {
        let result = self.submit_frame();
        self.frame_state.draw_list.clear();
        result
    }

    fn submit_frame(&mut self) -> Result<(), PresentError> {
        let frame = self.gpu_state.surface.get_current_texture()?;
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_uniform = ViewUniformGpu {
            viewport_size: [
                self.gpu_state.surface_config.width as f32,
                self.gpu_state.surface_config.height as f32,
            ],
            _padding: [0.0; 2],
        };
        self.gpu_state.queue.write_buffer(
            &self.gpu_state.view_uniform_buffer,
            0,
            bytemuck::bytes_of(&view_uniform),
        );

        let instance_count = self.frame_state.draw_list.instances().len();
        self.ensure_quad_instance_capacity(instance_count);
        if instance_count > 0 {
            self.gpu_state.queue.write_buffer(
                &self.gpu_state.quad_instance_buffer,
                0,
                bytemuck::cast_slice(self.frame_state.draw_list.instances()),
            );
        }

        let mut encoder =
            self.gpu_state
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("renderer.frame"),
                });
        {
            let [r, g, b, a] = self.frame_state.clear_color.to_unorm();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("renderer.tile_quads"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &self.gpu_state.per_frame_bind_group, &[]);
            for batch in self.frame_state.draw_list.batches() {
                match batch {
                    DrawBatch::Solid { instances } => {
                        pass.set_pipeline(&self.gpu_state.solid_pipeline);
                        pass.draw(0..6, instances.clone());
                    }
                    DrawBatch::Textured {
                        instance,
                        bind_group,
                    } => {
                        pass.set_pipeline(&self.gpu_state.textured_pipeline);
                        pass.set_bind_group(1, bind_group, &[]);
                        pass.draw(0..6, *instance..*instance + 1);
                    }
                }
            }
        }
        self.gpu_state.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl RenderContext for WgpuRenderContext {
    type Texture = GpuTileTexture;

    fn drawable_size(&self) -> (u32, u32) {
        (
            self.gpu_state.surface_config.width,
            self.gpu_state.surface_config.height,
        )
    }

    fn create_streaming_texture(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<GpuTileTexture, TextureCreateError> {
        if width == 0 || height == 0 {
            return Err(TextureCreateError::ZeroSize { width, height });
        }
        let max = self.gpu_state.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TextureCreateError::ExceedsLimit { width, height, max });
        }
        Ok(GpuTileTexture::new(
            &self.gpu_state.device,
            &self.gpu_state.texture_bind_group_layout,
            &self.gpu_state.tile_sampler,
            width,
            height,
        ))
    }

    fn lock_texture<'t>(
        &mut self,
        texture: &'t mut GpuTileTexture,
    ) -> Result<TextureLock<'t>, TextureLockError> {
        texture.lock()
    }

    fn unlock_texture(&mut self, texture: &mut GpuTileTexture) {
        texture.unlock(&self.gpu_state.queue);
    }

    fn destroy_texture(&mut self, texture: GpuTileTexture) {
        texture.destroy();
    }

    fn set_draw_color(&mut self, color: Rgba8) {
        self.frame_state.draw_color = color;
    }

    fn fill_rect(&mut self, rect: ScreenRect) {
        let color = self.frame_state.draw_color;
        self.frame_state.draw_list.push_solid(rect, color);
    }

    fn copy_texture(&mut self, texture: &GpuTileTexture, rect: ScreenRect) {
        assert!(!texture.is_locked(), "tile texture copied while locked");
        self.frame_state
            .draw_list
            .push_textured(rect, texture.bind_group().clone());
    }
}
