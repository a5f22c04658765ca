//! Host-side wiring for the pixel display demo: GPU bootstrap, the display
//! itself, and the scene drawn into it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use display::{DisplayConfig, DisplayCreateError, DisplayOp, PixelDisplay};
use model::Rgba8;
use render_protocol::RenderContext;
use renderer::{PresentError, RendererCreateError, WgpuRenderContext};
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Opens a window and draws a test card into a tiled pixel display.
#[derive(Debug, Parser)]
#[command(name = "pixel_demo")]
pub struct Args {
    /// JSON display config; defaults apply when omitted
    pub config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Renderer(#[from] RendererCreateError),
    #[error(transparent)]
    Display(#[from] DisplayCreateError),
}

pub struct GpuState {
    ctx: WgpuRenderContext,
    display: Option<PixelDisplay<WgpuRenderContext>>,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, config: DisplayConfig) -> Result<Self, DemoError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let size = window.inner_size();
        let mut ctx =
            WgpuRenderContext::for_target(&instance, window, size.width, size.height).await?;
        log::info!("surface format {:?}", ctx.surface_format());
        ctx.set_clear_color(config.background_color);

        let mut display = PixelDisplay::new(&mut ctx, &config)?;
        draw_demo_scene(&mut display);
        log::info!(
            "pixel display {}x{} ready, {} tiles materialized",
            display.width(),
            display.height(),
            display.surface().store().materialized_count()
        );
        Ok(Self {
            ctx,
            display: Some(display),
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.ctx.resize(size.width, size.height);
    }

    pub fn render(&mut self) -> Result<(), PresentError> {
        if let Some(display) = self.display.as_mut() {
            display.render(&mut self.ctx);
        }
        self.ctx.present()
    }

    /// Tears the display down against the context that created it.
    pub fn shutdown(&mut self) {
        if let Some(display) = self.display.take() {
            display.destroy(&mut self.ctx);
        }
    }
}

impl Drop for GpuState {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Draws a test card exercising every primitive: a per-pixel gradient,
/// tile-aligned and unaligned rectangles, lines, and ellipses.
pub fn draw_demo_scene<C: RenderContext>(display: &mut PixelDisplay<C>) {
    let width = display.width() as i32;
    let height = display.height() as i32;

    display.clear_to(Rgba8::opaque(16, 18, 24));

    let band = (height / 6).max(1);
    for y in 0..band {
        for x in 0..width {
            let red = (x * 255 / width.max(1)) as u8;
            let green = (y * 255 / band) as u8;
            display.set_pixel(x, y, Rgba8::opaque(red, green, 160));
        }
    }

    let ops = [
        DisplayOp::SetDrawColor {
            color: Rgba8::opaque(230, 80, 60),
        },
        DisplayOp::FillRect {
            left: width / 8,
            bottom: height / 3,
            width: width / 3,
            height: height / 3,
            color: None,
        },
        DisplayOp::FillEllipse {
            left: width / 2,
            bottom: height / 4,
            width: width * 3 / 8,
            height: height / 2,
            color: Some(Rgba8::new(60, 160, 230, 200)),
        },
        DisplayOp::FillEllipse {
            left: width / 2 + width / 8,
            bottom: height / 2 - 16,
            width: 32,
            height: 32,
            color: Some(Rgba8::WHITE),
        },
    ];
    for op in ops {
        display.apply(op);
    }

    let step = (width / 16).max(1);
    for i in 0..=16 {
        display.draw_line(0, height - 1, i * step, band, Rgba8::opaque(250, 220, 90));
    }
    display.draw_line(0, 0, width - 1, height - 1, Rgba8::WHITE);
    display.draw_line(0, height - 1, width - 1, 0, Rgba8::WHITE);
}

#[cfg(test)]
mod tests {
    use render_protocol::software::SoftwareRenderContext;

    use super::*;

    #[test]
    fn args_accept_an_optional_config_path() {
        let args = Args::try_parse_from(["pixel_demo"]).expect("no arguments");
        assert_eq!(args.config, None);

        let args = Args::try_parse_from(["pixel_demo", "display.json"]).expect("config path");
        assert_eq!(args.config, Some(PathBuf::from("display.json")));
    }

    #[test]
    fn extra_arguments_are_a_usage_error() {
        let error = Args::try_parse_from(["pixel_demo", "display.json", "extra"])
            .expect_err("second positional argument");
        assert!(error.to_string().contains("extra"));

        let help = Args::try_parse_from(["pixel_demo", "--help"]).expect_err("help short-circuits");
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn demo_scene_draws_every_primitive_on_surface() {
        let mut ctx = SoftwareRenderContext::new(256, 192);
        let config = DisplayConfig {
            tile_width: 64,
            tile_height: 64,
            ..DisplayConfig::default()
        };
        let mut display = PixelDisplay::new(&mut ctx, &config).expect("create display");
        draw_demo_scene(&mut display);

        assert_eq!(display.pixel(0, 0), Some(Rgba8::WHITE));
        assert_eq!(display.pixel(255, 191), Some(Rgba8::WHITE));
        assert_eq!(display.pixel(40, 70), Some(Rgba8::opaque(230, 80, 60)));
        assert!(display.surface().store().materialized_count() > 0);

        let stats = display.render(&mut ctx);
        assert_eq!(stats.uploads, display.surface().store().materialized_count());
        assert_eq!(stats.lock_failures, 0);
        display.destroy(&mut ctx);
        assert_eq!(ctx.live_texture_count(), 0);
    }
}
