use std::sync::Arc;

use clap::Parser;
use display::DisplayConfig;
use pixel_demo::{Args, GpuState};
use renderer::PresentError;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

// Multiples of the default tile size, so the tile grid fills the window exactly.
const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 768;

#[derive(Default)]
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    config: DisplayConfig,
}

impl App {
    fn window_id(&self) -> Option<WindowId> {
        self.window.as_ref().map(|w| w.id())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("pixel display")
                .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
        ) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone(), self.config)) {
            Ok(gpu) => {
                window.request_redraw();
                self.window = Some(window);
                self.gpu = Some(gpu);
            }
            Err(error) => {
                log::error!("failed to initialize pixel display: {error}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id() != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(mut gpu) = self.gpu.take() {
                    gpu.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size);
                }
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(gpu) = self.gpu.as_mut() else {
                    return;
                };

                match gpu.render() {
                    Ok(()) => {}
                    Err(PresentError::Surface(
                        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost,
                    )) => {
                        if let Some(window) = self.window.as_ref() {
                            gpu.resize(window.inner_size());
                            window.request_redraw();
                        }
                    }
                    Err(PresentError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        log::error!("surface out of memory, exiting");
                        event_loop.exit();
                    }
                    Err(error) => {
                        log::warn!("frame dropped: {error}");
                        if let Some(window) = self.window.as_ref() {
                            window.request_redraw();
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config {
        Some(path) => match DisplayConfig::load(&path) {
            Ok(config) => {
                log::info!("loaded display config from {}", path.display());
                config
            }
            Err(error) => {
                log::error!("{error}");
                std::process::exit(2);
            }
        },
        None => DisplayConfig::default(),
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            log::error!("failed to create event loop: {error}");
            std::process::exit(1);
        }
    };
    let mut app = App {
        config,
        ..App::default()
    };
    if let Err(error) = event_loop.run_app(&mut app) {
        log::error!("event loop terminated: {error}");
        std::process::exit(1);
    }
}
