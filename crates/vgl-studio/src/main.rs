//! Demo host for `vgl`.
//!
//! Opens a window, records one of the demo scenes every redraw and drives the
//! frame loop. The scene is picked by the first argument and switched with the
//! number keys. With the `opengl` feature the scenes render through a GL 3.3
//! context; `--noop` (or a failed GL setup) runs them on the no-op backend.

#[cfg(feature = "opengl")]
mod gl;
mod scenes;

use std::time::Instant;

use anyhow::{Context as _, Result};
use vgl::logging::{LoggingConfig, init_logging};
use vgl::types::{ClearFlags, RendererType};
use vgl::{Config, Context};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use scenes::Scene;

const DEFAULT_SCENE: &str = "cube";
const STATS_EVERY: u32 = 300;

fn main() -> Result<()> {
    init_logging(LoggingConfig {
        trace_gl: std::env::var_os("VGL_TRACE_GL").is_some(),
        ..LoggingConfig::default()
    });

    let options = Options::parse(std::env::args().skip(1));
    let name = options.scene;
    let scene = scenes::by_name(&name).with_context(|| {
        format!("unknown scene `{name}`, expected one of {}", scenes::NAMES.join(", "))
    })?;

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut studio = Studio::new(scene, options.noop);
    event_loop.run_app(&mut studio).context("event loop terminated with an error")?;

    match studio.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[derive(Debug, PartialEq)]
struct Options {
    scene: String,
    /// Skip GL setup and run on the no-op backend.
    noop: bool,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = Self { scene: DEFAULT_SCENE.to_owned(), noop: false };
        for arg in args {
            match arg.as_str() {
                "--noop" => options.noop = true,
                _ => options.scene = arg,
            }
        }
        options
    }
}

/// Clamps a physical window size to the backbuffer range.
fn backbuffer_size(size: PhysicalSize<u32>) -> (u16, u16) {
    let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
    (clamp(size.width), clamp(size.height))
}

struct Studio {
    scene: Box<dyn Scene>,
    // Dropped before the GL target and window it renders into.
    ctx: Option<Context>,
    #[cfg(feature = "opengl")]
    gl: Option<gl::GlTarget>,
    window: Option<Window>,
    noop: bool,
    started: Instant,
    failure: Option<anyhow::Error>,
}

impl Studio {
    fn new(scene: Box<dyn Scene>, noop: bool) -> Self {
        Self {
            scene,
            ctx: None,
            #[cfg(feature = "opengl")]
            gl: None,
            window: None,
            noop,
            started: Instant::now(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("vgl studio")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = event_loop.create_window(attrs).context("failed to create window")?;

        let (width, height) = backbuffer_size(window.inner_size());
        let mut config = Config::new(RendererType::Noop, width, height);
        config.platform.window = Some(window.window_handle().context("no window handle")?.as_raw());
        config.platform.display = Some(window.display_handle().context("no display handle")?.as_raw());
        #[cfg(feature = "opengl")]
        if !self.noop {
            match gl::GlTarget::new(&window) {
                Ok((target, gl)) => {
                    config.renderer = RendererType::OpenGl;
                    config.platform.gl = Some(gl);
                    self.gl = Some(target);
                }
                Err(e) => log::warn!("{e:#}, falling back to the no-op renderer"),
            }
        }
        #[cfg(not(feature = "opengl"))]
        if !self.noop {
            log::info!("built without the `opengl` feature, using the no-op renderer");
        }

        let mut ctx = Context::new(config).context("failed to create vgl context")?;
        log::info!("renderer: {} ({width}x{height})", ctx.renderer_name());
        set_default_views(&mut ctx);
        self.scene.init(&mut ctx).with_context(|| format!("scene `{}`", self.scene.name()))?;
        log::info!("scene: {}", self.scene.name());

        window.request_redraw();
        self.ctx = Some(ctx);
        self.window = Some(window);
        Ok(())
    }

    fn switch_scene(&mut self, name: &str) -> Result<()> {
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(());
        };
        if name == self.scene.name() {
            return Ok(());
        }
        let Some(mut next) = scenes::by_name(name) else {
            return Ok(());
        };
        self.scene.release(ctx);
        set_default_views(ctx);
        next.init(ctx).with_context(|| format!("scene `{name}`"))?;
        log::info!("scene: {name}");
        self.scene = next;
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        self.scene.update(ctx, self.started.elapsed().as_secs_f32());
        ctx.frame();
        let frames = ctx.render();
        #[cfg(feature = "opengl")]
        if let Some(target) = &self.gl {
            if let Err(e) = target.present() {
                log::error!("{e:#}");
            }
        }
        if frames % STATS_EVERY == 0 {
            let stats = ctx.stats();
            log::debug!(
                "frame {frames}: {} draws, {} dropped, {:.2} ms",
                stats.num_draw_calls,
                stats.num_dropped,
                stats.cpu_time_ms
            );
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        log::error!("{e:#}");
        self.failure = Some(e);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut ctx) = self.ctx.take() {
            self.scene.release(&mut ctx);
            ctx.frame();
            ctx.render();
        }
        #[cfg(feature = "opengl")]
        {
            self.gl = None;
        }
        self.window = None;
        event_loop.exit();
    }
}

fn set_default_views(ctx: &mut Context) {
    ctx.set_view_clear(0, ClearFlags::COLOUR | ClearFlags::DEPTH, 0x303030ff, 1.0, 0);
}

fn scene_for_key(code: KeyCode) -> Option<&'static str> {
    let index = match code {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        _ => return None,
    };
    scenes::NAMES.get(index).copied()
}

impl ApplicationHandler for Studio {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                #[cfg(feature = "opengl")]
                if let Some(target) = &self.gl {
                    target.resize(size.width, size.height);
                }
                if let Some(ctx) = self.ctx.as_mut() {
                    let (width, height) = backbuffer_size(size);
                    ctx.window(width, height);
                }
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state: ElementState::Pressed, .. },
                ..
            } => {
                if code == KeyCode::Escape {
                    self.shutdown(event_loop);
                } else if let Some(name) = scene_for_key(code) {
                    if let Err(e) = self.switch_scene(name) {
                        self.fail(event_loop, e);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_windows_clamp_to_u16() {
        assert_eq!(backbuffer_size(PhysicalSize::new(1920, 1080)), (1920, 1080));
        assert_eq!(backbuffer_size(PhysicalSize::new(100_000, 7)), (u16::MAX, 7));
    }

    #[test]
    fn options_pick_scene_and_renderer() {
        let args = |a: &[&str]| Options::parse(a.iter().map(|s| s.to_string()));
        assert_eq!(args(&[]), Options { scene: DEFAULT_SCENE.to_owned(), noop: false });
        assert_eq!(args(&["--noop", "texture"]), Options { scene: "texture".to_owned(), noop: true });
        assert_eq!(args(&["clear"]).scene, "clear");
    }

    #[test]
    fn number_keys_map_to_scenes() {
        assert_eq!(scene_for_key(KeyCode::Digit1), Some("clear"));
        assert_eq!(scene_for_key(KeyCode::Digit5), Some("framebuffer"));
        assert_eq!(scene_for_key(KeyCode::KeyQ), None);
    }
}
