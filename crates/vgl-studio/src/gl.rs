//! GL context and window surface for the OpenGL backend.

use std::num::NonZeroU32;

use anyhow::{Context as _, Result};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::window::Window;

/// Current GL context bound to the window's surface.
///
/// Must be dropped before the window it was created for.
pub struct GlTarget {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlTarget {
    /// Creates a 3.3 core context on `window`, makes it current and loads the
    /// function table the backend runs on.
    pub fn new(window: &Window) -> Result<(Self, glow::Context)> {
        let raw_display = window.display_handle().context("no display handle")?.as_raw();
        let raw_window = window.window_handle().context("no window handle")?.as_raw();

        let display = unsafe { Display::new(raw_display, preference(raw_window)) }
            .context("failed to open GL display")?;

        let template = ConfigTemplateBuilder::new()
            .with_depth_size(24)
            .with_stencil_size(8)
            .compatible_with_native_window(raw_window)
            .build();
        let config = unsafe { display.find_configs(template) }
            .context("failed to query GL configs")?
            .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
            .context("no GL config with a 24-bit depth and 8-bit stencil buffer")?;

        let attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window));
        let not_current = unsafe { display.create_context(&config, &attrs) }
            .context("failed to create GL 3.3 core context")?;

        let (width, height) = surface_size(window.inner_size().width, window.inner_size().height);
        let surface_attrs =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window, width, height);
        let surface = unsafe { display.create_window_surface(&config, &surface_attrs) }
            .context("failed to create GL window surface")?;
        let context = not_current.make_current(&surface).context("failed to make GL context current")?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            log::warn!("vsync unavailable: {e}");
        }

        let gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };
        log::info!("GL context created ({} samples)", config.num_samples());
        Ok((Self { surface, context }, gl))
    }

    pub fn resize(&self, width: u32, height: u32) {
        let (width, height) = surface_size(width, height);
        self.surface.resize(&self.context, width, height);
    }

    pub fn present(&self) -> Result<()> {
        self.surface.swap_buffers(&self.context).context("failed to swap GL buffers")
    }
}

/// Surfaces cannot be zero-sized, minimised windows keep a 1x1 surface.
fn surface_size(width: u32, height: u32) -> (NonZeroU32, NonZeroU32) {
    let clamp = |v: u32| NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN);
    (clamp(width), clamp(height))
}

#[cfg(target_os = "windows")]
fn preference(window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Wgl(Some(window))
}

#[cfg(target_os = "macos")]
fn preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surfaces_become_one_pixel() {
        let (w, h) = surface_size(0, 720);
        assert_eq!((w.get(), h.get()), (1, 720));
    }
}
