use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::types::RendererType;

/// Backbuffer size in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

impl Resolution {
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Width over height, 0 for a zero-height backbuffer.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Native handles the host hands to the backend.
///
/// The core never creates windows or GL contexts; the host does and passes
/// them in here.
#[derive(Default)]
pub struct PlatformData {
    pub display: Option<RawDisplayHandle>,
    pub window: Option<RawWindowHandle>,

    /// Loaded GL function table. Required by the OpenGL backend, which takes
    /// ownership of it at context creation.
    #[cfg(feature = "opengl")]
    pub gl: Option<glow::Context>,
}

impl std::fmt::Debug for PlatformData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("PlatformData");
        s.field("display", &self.display).field("window", &self.window);
        #[cfg(feature = "opengl")]
        s.field("gl", &self.gl.as_ref().map(|_| "glow::Context"));
        s.finish()
    }
}

/// Context creation parameters.
#[derive(Debug, Default)]
pub struct Config {
    pub renderer: RendererType,
    /// Preferred adapter vendor, 0 for any.
    pub vendor_id: u16,
    /// Preferred adapter device, 0 for any.
    pub device_id: u16,
    pub platform: PlatformData,
    pub resolution: Resolution,
}

impl Config {
    /// Config for `renderer` at the given backbuffer size, no platform data.
    pub fn new(renderer: RendererType, width: u16, height: u16) -> Self {
        Self {
            renderer,
            resolution: Resolution::new(width, height),
            ..Self::default()
        }
    }
}
