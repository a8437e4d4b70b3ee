u8_enum! {
    /// Backend family selected at context creation.
    pub enum RendererType {
        Noop = 0,
        OpenGl = 1,
        Vulkan = 2,
    }
}

impl RendererType {
    pub fn name(self) -> &'static str {
        match self {
            RendererType::Noop => "Noop",
            RendererType::OpenGl => "OpenGL",
            RendererType::Vulkan => "Vulkan",
        }
    }
}

impl Default for RendererType {
    fn default() -> Self {
        RendererType::Noop
    }
}

u8_enum! {
    pub enum ShaderType {
        Vertex = 0,
        Fragment = 1,
    }
}
