//! OpenGL 3.3 core backend on top of `glow`.
//!
//! The host creates the GL context, makes it current on the render thread and
//! hands the loaded function table over through
//! [`PlatformData::gl`](crate::PlatformData). Every GL call happens inside
//! [`Context::render`](crate::Context::render).

mod format;
mod render;
mod resources;

use glow::HasContext;

use self::resources::{BufferGl, FrameBufferGl, ProgramGl, ShaderGl, Slots, TextureGl, Usage};
use super::Backend;
use crate::context::{Config, Resolution};
use crate::handle::{
    FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::limits::{
    MAX_FRAME_BUFFERS, MAX_INDEX_BUFFERS, MAX_PROGRAMS, MAX_SHADERS, MAX_TEXTURES,
    MAX_VERTEX_BUFFERS, MAX_VERTEX_LAYOUTS,
};
use crate::pipeline::Frame;
use crate::types::{Attachment, BufferFlags, RendererType, ShaderType, TextureDesc};
use crate::vertex::VertexLayout;

type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlShader = <glow::Context as HasContext>::Shader;
type GlProgram = <glow::Context as HasContext>::Program;
type GlTexture = <glow::Context as HasContext>::Texture;
type GlFramebuffer = <glow::Context as HasContext>::Framebuffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;
type GlUniformLocation = <glow::Context as HasContext>::UniformLocation;

const MIN_GL_VERSION: (u32, u32) = (3, 3);

pub struct GlBackend {
    gl: glow::Context,
    vao: Option<GlVertexArray>,
    resolution: Resolution,

    vertex_layouts: Slots<VertexLayout>,
    vertex_buffers: Slots<BufferGl>,
    index_buffers: Slots<BufferGl>,
    shaders: Slots<ShaderGl>,
    programs: Slots<ProgramGl>,
    textures: Slots<TextureGl>,
    frame_buffers: Slots<FrameBufferGl>,
}

impl GlBackend {
    /// Wraps a loaded GL function table. The context must be current on the
    /// thread that calls [`render`](crate::Context::render).
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            vao: None,
            resolution: Resolution::default(),
            vertex_layouts: Slots::new(MAX_VERTEX_LAYOUTS),
            vertex_buffers: Slots::new(MAX_VERTEX_BUFFERS),
            index_buffers: Slots::new(MAX_INDEX_BUFFERS),
            shaders: Slots::new(MAX_SHADERS),
            programs: Slots::new(MAX_PROGRAMS),
            textures: Slots::new(MAX_TEXTURES),
            frame_buffers: Slots::new(MAX_FRAME_BUFFERS),
        }
    }

    /// Drains the GL error queue, logging each entry against `what`.
    fn check_errors(&self, what: &str) {
        loop {
            let err = unsafe { self.gl.get_error() };
            if err == glow::NO_ERROR {
                return;
            }
            log::error!("GL error {} after {what}", error_name(err));
        }
    }
}

fn error_name(err: u32) -> String {
    match err {
        glow::INVALID_ENUM => "GL_INVALID_ENUM".into(),
        glow::INVALID_VALUE => "GL_INVALID_VALUE".into(),
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION".into(),
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY".into(),
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION".into(),
        glow::CONTEXT_LOST => "GL_CONTEXT_LOST".into(),
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW".into(),
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW".into(),
        other => format!("{other:#06x}"),
    }
}

impl std::fmt::Debug for GlBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlBackend")
            .field("resolution", &self.resolution)
            .field("vertex_buffers", &self.vertex_buffers.len())
            .field("index_buffers", &self.index_buffers.len())
            .field("programs", &self.programs.len())
            .field("textures", &self.textures.len())
            .field("frame_buffers", &self.frame_buffers.len())
            .finish()
    }
}

impl Backend for GlBackend {
    fn renderer_type(&self) -> RendererType {
        RendererType::OpenGl
    }

    fn name(&self) -> &'static str {
        RendererType::OpenGl.name()
    }

    fn init(&mut self, config: &Config) -> anyhow::Result<()> {
        let version = self.gl.version();
        if (version.major, version.minor) < MIN_GL_VERSION {
            anyhow::bail!(
                "OpenGL {}.{} required, context reports {}.{}",
                MIN_GL_VERSION.0,
                MIN_GL_VERSION.1,
                version.major,
                version.minor
            );
        }

        let vao = unsafe { self.gl.create_vertex_array() }.map_err(anyhow::Error::msg)?;
        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            // Tightly packed rows for RGB and single-channel uploads.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            // Point size comes from gl_PointSize.
            self.gl.enable(glow::PROGRAM_POINT_SIZE);
        }
        self.vao = Some(vao);
        self.resolution = config.resolution;

        let renderer = unsafe { self.gl.get_parameter_string(glow::RENDERER) };
        log::info!(
            "OpenGL {}.{} backend on {renderer} ({}x{})",
            version.major,
            version.minor,
            self.resolution.width,
            self.resolution.height
        );
        self.check_errors("init");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.release_all();
        if let Some(vao) = self.vao.take() {
            unsafe {
                self.gl.bind_vertex_array(None);
                self.gl.delete_vertex_array(vao);
            }
        }
        self.check_errors("shutdown");
        log::info!("OpenGL backend shut down");
    }

    fn window(&mut self, width: u16, height: u16) {
        self.resolution = Resolution::new(width, height);
    }

    fn render(&mut self, frame: &Frame) {
        self.render_frame(frame);
    }

    fn create_vertex_layout(&mut self, handle: VertexLayoutHandle, layout: &VertexLayout) {
        if self.vertex_layouts.insert(handle, layout.clone()).is_some() {
            log::warn!("{handle} already in use, overwritten");
        }
    }

    fn destroy_vertex_layout(&mut self, handle: VertexLayoutHandle) {
        if self.vertex_layouts.take(handle).is_none() {
            log::warn!("skip destroying {handle}: not live");
        }
    }

    fn create_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        data: Option<&[u8]>,
        flags: BufferFlags,
    ) {
        self.create_vertex_buffer_gl(handle, size, layout, Usage::Static(data), flags);
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        self.destroy_vertex_buffer_gl(handle, false);
    }

    fn create_index_buffer(
        &mut self,
        handle: IndexBufferHandle,
        size: u32,
        data: Option<&[u8]>,
        flags: BufferFlags,
    ) {
        self.create_index_buffer_gl(handle, size, Usage::Static(data), flags);
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        self.destroy_index_buffer_gl(handle, false);
    }

    fn create_dynamic_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        flags: BufferFlags,
    ) {
        self.create_vertex_buffer_gl(handle, size, layout, Usage::Dynamic, flags);
    }

    fn update_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle, offset: u32, data: &[u8]) {
        self.update_vertex_buffer_gl(handle, offset, data);
    }

    fn destroy_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        self.destroy_vertex_buffer_gl(handle, true);
    }

    fn create_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, size: u32, flags: BufferFlags) {
        self.create_index_buffer_gl(handle, size, Usage::Dynamic, flags);
    }

    fn update_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, offset: u32, data: &[u8]) {
        self.update_index_buffer_gl(handle, offset, data);
    }

    fn destroy_dynamic_index_buffer(&mut self, handle: IndexBufferHandle) {
        self.destroy_index_buffer_gl(handle, true);
    }

    fn create_shader(&mut self, handle: ShaderHandle, ty: ShaderType, source: &str) {
        self.create_shader_gl(handle, ty, source);
    }

    fn destroy_shader(&mut self, handle: ShaderHandle) {
        self.destroy_shader_gl(handle);
    }

    fn create_program(&mut self, handle: ProgramHandle, vert: ShaderHandle, frag: ShaderHandle) {
        self.create_program_gl(handle, vert, frag);
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        self.destroy_program_gl(handle);
    }

    fn create_texture(&mut self, handle: TextureHandle, desc: &TextureDesc, data: Option<&[u8]>) {
        self.create_texture_gl(handle, desc, data);
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.destroy_texture_gl(handle);
    }

    fn create_frame_buffer(&mut self, handle: FrameBufferHandle, attachments: &[Attachment]) {
        self.create_frame_buffer_gl(handle, attachments);
    }

    fn destroy_frame_buffer(&mut self, handle: FrameBufferHandle) {
        self.destroy_frame_buffer_gl(handle);
    }
}
