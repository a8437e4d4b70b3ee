//! Renderer backends.
//!
//! A backend receives resource commands one by one from the dispatcher and a
//! sealed [`Frame`] to draw. It never sees the command buffers themselves.
//!
//! Backend calls follow the log-and-continue model: a resource the backend
//! cannot create is logged and skipped, and draws referencing it are skipped
//! at render time.

#[cfg(feature = "opengl")]
pub mod gl;
mod noop;

pub use noop::NoopBackend;

use crate::context::Config;
use crate::error::Error;
use crate::handle::{
    FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::pipeline::Frame;
use crate::types::{Attachment, BufferFlags, RendererType, ShaderType, TextureDesc};
use crate::vertex::VertexLayout;

/// Immediate-mode translation of the recorded command and draw model.
pub trait Backend: Send {
    fn renderer_type(&self) -> RendererType;
    fn name(&self) -> &'static str;

    fn init(&mut self, config: &Config) -> anyhow::Result<()>;
    /// Releases every live resource. The backend may be dropped afterwards.
    fn shutdown(&mut self);
    /// Backbuffer resize.
    fn window(&mut self, width: u16, height: u16);

    /// Executes the frame's draw calls in submission order.
    fn render(&mut self, frame: &Frame);

    // ── layouts ──────────────────────────────────────────────────────────

    fn create_vertex_layout(&mut self, handle: VertexLayoutHandle, layout: &VertexLayout);
    fn destroy_vertex_layout(&mut self, handle: VertexLayoutHandle);

    // ── static buffers ───────────────────────────────────────────────────

    fn create_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        data: Option<&[u8]>,
        flags: BufferFlags,
    );
    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle);

    fn create_index_buffer(
        &mut self,
        handle: IndexBufferHandle,
        size: u32,
        data: Option<&[u8]>,
        flags: BufferFlags,
    );
    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle);

    // ── dynamic buffers ──────────────────────────────────────────────────

    fn create_dynamic_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        flags: BufferFlags,
    );
    fn update_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle, offset: u32, data: &[u8]);
    fn destroy_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle);

    fn create_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, size: u32, flags: BufferFlags);
    fn update_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, offset: u32, data: &[u8]);
    fn destroy_dynamic_index_buffer(&mut self, handle: IndexBufferHandle);

    // ── shaders ──────────────────────────────────────────────────────────

    fn create_shader(&mut self, handle: ShaderHandle, ty: ShaderType, source: &str);
    fn destroy_shader(&mut self, handle: ShaderHandle);
    fn create_program(&mut self, handle: ProgramHandle, vert: ShaderHandle, frag: ShaderHandle);
    fn destroy_program(&mut self, handle: ProgramHandle);

    // ── textures and framebuffers ────────────────────────────────────────

    fn create_texture(&mut self, handle: TextureHandle, desc: &TextureDesc, data: Option<&[u8]>);
    fn destroy_texture(&mut self, handle: TextureHandle);
    fn create_frame_buffer(&mut self, handle: FrameBufferHandle, attachments: &[Attachment]);
    fn destroy_frame_buffer(&mut self, handle: FrameBufferHandle);
}

/// Builds the backend named by `config.renderer`.
///
/// The OpenGL backend takes the loaded GL context out of `config.platform`.
pub(crate) fn create(config: &mut Config) -> Result<Box<dyn Backend>, Error> {
    match config.renderer {
        RendererType::Noop => Ok(Box::new(NoopBackend::new())),
        #[cfg(feature = "opengl")]
        RendererType::OpenGl => {
            let gl = config.platform.gl.take().ok_or(Error::MissingGlContext)?;
            Ok(Box::new(gl::GlBackend::new(gl)))
        }
        #[cfg(not(feature = "opengl"))]
        RendererType::OpenGl => Err(Error::OpenGlDisabled),
        RendererType::Vulkan => Err(Error::UnsupportedRenderer(RendererType::Vulkan)),
    }
}
