use super::Backend;
use crate::context::Config;
use crate::handle::{
    FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::pipeline::Frame;
use crate::types::{Attachment, BufferFlags, RendererType, ShaderType, TextureDesc};
use crate::vertex::VertexLayout;

/// Backend that accepts everything and draws nothing.
///
/// Every call is traced, which makes it useful for following the command
/// stream of an application without a GPU.
#[derive(Debug, Default)]
pub struct NoopBackend {
    width: u16,
    height: u16,
    frames: u64,
}

impl NoopBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered since init.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Backend for NoopBackend {
    fn renderer_type(&self) -> RendererType {
        RendererType::Noop
    }

    fn name(&self) -> &'static str {
        "No-Op"
    }

    fn init(&mut self, config: &Config) -> anyhow::Result<()> {
        self.width = config.resolution.width;
        self.height = config.resolution.height;
        self.frames = 0;
        log::debug!("noop backend init {}x{}", self.width, self.height);
        Ok(())
    }

    fn shutdown(&mut self) {
        log::debug!("noop backend shutdown after {} frames", self.frames);
    }

    fn window(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        log::trace!("noop window {width}x{height}");
    }

    fn render(&mut self, frame: &Frame) {
        self.frames += 1;
        log::trace!("noop render: {} draw calls", frame.num_draw_calls());
    }

    fn create_vertex_layout(&mut self, handle: VertexLayoutHandle, layout: &VertexLayout) {
        log::trace!("noop create {handle} stride {}", layout.stride());
    }

    fn destroy_vertex_layout(&mut self, handle: VertexLayoutHandle) {
        log::trace!("noop destroy {handle}");
    }

    fn create_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        _data: Option<&[u8]>,
        _flags: BufferFlags,
    ) {
        log::trace!("noop create {handle} ({size} bytes, {layout})");
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        log::trace!("noop destroy {handle}");
    }

    fn create_index_buffer(
        &mut self,
        handle: IndexBufferHandle,
        size: u32,
        _data: Option<&[u8]>,
        _flags: BufferFlags,
    ) {
        log::trace!("noop create {handle} ({size} bytes)");
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        log::trace!("noop destroy {handle}");
    }

    fn create_dynamic_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        _flags: BufferFlags,
    ) {
        log::trace!("noop create dynamic {handle} ({size} bytes, {layout})");
    }

    fn update_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle, offset: u32, data: &[u8]) {
        log::trace!("noop update {handle} at {offset} ({} bytes)", data.len());
    }

    fn destroy_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        log::trace!("noop destroy dynamic {handle}");
    }

    fn create_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, size: u32, _flags: BufferFlags) {
        log::trace!("noop create dynamic {handle} ({size} bytes)");
    }

    fn update_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, offset: u32, data: &[u8]) {
        log::trace!("noop update {handle} at {offset} ({} bytes)", data.len());
    }

    fn destroy_dynamic_index_buffer(&mut self, handle: IndexBufferHandle) {
        log::trace!("noop destroy dynamic {handle}");
    }

    fn create_shader(&mut self, handle: ShaderHandle, ty: ShaderType, source: &str) {
        log::trace!("noop create {handle} {ty:?} ({} chars)", source.len());
    }

    fn destroy_shader(&mut self, handle: ShaderHandle) {
        log::trace!("noop destroy {handle}");
    }

    fn create_program(&mut self, handle: ProgramHandle, vert: ShaderHandle, frag: ShaderHandle) {
        log::trace!("noop create {handle} from {vert} + {frag}");
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        log::trace!("noop destroy {handle}");
    }

    fn create_texture(&mut self, handle: TextureHandle, desc: &TextureDesc, _data: Option<&[u8]>) {
        log::trace!(
            "noop create {handle} {:?} {:?} {}x{}x{}",
            desc.target,
            desc.internal_format,
            desc.width,
            desc.height,
            desc.depth
        );
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        log::trace!("noop destroy {handle}");
    }

    fn create_frame_buffer(&mut self, handle: FrameBufferHandle, attachments: &[Attachment]) {
        log::trace!("noop create {handle} with {} attachments", attachments.len());
    }

    fn destroy_frame_buffer(&mut self, handle: FrameBufferHandle) {
        log::trace!("noop destroy {handle}");
    }
}
