//! Test backend that records every call it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use vgl::pipeline::{Frame, Rect, ViewId, ViewStep, ViewWalk};
use vgl::types::{
    Attachment, Attrib, AttribType, BufferFlags, RendererType, ShaderType, TextureDesc,
};
use vgl::{
    Backend, Config, Context, FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle,
    TextureHandle, VertexBufferHandle, VertexLayout, VertexLayoutHandle,
};

/// Summary of one draw as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub view: ViewId,
    pub program: ProgramHandle,
    pub num_vertices: Option<u32>,
    pub indexed: bool,
    pub num_uniforms: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init { width: u16, height: u16 },
    Shutdown,
    Window { width: u16, height: u16 },
    /// `clears` lists the views whose clear runs, in first-use order.
    Render { draws: Vec<Draw>, clears: Vec<ViewId> },

    CreateVertexLayout(VertexLayoutHandle, u16),
    DestroyVertexLayout(VertexLayoutHandle),
    CreateVertexBuffer { handle: VertexBufferHandle, size: u32, layout: VertexLayoutHandle, data: Vec<u8> },
    DestroyVertexBuffer(VertexBufferHandle),
    CreateIndexBuffer { handle: IndexBufferHandle, size: u32, flags: BufferFlags },
    DestroyIndexBuffer(IndexBufferHandle),
    CreateDynamicVertexBuffer { handle: VertexBufferHandle, size: u32 },
    UpdateDynamicVertexBuffer { handle: VertexBufferHandle, offset: u32, data: Vec<u8> },
    DestroyDynamicVertexBuffer(VertexBufferHandle),
    CreateDynamicIndexBuffer { handle: IndexBufferHandle, size: u32 },
    UpdateDynamicIndexBuffer { handle: IndexBufferHandle, offset: u32, data: Vec<u8> },
    DestroyDynamicIndexBuffer(IndexBufferHandle),
    CreateShader(ShaderHandle, ShaderType, String),
    DestroyShader(ShaderHandle),
    CreateProgram(ProgramHandle, ShaderHandle, ShaderHandle),
    DestroyProgram(ProgramHandle),
    CreateTexture(TextureHandle, TextureDesc, usize),
    DestroyTexture(TextureHandle),
    CreateFrameBuffer(FrameBufferHandle, Vec<Attachment>),
    DestroyFrameBuffer(FrameBufferHandle),
}

pub type Log = Arc<Mutex<Vec<Call>>>;

#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: Log,
    backbuffer: Rect,
    textures: HashMap<TextureHandle, Rect>,
    frame_buffers: HashMap<FrameBufferHandle, Rect>,
}

impl RecordingBackend {
    fn push(&self, call: Call) {
        self.log.lock().push(call);
    }
}

impl Backend for RecordingBackend {
    fn renderer_type(&self) -> RendererType {
        RendererType::Noop
    }

    fn name(&self) -> &'static str {
        "Recording"
    }

    fn init(&mut self, config: &Config) -> anyhow::Result<()> {
        self.backbuffer = Rect::new(0, 0, config.resolution.width, config.resolution.height);
        self.push(Call::Init { width: config.resolution.width, height: config.resolution.height });
        Ok(())
    }

    fn shutdown(&mut self) {
        self.push(Call::Shutdown);
    }

    fn window(&mut self, width: u16, height: u16) {
        self.backbuffer = Rect::new(0, 0, width, height);
        self.push(Call::Window { width, height });
    }

    fn render(&mut self, frame: &Frame) {
        let mut walk = ViewWalk::new();
        let mut clears = Vec::new();
        let draws = frame
            .draw_calls()
            .map(|d| {
                let step = walk.step(frame.views(), d.view, self.backbuffer, |fb| {
                    self.frame_buffers.get(&fb).copied()
                });
                if let ViewStep::Enter(setup) = step {
                    if setup.clear.is_some() {
                        clears.push(d.view);
                    }
                }
                Draw {
                    view: d.view,
                    program: d.program,
                    num_vertices: d.num_vertices,
                    indexed: d.is_indexed(),
                    num_uniforms: d.uniforms.len(),
                }
            })
            .collect();
        self.push(Call::Render { draws, clears });
    }

    fn create_vertex_layout(&mut self, handle: VertexLayoutHandle, layout: &VertexLayout) {
        self.push(Call::CreateVertexLayout(handle, layout.stride()));
    }

    fn destroy_vertex_layout(&mut self, handle: VertexLayoutHandle) {
        self.push(Call::DestroyVertexLayout(handle));
    }

    fn create_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        data: Option<&[u8]>,
        _flags: BufferFlags,
    ) {
        let data = data.map(<[u8]>::to_vec).unwrap_or_default();
        self.push(Call::CreateVertexBuffer { handle, size, layout, data });
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        self.push(Call::DestroyVertexBuffer(handle));
    }

    fn create_index_buffer(
        &mut self,
        handle: IndexBufferHandle,
        size: u32,
        _data: Option<&[u8]>,
        flags: BufferFlags,
    ) {
        self.push(Call::CreateIndexBuffer { handle, size, flags });
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        self.push(Call::DestroyIndexBuffer(handle));
    }

    fn create_dynamic_vertex_buffer(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        _layout: VertexLayoutHandle,
        _flags: BufferFlags,
    ) {
        self.push(Call::CreateDynamicVertexBuffer { handle, size });
    }

    fn update_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle, offset: u32, data: &[u8]) {
        self.push(Call::UpdateDynamicVertexBuffer { handle, offset, data: data.to_vec() });
    }

    fn destroy_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        self.push(Call::DestroyDynamicVertexBuffer(handle));
    }

    fn create_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, size: u32, _flags: BufferFlags) {
        self.push(Call::CreateDynamicIndexBuffer { handle, size });
    }

    fn update_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, offset: u32, data: &[u8]) {
        self.push(Call::UpdateDynamicIndexBuffer { handle, offset, data: data.to_vec() });
    }

    fn destroy_dynamic_index_buffer(&mut self, handle: IndexBufferHandle) {
        self.push(Call::DestroyDynamicIndexBuffer(handle));
    }

    fn create_shader(&mut self, handle: ShaderHandle, ty: ShaderType, source: &str) {
        self.push(Call::CreateShader(handle, ty, source.to_owned()));
    }

    fn destroy_shader(&mut self, handle: ShaderHandle) {
        self.push(Call::DestroyShader(handle));
    }

    fn create_program(&mut self, handle: ProgramHandle, vert: ShaderHandle, frag: ShaderHandle) {
        self.push(Call::CreateProgram(handle, vert, frag));
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        self.push(Call::DestroyProgram(handle));
    }

    fn create_texture(&mut self, handle: TextureHandle, desc: &TextureDesc, data: Option<&[u8]>) {
        self.textures.insert(handle, Rect::new(0, 0, desc.width, desc.height));
        self.push(Call::CreateTexture(handle, *desc, data.map_or(0, <[u8]>::len)));
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle);
        self.push(Call::DestroyTexture(handle));
    }

    fn create_frame_buffer(&mut self, handle: FrameBufferHandle, attachments: &[Attachment]) {
        let size = attachments.first().and_then(|a| self.textures.get(&a.texture)).copied();
        if let Some(size) = size {
            self.frame_buffers.insert(handle, size);
        }
        self.push(Call::CreateFrameBuffer(handle, attachments.to_vec()));
    }

    fn destroy_frame_buffer(&mut self, handle: FrameBufferHandle) {
        self.frame_buffers.remove(&handle);
        self.push(Call::DestroyFrameBuffer(handle));
    }
}

/// 640x480 context over a recording backend. The init call is already drained.
pub fn context() -> (Context, Log) {
    let log = Log::default();
    let backend = RecordingBackend { log: Arc::clone(&log), ..RecordingBackend::default() };
    let ctx = Context::with_backend(Config::new(RendererType::Noop, 640, 480), Box::new(backend))
        .expect("recording backend init");
    take(&log);
    (ctx, log)
}

/// Drains the calls recorded so far.
pub fn take(log: &Log) -> Vec<Call> {
    std::mem::take(&mut *log.lock())
}

/// `frame()` then `render()`, returning what the backend saw.
pub fn render(ctx: &mut Context, log: &Log) -> Vec<Call> {
    ctx.frame();
    ctx.render();
    take(log)
}

pub fn position_layout() -> VertexLayout {
    VertexLayout::builder()
        .add(Attrib::Position, AttribType::Float, 3, 1, false, false)
        .end()
}

pub fn program(ctx: &mut Context) -> ProgramHandle {
    let vs = ctx.create_shader(ShaderType::Vertex, "void main() { gl_Position = vec4(0.0); }");
    let fs = ctx.create_shader(ShaderType::Fragment, "out vec4 c; void main() { c = vec4(1.0); }");
    ctx.create_program(vs, fs)
}

pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

pub fn u16_bytes(values: &[u16]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}
