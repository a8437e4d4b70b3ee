//! The context: resource registry, frame double buffer and backend.
//!
//! ```ignore
//! let mut ctx = Context::new(Config::new(RendererType::Noop, 1280, 720))?;
//! let layout = ctx.create_vertex_layout(&layout);
//! let vb = ctx.create_vertex_buffer(bytes, layout, BufferFlags::empty());
//!
//! loop {
//!     if let Some(mut enc) = ctx.begin() {
//!         enc.set_vertex_buffer_whole(0, vb);
//!         enc.submit(0, program, DiscardFlags::ALL);
//!     }
//!     ctx.frame();
//!     ctx.render();
//! }
//! ```

mod config;
mod dispatch;
mod registry;
mod resources;
mod stats;

pub use config::{Config, PlatformData, Resolution};
pub use resources::Resource;
pub use stats::Stats;

use parking_lot::Mutex;

use self::registry::Registry;
use crate::backend::{self, Backend};
use crate::encoder::Encoder;
use crate::error::Error;
use crate::handle::{FrameBufferHandle, HandleAllocator, IndexBufferHandle, VertexBufferHandle};
use crate::limits::{MAX_ENCODERS, MAX_VIEWS};
use crate::pipeline::{Clear, Frame, Rect, View, ViewId};
use crate::time::FrameClock;
use crate::types::{ClearFlags, RendererType};

/// Owner of every resource and of the two frames.
///
/// Recording happens on the submit frame: resource calls take `&mut self`,
/// encoders borrow `&self` and may run on several threads. [`frame`](Self::frame)
/// seals the submit frame and swaps; [`render`](Self::render) executes the
/// sealed one on the backend.
pub struct Context {
    backend: Mutex<Box<dyn Backend>>,
    renderer: RendererType,
    resolution: Resolution,

    frames: [Frame; 2],
    /// Index of the frame being recorded; the other one renders.
    submit: usize,
    render_pending: bool,
    num_frames: u32,

    pub(crate) encoders: Mutex<HandleAllocator>,
    views: Box<[View]>,
    registry: Registry,

    clock: FrameClock,
    stats: Stats,
}

impl Context {
    /// Creates the backend named by `config.renderer` and initialises it.
    pub fn new(mut config: Config) -> Result<Self, Error> {
        let backend = backend::create(&mut config)?;
        Self::with_backend(config, backend)
    }

    /// Context over a caller-supplied backend. `config.renderer` is ignored in
    /// favour of the backend's own type.
    pub fn with_backend(config: Config, mut backend: Box<dyn Backend>) -> Result<Self, Error> {
        let name = backend.name();
        backend
            .init(&config)
            .map_err(|source| Error::BackendInit { renderer: name, source })?;
        log::info!(
            "{name} backend initialised at {}x{}",
            config.resolution.width,
            config.resolution.height
        );

        let mut frames = [Frame::new(), Frame::new()];
        frames[0].start();

        Ok(Self {
            renderer: backend.renderer_type(),
            backend: Mutex::new(backend),
            resolution: config.resolution,
            frames,
            submit: 0,
            render_pending: false,
            num_frames: 0,
            encoders: Mutex::new(HandleAllocator::new(MAX_ENCODERS)),
            views: vec![View::default(); MAX_VIEWS].into_boxed_slice(),
            registry: Registry::new(),
            clock: FrameClock::new(),
            stats: Stats::default(),
        })
    }

    // ── frame loop ───────────────────────────────────────────────────────

    /// Seals the submit frame and makes it the render frame.
    ///
    /// If the previous frame was never rendered it is rendered first, so no
    /// recorded resource command is lost.
    pub fn frame(&mut self) {
        if self.render_pending {
            log::warn!("frame() without render() since the last frame, rendering it now");
            self.render();
        }

        let sealed = &mut self.frames[self.submit];
        sealed.set_views(&self.views);
        sealed.finish();

        let time = self.clock.tick();
        self.stats = Stats {
            cpu_time_ms: time.cpu_time_ms(),
            num_draw_calls: sealed.num_draw_calls(),
            num_dropped: sealed.num_dropped(),
            num_views: sealed.num_views_touched(),
            num_vertex_layouts: self.registry.vertex_layouts.live(),
            num_vertex_buffers: self.registry.vertex_buffers.live(),
            num_index_buffers: self.registry.index_buffers.live(),
            num_shaders: self.registry.shaders.live(),
            num_programs: self.registry.programs.live(),
            num_textures: self.registry.textures.live(),
            num_frame_buffers: self.registry.frame_buffers.live(),
            width: self.resolution.width,
            height: self.resolution.height,
        };
        log::trace!(
            "frame {} sealed: {} draws, {} dropped",
            time.frame_index,
            self.stats.num_draw_calls,
            self.stats.num_dropped
        );

        self.submit ^= 1;
        self.frames[self.submit].start();
        self.render_pending = true;
    }

    /// Executes the sealed frame: create commands, draws, destroy commands.
    /// Returns the number of frames rendered so far.
    pub fn render(&mut self) -> u32 {
        if !self.render_pending {
            log::warn!("render() without a sealed frame, ignored");
            return self.num_frames;
        }

        let backend = &mut **self.backend.get_mut();
        let frame = &mut self.frames[self.submit ^ 1];
        dispatch::execute(&mut frame.cmd_pre, backend);
        backend.render(frame);
        dispatch::execute(&mut frame.cmd_post, backend);

        for pending in frame.pending_frees.drain(..) {
            self.registry.free(pending);
        }

        self.render_pending = false;
        self.num_frames += 1;
        self.num_frames
    }

    /// Frame the backend renders next, or rendered last.
    #[inline]
    pub fn render_frame(&self) -> &Frame {
        &self.frames[self.submit ^ 1]
    }

    #[inline]
    pub(crate) fn submit_frame(&self) -> &Frame {
        &self.frames[self.submit]
    }

    // ── encoders ─────────────────────────────────────────────────────────

    /// Takes an encoder from the pool; `None` when every encoder is in use.
    pub fn begin(&self) -> Option<Encoder<'_>> {
        Encoder::begin(self)
    }

    /// Returns an encoder to the pool. Dropping it does the same.
    pub fn end(&self, encoder: Encoder<'_>) {
        drop(encoder);
    }

    // ── views ────────────────────────────────────────────────────────────

    fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        let view = self.views.get_mut(id as usize);
        if view.is_none() {
            log::warn!("view {id} out of range (max {MAX_VIEWS})");
        }
        view
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id as usize)
    }

    /// Viewport of a view. A zero rect covers the whole backbuffer.
    pub fn set_view_rect(&mut self, id: ViewId, x: i16, y: i16, width: u16, height: u16) {
        if let Some(view) = self.view_mut(id) {
            view.rect = Rect::new(x, y, width, height);
        }
    }

    pub fn set_view_scissor(&mut self, id: ViewId, x: i16, y: i16, width: u16, height: u16) {
        if let Some(view) = self.view_mut(id) {
            view.scissor = Rect::new(x, y, width, height);
        }
    }

    /// `rgba` is RGBA8 with red in the high byte.
    pub fn set_view_clear(&mut self, id: ViewId, flags: ClearFlags, rgba: u32, depth: f32, stencil: u8) {
        if let Some(view) = self.view_mut(id) {
            view.clear = Clear { flags, colour: rgba, depth, stencil };
        }
    }

    /// Render target of a view. The invalid handle selects the backbuffer.
    pub fn set_view_frame_buffer(&mut self, id: ViewId, frame_buffer: FrameBufferHandle) {
        if let Some(view) = self.view_mut(id) {
            view.frame_buffer = frame_buffer;
        }
    }

    pub fn reset_view(&mut self, id: ViewId) {
        if let Some(view) = self.view_mut(id) {
            view.reset();
        }
    }

    // ── introspection ────────────────────────────────────────────────────

    #[inline]
    pub fn renderer_type(&self) -> RendererType {
        self.renderer
    }

    pub fn renderer_name(&self) -> &'static str {
        self.backend.lock().name()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Backbuffer resize. Forwarded to the backend immediately.
    pub fn window(&mut self, width: u16, height: u16) {
        self.resolution = Resolution::new(width, height);
        self.backend.get_mut().window(width, height);
        log::debug!("backbuffer resized to {width}x{height}");
    }

    /// Snapshot taken at the last [`frame`](Self::frame).
    #[inline]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Byte size of a live vertex buffer.
    pub fn vertex_buffer_size(&self, handle: VertexBufferHandle) -> Option<u32> {
        self.registry.vertex_buffers.get(handle).map(|r| r.size)
    }

    /// Byte size of a live index buffer.
    pub fn index_buffer_size(&self, handle: IndexBufferHandle) -> Option<u32> {
        self.registry.index_buffers.get(handle).map(|r| r.size)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        let backend = self.backend.get_mut();
        log::debug!("shutting down {} backend", backend.name());
        backend.shutdown();
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("renderer", &self.renderer)
            .field("resolution", &self.resolution)
            .field("submit", &self.submit)
            .field("render_pending", &self.render_pending)
            .field("num_frames", &self.num_frames)
            .finish_non_exhaustive()
    }
}
