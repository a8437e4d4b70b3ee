//! Draw recording.
//!
//! An [`Encoder`] accumulates one draw call privately and appends it to the
//! submit frame on [`submit`](Encoder::submit). Encoders borrow the context
//! immutably, so several threads can record at once and the frame cannot be
//! swapped while any of them is alive.

use bytemuck::Pod;

use crate::context::Context;
use crate::handle::{Handle, IndexBufferHandle, ProgramHandle, TextureHandle, VertexBufferHandle};
use crate::limits::{MAX_TEXTURE_UNITS, MAX_UNIFORM_NAME_LENGTH, MAX_UNIFORMS, MAX_VERTEX_STREAMS};
use crate::pipeline::{DrawCall, IndexStream, Rect, TextureUnit, Uniform, VertexStream, ViewId};
use crate::types::{DiscardFlags, StateFlags, StencilFlags, UniformType};

/// Pool slot of an encoder.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Slot(u16);

impl Handle for Slot {
    #[inline]
    fn from_index(idx: u16) -> Self {
        Slot(idx)
    }

    #[inline]
    fn index(self) -> u16 {
        self.0
    }
}

/// Per-thread draw recorder taken from the context's encoder pool.
pub struct Encoder<'a> {
    ctx: &'a Context,
    slot: Slot,
    draw: DrawCall,
    num_submitted: u32,
    num_dropped: u32,
}

impl<'a> Encoder<'a> {
    pub(crate) fn begin(ctx: &'a Context) -> Option<Self> {
        let slot: Slot = ctx.encoders.lock().alloc();
        if !slot.is_valid() {
            log::warn!("all encoders are in use");
            return None;
        }
        log::trace!("encoder {} begins", slot.0);
        Some(Self {
            ctx,
            slot,
            draw: DrawCall::default(),
            num_submitted: 0,
            num_dropped: 0,
        })
    }

    /// Pipeline state of the next draw.
    #[inline]
    pub fn set_state(&mut self, state: StateFlags) {
        self.draw.state = state;
    }

    /// Front and back stencil state. Pass `StencilFlags::NONE` as `back` to
    /// use `front` for both faces.
    pub fn set_stencil(&mut self, front: StencilFlags, back: StencilFlags) {
        self.draw.front_stencil = front;
        self.draw.back_stencil = if back == StencilFlags::NONE { front } else { back };
    }

    /// Per-draw scissor. A zero rect falls back to the view's scissor.
    #[inline]
    pub fn set_scissor(&mut self, x: i16, y: i16, width: u16, height: u16) {
        self.draw.scissor = Rect::new(x, y, width, height);
    }

    /// Binds `count` vertices from `start` of `handle` to `stream`. A zero
    /// count draws the whole buffer.
    pub fn set_vertex_buffer(&mut self, stream: u8, handle: VertexBufferHandle, start: u32, count: u32) {
        let s = stream as usize;
        if s >= MAX_VERTEX_STREAMS {
            log::warn!("vertex stream {stream} out of range (max {MAX_VERTEX_STREAMS})");
            return;
        }
        if !handle.is_valid() {
            log::warn!("vertex stream {stream}: invalid vertex buffer");
            return;
        }
        self.draw.vertex_streams[s] = VertexStream { handle, start, count };
        self.draw.vertex_streams_set |= 1 << s;
        self.draw.num_vertices = self
            .draw
            .streams()
            .filter(|(_, vs)| vs.count > 0)
            .map(|(_, vs)| vs.count)
            .min();
    }

    #[inline]
    pub fn set_vertex_buffer_whole(&mut self, stream: u8, handle: VertexBufferHandle) {
        self.set_vertex_buffer(stream, handle, 0, 0);
    }

    /// Binds `count` indices from `start`. Zero start and count draw the
    /// whole buffer.
    pub fn set_index_buffer(&mut self, handle: IndexBufferHandle, start: u32, count: u32) {
        if !handle.is_valid() {
            log::warn!("invalid index buffer");
            return;
        }
        self.draw.index_stream = IndexStream { handle, start, count };
    }

    #[inline]
    pub fn set_index_buffer_whole(&mut self, handle: IndexBufferHandle) {
        self.set_index_buffer(handle, 0, 0);
    }

    /// Binds `handle` to texture `unit`, read by the sampler uniform `name`.
    pub fn set_texture_unit(&mut self, unit: u8, name: &str, handle: TextureHandle) {
        let u = unit as usize;
        if u >= MAX_TEXTURE_UNITS {
            log::warn!("texture unit {unit} out of range (max {MAX_TEXTURE_UNITS})");
            return;
        }
        if !handle.is_valid() {
            log::warn!("texture unit {unit}: invalid texture");
            return;
        }
        let Some(name) = checked_name(name) else {
            return;
        };
        self.draw.texture_units[u] = TextureUnit { name: name.to_owned(), handle };
        self.draw.texture_units_set |= 1 << u;
    }

    /// Copies a uniform value. `value` must hold `ty.size() * num_elements`
    /// bytes; later values with the same name win.
    pub fn set_uniform<T: Pod>(
        &mut self,
        name: &str,
        ty: UniformType,
        value: &[T],
        num_elements: u16,
        transpose: bool,
    ) {
        let Some(name) = checked_name(name) else {
            return;
        };
        if self.draw.uniforms.len() >= MAX_UNIFORMS {
            log::warn!("uniform {name}: draw already has {MAX_UNIFORMS} uniforms");
            return;
        }
        let num_elements = num_elements.max(1);
        let bytes: &[u8] = bytemuck::cast_slice(value);
        let size = ty.size() * num_elements as usize;
        if bytes.len() < size {
            log::warn!("uniform {name}: {ty:?}[{num_elements}] needs {size} bytes, got {}", bytes.len());
            return;
        }
        self.draw.uniforms.push(Uniform {
            name: name.to_owned(),
            ty,
            data: bytes[..size].to_vec(),
            num_elements,
            transpose,
        });
    }

    /// Appends the accumulated draw to `view` with `program`, then resets the
    /// state named by `discard`.
    ///
    /// A draw without vertex or index data, or one that finds the frame
    /// full, is counted as dropped.
    pub fn submit(&mut self, view: ViewId, program: ProgramHandle, discard: DiscardFlags) {
        if self.draw.has_geometry() {
            self.push(view, program);
        } else {
            log::trace!("draw on view {view} has no geometry, dropped");
            self.drop_draw();
        }
        self.draw.discard(discard);
    }

    /// Makes `view` part of the frame without geometry, so its clear runs.
    pub fn touch(&mut self, view: ViewId) {
        self.push(view, ProgramHandle::INVALID);
        self.draw.discard(DiscardFlags::ALL);
    }

    fn push(&mut self, view: ViewId, program: ProgramHandle) {
        let mut draw = self.draw.clone();
        draw.view = view;
        draw.program = program;
        match self.ctx.submit_frame().push(draw) {
            Some(idx) => {
                log::trace!("draw {idx} on view {view} ({program})");
                self.num_submitted += 1;
            }
            None => {
                log::trace!("frame full, draw on view {view} dropped");
                self.drop_draw();
            }
        }
    }

    fn drop_draw(&mut self) {
        self.ctx.submit_frame().record_dropped();
        self.num_dropped += 1;
    }

    /// Draws appended by this encoder.
    #[inline]
    pub fn num_submitted(&self) -> u32 {
        self.num_submitted
    }

    /// Draws this encoder dropped.
    #[inline]
    pub fn num_dropped(&self) -> u32 {
        self.num_dropped
    }

    /// Draw state accumulated so far.
    #[inline]
    pub fn draw_call(&self) -> &DrawCall {
        &self.draw
    }
}

impl Drop for Encoder<'_> {
    fn drop(&mut self) {
        log::trace!(
            "encoder {} ends: {} submitted, {} dropped",
            self.slot.0,
            self.num_submitted,
            self.num_dropped
        );
        self.ctx.encoders.lock().free(self.slot);
    }
}

impl std::fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("slot", &self.slot.0)
            .field("num_submitted", &self.num_submitted)
            .field("num_dropped", &self.num_dropped)
            .finish_non_exhaustive()
    }
}

fn checked_name(name: &str) -> Option<&str> {
    if name.is_empty() {
        log::warn!("empty uniform name");
        return None;
    }
    if name.len() > MAX_UNIFORM_NAME_LENGTH {
        log::warn!("uniform name longer than {MAX_UNIFORM_NAME_LENGTH} bytes: {name:.32}...");
        return None;
    }
    Some(name)
}
