use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use super::{DrawCall, View, ViewId};
use crate::command::CommandBuffer;
use crate::handle::{
    FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::limits::{MAX_DRAW_CALLS, MAX_VIEWS};

/// Handle whose slot returns to its allocator once the frame carrying its
/// destroy command has rendered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PendingFree {
    VertexLayout(VertexLayoutHandle),
    VertexBuffer(VertexBufferHandle),
    IndexBuffer(IndexBufferHandle),
    Shader(ShaderHandle),
    Program(ProgramHandle),
    Texture(TextureHandle),
    FrameBuffer(FrameBufferHandle),
}

/// One half of the double buffer.
///
/// While it is the submit frame, encoders append draw calls through `&self`:
/// a slot is reserved with an atomic increment and filled exactly once. While
/// it is the render frame it is only touched through `&mut self`.
pub struct Frame {
    draw_calls: Box<[OnceLock<Box<DrawCall>>]>,
    num_draw_calls: AtomicU32,
    num_dropped: AtomicU32,
    views: Box<[View]>,
    pub(crate) cmd_pre: CommandBuffer,
    pub(crate) cmd_post: CommandBuffer,
    pub(crate) pending_frees: Vec<PendingFree>,
}

impl Frame {
    /// Empty, sealed frame. Rendering it is a no-op.
    pub fn new() -> Self {
        let mut frame = Self {
            draw_calls: (0..MAX_DRAW_CALLS).map(|_| OnceLock::new()).collect(),
            num_draw_calls: AtomicU32::new(0),
            num_dropped: AtomicU32::new(0),
            views: vec![View::default(); MAX_VIEWS].into_boxed_slice(),
            cmd_pre: CommandBuffer::new(),
            cmd_post: CommandBuffer::new(),
            pending_frees: Vec::new(),
        };
        frame.start();
        frame.finish();
        frame
    }

    /// Clears draw calls, counters and command buffers for a new recording.
    pub(crate) fn start(&mut self) {
        let n = *self.num_draw_calls.get_mut() as usize;
        for slot in &mut self.draw_calls[..n] {
            slot.take();
        }
        *self.num_draw_calls.get_mut() = 0;
        *self.num_dropped.get_mut() = 0;
        self.cmd_pre.start();
        self.cmd_post.start();
        self.pending_frees.clear();
    }

    /// Seals both command buffers.
    pub(crate) fn finish(&mut self) {
        self.cmd_pre.finish();
        self.cmd_post.finish();
    }

    pub(crate) fn set_views(&mut self, views: &[View]) {
        self.views.copy_from_slice(views);
    }

    /// Appends a draw call. Returns its index, or `None` if the frame is full.
    pub(crate) fn push(&self, draw: DrawCall) -> Option<u32> {
        let idx = self
            .num_draw_calls
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < MAX_DRAW_CALLS).then_some(n + 1)
            })
            .ok()?;
        let filled = self.draw_calls[idx as usize].set(Box::new(draw));
        debug_assert!(filled.is_ok(), "draw slot {idx} reserved twice");
        Some(idx)
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.num_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn num_draw_calls(&self) -> u32 {
        self.num_draw_calls.load(Ordering::Acquire)
    }

    #[inline]
    pub fn num_dropped(&self) -> u32 {
        self.num_dropped.load(Ordering::Relaxed)
    }

    /// Draw calls in submission order.
    pub fn draw_calls(&self) -> impl Iterator<Item = &DrawCall> {
        let n = self.num_draw_calls() as usize;
        self.draw_calls[..n].iter().filter_map(|slot| slot.get().map(|d| &**d))
    }

    /// View table as it was when the frame was sealed.
    #[inline]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    #[inline]
    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id as usize)
    }

    /// Number of distinct valid views referenced by draw calls.
    pub fn num_views_touched(&self) -> u32 {
        let mut seen = vec![false; MAX_VIEWS];
        let mut n = 0;
        for d in self.draw_calls() {
            if let Some(s) = seen.get_mut(d.view as usize) {
                if !*s {
                    *s = true;
                    n += 1;
                }
            }
        }
        n
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("num_draw_calls", &self.num_draw_calls())
            .field("num_dropped", &self.num_dropped())
            .field("cmd_pre", &self.cmd_pre.size())
            .field("cmd_post", &self.cmd_post.size())
            .field("pending_frees", &self.pending_frees.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Opcode;

    fn draw_on(view: ViewId) -> DrawCall {
        DrawCall { view, ..DrawCall::default() }
    }

    #[test]
    fn new_frame_is_sealed_and_empty() {
        let mut f = Frame::new();
        assert_eq!(f.num_draw_calls(), 0);
        assert_eq!(f.cmd_pre.read_opcode(), Ok(Opcode::End));
        assert_eq!(f.cmd_post.read_opcode(), Ok(Opcode::End));
    }

    #[test]
    fn push_preserves_order() {
        let mut f = Frame::new();
        f.start();
        for v in [3, 1, 2] {
            assert!(f.push(draw_on(v)).is_some());
        }
        let views: Vec<ViewId> = f.draw_calls().map(|d| d.view).collect();
        assert_eq!(views, vec![3, 1, 2]);
        assert_eq!(f.num_views_touched(), 3);
    }

    #[test]
    fn start_clears_draw_calls() {
        let mut f = Frame::new();
        f.start();
        f.push(draw_on(0));
        f.record_dropped();
        f.start();
        assert_eq!(f.num_draw_calls(), 0);
        assert_eq!(f.num_dropped(), 0);
        assert_eq!(f.draw_calls().count(), 0);
        assert!(f.push(draw_on(1)).is_some());
    }

    #[test]
    fn full_frame_rejects_push() {
        let mut f = Frame::new();
        f.start();
        *f.num_draw_calls.get_mut() = MAX_DRAW_CALLS;
        assert_eq!(f.push(draw_on(0)), None);
        assert_eq!(f.num_draw_calls(), MAX_DRAW_CALLS);
        *f.num_draw_calls.get_mut() = 0;
    }

    #[test]
    fn concurrent_pushes_land_in_distinct_slots() {
        let mut f = Frame::new();
        f.start();
        std::thread::scope(|s| {
            for t in 0..4u16 {
                let f = &f;
                s.spawn(move || {
                    for _ in 0..100 {
                        f.push(draw_on(t));
                    }
                });
            }
        });
        assert_eq!(f.num_draw_calls(), 400);
        assert_eq!(f.draw_calls().count(), 400);
        assert_eq!(f.num_views_touched(), 4);
        f.start();
    }
}
