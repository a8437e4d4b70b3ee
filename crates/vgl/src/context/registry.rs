//! CPU-side mirror of every live resource.

use std::marker::PhantomData;

use crate::handle::{
    FrameBufferHandle, Handle, HandleAllocator, IndexBufferHandle, ProgramHandle, ShaderHandle,
    TextureHandle, VertexBufferHandle, VertexLayoutHandle,
};
use crate::limits::{
    MAX_FRAME_BUFFERS, MAX_INDEX_BUFFERS, MAX_PROGRAMS, MAX_SHADERS, MAX_TEXTURES,
    MAX_VERTEX_BUFFERS, MAX_VERTEX_LAYOUTS,
};
use crate::pipeline::PendingFree;
use crate::types::{Attachment, ShaderType, TextureDesc};
use crate::vertex::VertexLayout;

#[derive(Debug, Clone)]
pub(crate) struct VertexLayoutRef {
    pub layout: VertexLayout,
    pub ref_count: u16,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct VertexBufferRef {
    pub size: u32,
    pub layout: VertexLayoutHandle,
    pub dynamic: bool,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct IndexBufferRef {
    pub size: u32,
    pub dynamic: bool,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct ShaderRef {
    pub ty: ShaderType,
    pub ref_count: u16,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct ProgramRef {
    pub vert: ShaderHandle,
    pub frag: ShaderHandle,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct TextureRef {
    pub desc: TextureDesc,
    pub ref_count: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct FrameBufferRef {
    pub attachments: Vec<Attachment>,
}

/// Handle allocator plus the metadata of each allocated slot.
///
/// A slot has three states: free, live (`refs[i]` is `Some`) and released
/// (`refs[i]` is `None` but the allocator still holds it until the frame
/// carrying its destroy command has rendered).
#[derive(Debug)]
pub(crate) struct Pool<H, R> {
    allocator: HandleAllocator,
    refs: Vec<Option<R>>,
    live: u16,
    _handle: PhantomData<H>,
}

impl<H: Handle, R> Pool<H, R> {
    pub fn new(capacity: usize) -> Self {
        Self {
            allocator: HandleAllocator::new(capacity),
            refs: (0..capacity).map(|_| None).collect(),
            live: 0,
            _handle: PhantomData,
        }
    }

    /// Allocates a slot for `value`; `None` when the pool is exhausted.
    pub fn insert(&mut self, value: R) -> Option<H> {
        let handle: H = self.allocator.alloc();
        if !handle.is_valid() {
            return None;
        }
        self.refs[handle.index() as usize] = Some(value);
        self.live += 1;
        Some(handle)
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&R> {
        self.refs.get(handle.index() as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut R> {
        self.refs.get_mut(handle.index() as usize)?.as_mut()
    }

    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Ends the resource's life. The slot stays allocated until `free_slot`.
    pub fn remove(&mut self, handle: H) -> Option<R> {
        let value = self.refs.get_mut(handle.index() as usize)?.take()?;
        self.live -= 1;
        Some(value)
    }

    pub fn free_slot(&mut self, handle: H) {
        debug_assert!(!self.contains(handle), "freeing the slot of a live resource");
        self.allocator.free(handle);
    }

    #[inline]
    pub fn live(&self) -> u16 {
        self.live
    }
}

#[derive(Debug)]
pub(crate) struct Registry {
    pub vertex_layouts: Pool<VertexLayoutHandle, VertexLayoutRef>,
    pub vertex_buffers: Pool<VertexBufferHandle, VertexBufferRef>,
    pub index_buffers: Pool<IndexBufferHandle, IndexBufferRef>,
    pub shaders: Pool<ShaderHandle, ShaderRef>,
    pub programs: Pool<ProgramHandle, ProgramRef>,
    pub textures: Pool<TextureHandle, TextureRef>,
    pub frame_buffers: Pool<FrameBufferHandle, FrameBufferRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            vertex_layouts: Pool::new(MAX_VERTEX_LAYOUTS),
            vertex_buffers: Pool::new(MAX_VERTEX_BUFFERS),
            index_buffers: Pool::new(MAX_INDEX_BUFFERS),
            shaders: Pool::new(MAX_SHADERS),
            programs: Pool::new(MAX_PROGRAMS),
            textures: Pool::new(MAX_TEXTURES),
            frame_buffers: Pool::new(MAX_FRAME_BUFFERS),
        }
    }

    /// Returns a released slot to its allocator.
    pub fn free(&mut self, pending: PendingFree) {
        match pending {
            PendingFree::VertexLayout(h) => self.vertex_layouts.free_slot(h),
            PendingFree::VertexBuffer(h) => self.vertex_buffers.free_slot(h),
            PendingFree::IndexBuffer(h) => self.index_buffers.free_slot(h),
            PendingFree::Shader(h) => self.shaders.free_slot(h),
            PendingFree::Program(h) => self.programs.free_slot(h),
            PendingFree::Texture(h) => self.textures.free_slot(h),
            PendingFree::FrameBuffer(h) => self.frame_buffers.free_slot(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slot_is_not_reused_until_freed() {
        let mut pool: Pool<ShaderHandle, u8> = Pool::new(1);
        let a = pool.insert(1);
        assert_eq!(a, Some(ShaderHandle::new(0)));
        assert_eq!(pool.remove(ShaderHandle::new(0)), Some(1));
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.insert(2), None, "released slot still held");

        pool.free_slot(ShaderHandle::new(0));
        assert_eq!(pool.insert(3), Some(ShaderHandle::new(0)));
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let mut pool: Pool<TextureHandle, u8> = Pool::new(4);
        assert!(pool.get(TextureHandle::INVALID).is_none());
        assert!(pool.get_mut(TextureHandle::new(9)).is_none());
        assert!(pool.remove(TextureHandle::INVALID).is_none());
    }
}
