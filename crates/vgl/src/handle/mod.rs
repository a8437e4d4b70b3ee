//! Typed resource handles and the slot allocator that hands them out.
//!
//! Every resource kind gets its own 16-bit handle type so a texture handle can
//! never be passed where a program is expected. `u16::MAX` is the shared
//! invalid sentinel.

mod allocator;
mod types;

pub use allocator::HandleAllocator;
pub use types::{
    FrameBufferHandle, Handle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle, INVALID_HANDLE,
};
