//! Serialized resource commands.
//!
//! The context writes create/update/destroy commands into a frame's pre or
//! post [`CommandBuffer`]; the dispatcher reads them back on the render side
//! and forwards each one to the backend.

mod buffer;
mod opcode;

pub use buffer::CommandBuffer;
pub use opcode::Opcode;
