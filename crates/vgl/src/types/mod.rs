//! Small enums and packed flag words of the public API.
//!
//! Enums are `#[repr(u8)]` so they serialize into command buffers as a single
//! byte and come back through `TryFrom<u8>`.

mod attachment;
mod attrib;
mod flags;
mod renderer;
mod state;
mod stencil;
mod texture;
mod uniform;

pub use attachment::{Attachment, AttachmentSlot, AttachmentType};
pub use attrib::{Attrib, AttribType};
pub use flags::{BufferFlags, ClearFlags, DiscardFlags};
pub use renderer::{RendererType, ShaderType};
pub use state::{CullTest, DepthTest, Polygon, PrimitiveType, StateFlags};
pub use stencil::{StencilFlags, StencilOp, StencilTest};
pub use texture::{
    TexCompare, TexFilter, TexFormat, TexFormatInfo, TexLayout, TexTarget, TexWrap, TextureDesc,
    TextureFlags,
};
pub use uniform::UniformType;
