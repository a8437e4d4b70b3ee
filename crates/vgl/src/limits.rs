//! Fixed capacities shared by the context, the frames and every backend.

pub const MAX_DRAW_CALLS: u32 = 65535;
pub const MIN_RESOURCE_COMMAND_BUFFER_SIZE: u32 = 65536;
pub const MAX_ENCODERS: usize = 16;

pub const MAX_PROGRAMS: usize = 256;
pub const MAX_VIEWS: usize = 256;
pub const MAX_VERTEX_LAYOUTS: usize = 64;
pub const MAX_INDEX_BUFFERS: usize = 4096;
pub const MAX_VERTEX_BUFFERS: usize = 4096;
pub const MAX_VERTEX_STREAMS: usize = 4;
pub const MAX_SHADERS: usize = 512;
pub const MAX_TEXTURES: usize = 4096;
pub const MAX_TEXTURE_UNITS: usize = 16;
pub const MAX_FRAME_BUFFERS: usize = 128;
pub const MAX_COLOUR_ATTACHMENTS: usize = 8;
/// Colour attachments plus one depth and one stencil slot.
pub const MAX_ATTACHMENTS: usize = MAX_COLOUR_ATTACHMENTS + 2;
pub const MAX_UNIFORMS: usize = 32;
pub const MAX_UNIFORM_NAME_LENGTH: usize = 128;
pub const MAX_ATTRIBUTES: usize = 16;
