//! vgl: a deferred, renderer-agnostic draw recording layer.
//!
//! Client code creates resources and records draws through a [`Context`] and its
//! [`Encoder`]s. Nothing touches the GPU at record time: resource commands are
//! serialized into per-frame command buffers and draw calls are queued into the
//! submit frame. [`Context::frame`] seals and swaps frames; [`Context::render`]
//! executes the sealed frame on the selected [`Backend`].

#[macro_use]
mod macros;

pub mod backend;
pub mod command;
pub mod context;
pub mod encoder;
pub mod handle;
pub mod limits;
pub mod logging;
pub mod pipeline;
pub mod time;
pub mod types;
pub mod vertex;

mod error;

pub use backend::Backend;
pub use context::{Config, Context, PlatformData, Resolution, Stats};
pub use encoder::Encoder;
pub use error::Error;
pub use handle::{
    FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
pub use pipeline::ViewId;
pub use vertex::{VertexAttribute, VertexLayout};
