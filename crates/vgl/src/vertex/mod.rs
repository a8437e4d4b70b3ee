//! Interleaved vertex geometry description.

mod layout;

pub use layout::{VertexAttribute, VertexLayout, VertexLayoutBuilder};
