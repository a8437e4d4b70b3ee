//! Per-frame draw model: views, draw calls and the double-buffered frame.

mod draw;
mod frame;
mod pass;
mod rect;
mod view;

pub use draw::{DrawCall, IndexStream, TextureUnit, Uniform, VertexStream};
pub use frame::{Frame, PendingFree};
pub use pass::{ViewSetup, ViewStep, ViewWalk};
pub use rect::Rect;
pub use view::{Clear, View};

/// Index into the view table, below [`MAX_VIEWS`](crate::limits::MAX_VIEWS).
pub type ViewId = u16;
