use super::Rect;
use crate::handle::FrameBufferHandle;
use crate::types::ClearFlags;

/// Clear operation run the first time a view is used in a frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Clear {
    pub flags: ClearFlags,
    /// RGBA8, red in the high byte.
    pub colour: u32,
    pub depth: f32,
    pub stencil: u8,
}

impl Clear {
    /// Colour channels normalized to `0.0..=1.0`, in RGBA order.
    pub fn colour_f32(&self) -> [f32; 4] {
        let c = self.colour;
        [
            ((c >> 24) & 0xff) as f32 / 255.0,
            ((c >> 16) & 0xff) as f32 / 255.0,
            ((c >> 8) & 0xff) as f32 / 255.0,
            (c & 0xff) as f32 / 255.0,
        ]
    }
}

impl Default for Clear {
    fn default() -> Self {
        Self {
            flags: ClearFlags::empty(),
            colour: 0x3030_30ff,
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Render target configuration addressed by draw calls.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct View {
    /// Viewport. Zero means the whole backbuffer.
    pub rect: Rect,
    pub scissor: Rect,
    pub clear: Clear,
    /// Invalid targets the default backbuffer.
    pub frame_buffer: FrameBufferHandle,
}

impl View {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_targets_backbuffer() {
        let v = View::default();
        assert!(!v.frame_buffer.is_valid());
        assert!(v.rect.is_zero());
        assert!(v.clear.flags.is_empty());
        assert_eq!(v.clear.colour, 0x3030_30ff);
    }

    #[test]
    fn clear_colour_channels() {
        let c = Clear { colour: 0xff00_80ff, ..Clear::default() };
        let [r, g, b, a] = c.colour_f32();
        assert_eq!((r, g, a), (1.0, 0.0, 1.0));
        assert!((b - 128.0 / 255.0).abs() < f32::EPSILON);
    }
}
