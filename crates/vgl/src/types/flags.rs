use bitflags::bitflags;

bitflags! {
    /// Which buffers a view clears the first time it is used in a frame.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u8 {
        const COLOUR = 0x01;
        const DEPTH = 0x02;
        const STENCIL = 0x04;
        const ALL = 0x07;
    }
}

bitflags! {
    /// Which parts of an encoder's draw state are reset after `submit`.
    ///
    /// The bound program is reset regardless of the flags.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct DiscardFlags: u8 {
        const VERTEX_STREAMS = 0x01;
        const INDEX_BUFFER = 0x02;
        const STATE = 0x04;
        const UNIFORMS = 0x08;
        const TEXTURES = 0x10;
        const ALL = 0xff;
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct BufferFlags: u8 {
        /// Index buffer holds `u32` indices instead of `u16`.
        const INDEX32 = 0x01;
    }
}

impl BufferFlags {
    /// Byte width of one index.
    #[inline]
    pub fn index_size(self) -> u32 {
        if self.contains(BufferFlags::INDEX32) { 4 } else { 2 }
    }
}
