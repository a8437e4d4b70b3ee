u8_enum! {
    /// Resource command tag.
    ///
    /// Everything ordered before [`Opcode::End`] is routed to a frame's pre
    /// buffer and runs before its draw calls; everything after runs once the
    /// draws are done. The numeric order is part of the buffer format.
    pub enum Opcode {
        RendererInit = 0x00,
        RendererShutdownBegin = 0x01,
        CreateVertexLayout = 0x02,
        CreateVertexBuffer = 0x03,
        CreateIndexBuffer = 0x04,
        CreateDynamicVertexBuffer = 0x05,
        UpdateDynamicVertexBuffer = 0x06,
        CreateDynamicIndexBuffer = 0x07,
        UpdateDynamicIndexBuffer = 0x08,
        CreateShader = 0x09,
        CreateProgram = 0x0a,
        CreateTexture = 0x0b,
        UpdateTexture = 0x0c,
        ResizeTexture = 0x0d,
        CreateFrameBuffer = 0x0e,
        End = 0x0f,
        RendererShutdownEnd = 0x10,
        DestroyVertexLayout = 0x11,
        DestroyVertexBuffer = 0x12,
        DestroyIndexBuffer = 0x13,
        DestroyDynamicVertexBuffer = 0x14,
        DestroyDynamicIndexBuffer = 0x15,
        DestroyShader = 0x16,
        DestroyProgram = 0x17,
        DestroyTexture = 0x18,
        DestroyFrameBuffer = 0x19,
    }
}

impl Opcode {
    /// True for commands that must execute before the frame's draw calls.
    #[inline]
    pub const fn is_pre(self) -> bool {
        (self as u8) < Opcode::End as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_splits_pre_and_post() {
        assert!(Opcode::CreateFrameBuffer.is_pre());
        assert!(Opcode::UpdateDynamicIndexBuffer.is_pre());
        assert!(!Opcode::End.is_pre());
        assert!(!Opcode::DestroyVertexLayout.is_pre());
        assert_eq!(Opcode::End.as_u8(), 15);
        assert_eq!(Opcode::COUNT, 26);
    }
}
