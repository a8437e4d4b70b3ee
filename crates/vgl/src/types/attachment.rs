use crate::handle::TextureHandle;

u8_enum! {
    /// Category of texture a framebuffer slot accepts.
    pub enum AttachmentType {
        Colour = 0,
        Depth = 1,
        Stencil = 2,
        DepthStencil = 3,
    }
}

u8_enum! {
    pub enum AttachmentSlot {
        Colour0 = 0x00,
        Colour1 = 0x01,
        Colour2 = 0x02,
        Colour3 = 0x03,
        Colour4 = 0x04,
        Colour5 = 0x05,
        Colour6 = 0x06,
        Colour7 = 0x07,
        Depth = 0x08,
        Stencil = 0x09,
        DepthStencil = 0x0a,
    }
}

impl AttachmentSlot {
    pub const fn attachment_type(self) -> AttachmentType {
        match self {
            AttachmentSlot::Depth => AttachmentType::Depth,
            AttachmentSlot::Stencil => AttachmentType::Stencil,
            AttachmentSlot::DepthStencil => AttachmentType::DepthStencil,
            _ => AttachmentType::Colour,
        }
    }

    /// Index of a colour slot, `None` for depth/stencil slots.
    pub const fn colour_index(self) -> Option<u8> {
        match self.attachment_type() {
            AttachmentType::Colour => Some(self as u8),
            _ => None,
        }
    }
}

/// One texture bound to a framebuffer slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub slot: AttachmentSlot,
    pub texture: TextureHandle,
}

impl Attachment {
    pub const fn new(slot: AttachmentSlot, texture: TextureHandle) -> Self {
        Self { slot, texture }
    }
}
