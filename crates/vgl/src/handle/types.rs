use std::fmt;

/// Reserved index meaning "no resource".
pub const INVALID_HANDLE: u16 = u16::MAX;

/// Common surface of all typed handles.
pub trait Handle: Copy + Eq + fmt::Debug {
    fn from_index(idx: u16) -> Self;
    fn index(self) -> u16;

    #[inline]
    fn is_valid(self) -> bool {
        self.index() != INVALID_HANDLE
    }
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
        pub struct $name(u16);

        impl $name {
            pub const INVALID: Self = Self(INVALID_HANDLE);

            #[inline]
            pub const fn new(idx: u16) -> Self {
                Self(idx)
            }

            #[inline]
            pub const fn idx(self) -> u16 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != INVALID_HANDLE
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl Handle for $name {
            #[inline]
            fn from_index(idx: u16) -> Self {
                Self(idx)
            }

            #[inline]
            fn index(self) -> u16 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}(invalid)", stringify!($name))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

typed_handle!(
    /// Vertex layout slot. Shared by vertex buffers, ref-counted.
    VertexLayoutHandle
);
typed_handle!(
    /// Static or dynamic vertex buffer slot.
    VertexBufferHandle
);
typed_handle!(
    /// Static or dynamic index buffer slot.
    IndexBufferHandle
);
typed_handle!(
    /// Shader stage slot. Shared by programs, ref-counted.
    ShaderHandle
);
typed_handle!(
    /// Linked program slot.
    ProgramHandle
);
typed_handle!(
    /// Texture slot. Shared by framebuffer attachments, ref-counted.
    TextureHandle
);
typed_handle!(
    /// Framebuffer slot.
    FrameBufferHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invalid() {
        assert!(!TextureHandle::default().is_valid());
        assert_eq!(ProgramHandle::default(), ProgramHandle::INVALID);
    }

    #[test]
    fn zero_is_a_valid_handle() {
        assert!(VertexBufferHandle::new(0).is_valid());
        assert!(Handle::is_valid(ShaderHandle::from_index(0)));
    }

    #[test]
    fn debug_marks_invalid() {
        assert_eq!(format!("{:?}", IndexBufferHandle::new(3)), "IndexBufferHandle(3)");
        assert_eq!(format!("{:?}", IndexBufferHandle::INVALID), "IndexBufferHandle(invalid)");
    }
}
