//! Texture formats, targets and the packed sampler word.

use super::AttachmentType;

u8_enum! {
    pub enum TexTarget {
        T1D = 0,
        T2D = 1,
        T3D = 2,
        Cube = 3,
        T1DArray = 4,
        T2DArray = 5,
        CubeArray = 6,
    }
}

u8_enum! {
    pub enum TexFilter {
        Nearest = 0,
        Linear = 1,
    }
}

u8_enum! {
    pub enum TexWrap {
        Repeat = 0,
        Mirror = 1,
        Clamp = 2,
        Border = 3,
    }
}

u8_enum! {
    /// Depth comparison used by shadow samplers. `None` disables comparison.
    pub enum TexCompare {
        None = 0,
        Less = 1,
        Lequal = 2,
        Equal = 3,
        Gequal = 4,
        Greater = 5,
        NotEqual = 6,
        Never = 7,
        Always = 8,
    }
}

u8_enum! {
    /// Pixel formats. Colour formats come in groups of eight per channel
    /// layout: `U8, I8, U16, I16, F16, U32, I32, F32`.
    pub enum TexFormat {
        R8U = 0x00,
        R8I = 0x01,
        R16U = 0x02,
        R16I = 0x03,
        R16F = 0x04,
        R32U = 0x05,
        R32I = 0x06,
        R32F = 0x07,
        RG8U = 0x08,
        RG8I = 0x09,
        RG16U = 0x0a,
        RG16I = 0x0b,
        RG16F = 0x0c,
        RG32U = 0x0d,
        RG32I = 0x0e,
        RG32F = 0x0f,
        RGB8U = 0x10,
        RGB8I = 0x11,
        RGB16U = 0x12,
        RGB16I = 0x13,
        RGB16F = 0x14,
        RGB32U = 0x15,
        RGB32I = 0x16,
        RGB32F = 0x17,
        RGBA8U = 0x18,
        RGBA8I = 0x19,
        RGBA16U = 0x1a,
        RGBA16I = 0x1b,
        RGBA16F = 0x1c,
        RGBA32U = 0x1d,
        RGBA32I = 0x1e,
        RGBA32F = 0x1f,
        BGR8U = 0x20,
        BGR8I = 0x21,
        BGR16U = 0x22,
        BGR16I = 0x23,
        BGR16F = 0x24,
        BGR32U = 0x25,
        BGR32I = 0x26,
        BGR32F = 0x27,
        BGRA8U = 0x28,
        BGRA8I = 0x29,
        BGRA16U = 0x2a,
        BGRA16I = 0x2b,
        BGRA16F = 0x2c,
        BGRA32U = 0x2d,
        BGRA32I = 0x2e,
        BGRA32F = 0x2f,
        D16F = 0x30,
        D24F = 0x31,
        D32F = 0x32,
        D24FS8U = 0x33,
        D32FS8U = 0x34,
        S8U = 0x35,
        S16U = 0x36,
    }
}

/// Channel arrangement of a [`TexFormat`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexLayout {
    R,
    RG,
    RGB,
    RGBA,
    BGR,
    BGRA,
    Depth,
    DepthStencil,
    Stencil,
}

/// Static description of a texture format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TexFormatInfo {
    /// Bytes per texel.
    pub size: u8,
    pub layout: TexLayout,
    pub attachment: AttachmentType,
}

/// Per-channel byte widths of the eight colour variants.
const CHANNEL_SIZE: [u8; 8] = [1, 1, 2, 2, 2, 4, 4, 4];

impl TexFormat {
    pub const fn info(self) -> TexFormatInfo {
        let v = self as u8;
        if v < 0x30 {
            let (channels, layout) = match v >> 3 {
                0 => (1, TexLayout::R),
                1 => (2, TexLayout::RG),
                2 => (3, TexLayout::RGB),
                3 => (4, TexLayout::RGBA),
                4 => (3, TexLayout::BGR),
                _ => (4, TexLayout::BGRA),
            };
            return TexFormatInfo {
                size: channels * CHANNEL_SIZE[(v & 7) as usize],
                layout,
                attachment: AttachmentType::Colour,
            };
        }
        let (size, layout, attachment) = match self {
            TexFormat::D16F => (2, TexLayout::Depth, AttachmentType::Depth),
            TexFormat::D24F => (3, TexLayout::Depth, AttachmentType::Depth),
            TexFormat::D32F => (4, TexLayout::Depth, AttachmentType::Depth),
            TexFormat::D24FS8U => (4, TexLayout::DepthStencil, AttachmentType::DepthStencil),
            TexFormat::D32FS8U => (5, TexLayout::DepthStencil, AttachmentType::DepthStencil),
            TexFormat::S8U => (1, TexLayout::Stencil, AttachmentType::Stencil),
            _ => (2, TexLayout::Stencil, AttachmentType::Stencil),
        };
        TexFormatInfo { size, layout, attachment }
    }

    #[inline]
    pub const fn size(self) -> u8 {
        self.info().size
    }

    #[inline]
    pub const fn attachment_type(self) -> AttachmentType {
        self.info().attachment
    }
}

/// Everything needed to allocate a texture, minus its texels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub target: TexTarget,
    /// Storage format on the device.
    pub internal_format: TexFormat,
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    /// Array layers; 1 for non-array targets.
    pub num_layers: u8,
    pub use_mips: bool,
    /// Format of the uploaded texels.
    pub format: TexFormat,
    pub flags: TextureFlags,
}

impl TextureDesc {
    /// Byte size of the full upload, or 0 if any dimension is zero.
    pub fn byte_size(&self) -> u64 {
        self.width as u64
            * self.height as u64
            * self.depth as u64
            * self.num_layers as u64
            * self.format.size() as u64
    }
}

const COMPARE_SHIFT: u32 = 0;
const COMPARE_MASK: u64 = 0x0000_0000_0000_000f;
const WRAP_U_SHIFT: u32 = 4;
const WRAP_U_MASK: u64 = 0x0000_0000_0000_00f0;
const WRAP_V_SHIFT: u32 = 8;
const WRAP_V_MASK: u64 = 0x0000_0000_0000_0f00;
const WRAP_W_SHIFT: u32 = 12;
const WRAP_W_MASK: u64 = 0x0000_0000_0000_f000;
const MAG_SHIFT: u32 = 16;
const MAG_MASK: u64 = 0x0000_0000_000f_0000;
const MIN_SHIFT: u32 = 20;
const MIN_MASK: u64 = 0x0000_0000_00f0_0000;
const MIP_SHIFT: u32 = 24;
const MIP_MASK: u64 = 0x0000_0000_0f00_0000;
const BORDER_SHIFT: u32 = 32;
const BORDER_MASK: u64 = 0xffff_ffff_0000_0000;

/// Sampler parameters of a texture.
///
/// Compare mode in bits 0-3, wrap U/V/W in 4-15, mag/min/mip filters in
/// 16-27, RGBA border colour in 32-63.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextureFlags(u64);

impl TextureFlags {
    /// Repeat wrap, nearest filtering, no compare, border `0x333333ff`.
    pub const DEFAULT: Self = Self(0x3333_33ff_0000_0000);

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    const fn with_field(self, value: u64, mask: u64, shift: u32) -> Self {
        Self((self.0 & !mask) | ((value << shift) & mask))
    }

    #[inline]
    const fn field(self, mask: u64, shift: u32) -> u8 {
        ((self.0 & mask) >> shift) as u8
    }

    pub const fn with_compare(self, v: TexCompare) -> Self {
        self.with_field(v as u64, COMPARE_MASK, COMPARE_SHIFT)
    }

    pub const fn with_wrap_u(self, v: TexWrap) -> Self {
        self.with_field(v as u64, WRAP_U_MASK, WRAP_U_SHIFT)
    }

    pub const fn with_wrap_v(self, v: TexWrap) -> Self {
        self.with_field(v as u64, WRAP_V_MASK, WRAP_V_SHIFT)
    }

    pub const fn with_wrap_w(self, v: TexWrap) -> Self {
        self.with_field(v as u64, WRAP_W_MASK, WRAP_W_SHIFT)
    }

    /// Same wrap mode on all three axes.
    pub const fn with_wrap(self, v: TexWrap) -> Self {
        self.with_wrap_u(v).with_wrap_v(v).with_wrap_w(v)
    }

    pub const fn with_mag_filter(self, v: TexFilter) -> Self {
        self.with_field(v as u64, MAG_MASK, MAG_SHIFT)
    }

    pub const fn with_min_filter(self, v: TexFilter) -> Self {
        self.with_field(v as u64, MIN_MASK, MIN_SHIFT)
    }

    pub const fn with_mip_filter(self, v: TexFilter) -> Self {
        self.with_field(v as u64, MIP_MASK, MIP_SHIFT)
    }

    /// Same filter for magnification, minification and mip selection.
    pub const fn with_filter(self, v: TexFilter) -> Self {
        self.with_mag_filter(v).with_min_filter(v).with_mip_filter(v)
    }

    pub const fn with_border_colour(self, rgba: u32) -> Self {
        self.with_field(rgba as u64, BORDER_MASK, BORDER_SHIFT)
    }

    pub fn compare(self) -> Option<TexCompare> {
        TexCompare::try_from(self.field(COMPARE_MASK, COMPARE_SHIFT)).ok()
    }

    pub fn wrap_u(self) -> Option<TexWrap> {
        TexWrap::try_from(self.field(WRAP_U_MASK, WRAP_U_SHIFT)).ok()
    }

    pub fn wrap_v(self) -> Option<TexWrap> {
        TexWrap::try_from(self.field(WRAP_V_MASK, WRAP_V_SHIFT)).ok()
    }

    pub fn wrap_w(self) -> Option<TexWrap> {
        TexWrap::try_from(self.field(WRAP_W_MASK, WRAP_W_SHIFT)).ok()
    }

    pub fn mag_filter(self) -> Option<TexFilter> {
        TexFilter::try_from(self.field(MAG_MASK, MAG_SHIFT)).ok()
    }

    pub fn min_filter(self) -> Option<TexFilter> {
        TexFilter::try_from(self.field(MIN_MASK, MIN_SHIFT)).ok()
    }

    pub fn mip_filter(self) -> Option<TexFilter> {
        TexFilter::try_from(self.field(MIP_MASK, MIP_SHIFT)).ok()
    }

    pub const fn border_colour(self) -> u32 {
        ((self.0 & BORDER_MASK) >> BORDER_SHIFT) as u32
    }

    /// True if any axis clamps to the border colour.
    pub fn uses_border(self) -> bool {
        [self.wrap_u(), self.wrap_v(), self.wrap_w()]
            .into_iter()
            .any(|w| w == Some(TexWrap::Border))
    }
}

impl Default for TextureFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Debug for TextureFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextureFlags({:#018x})", self.0)
    }
}
