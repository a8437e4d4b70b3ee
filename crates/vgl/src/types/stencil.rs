//! Packed 32-bit stencil word, one per face.
//!
//! Reference value in bits 0-7, write mask 8-15, test 16-19, op on stencil
//! fail 20-23, op on depth fail 24-27, op on pass 28-31.

u8_enum! {
    pub enum StencilTest {
        Disable = 0,
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
    pub enum StencilOp {
        Zero = 0,
        Keep = 1,
        Replace = 2,
        Incr = 3,
        IncrSat = 4,
        Decr = 5,
        DecrSat = 6,
        Invert = 7,
    }
}

const RVAL_SHIFT: u32 = 0;
const RVAL_MASK: u32 = 0x0000_00ff;
const WMASK_SHIFT: u32 = 8;
const WMASK_MASK: u32 = 0x0000_ff00;
const TEST_SHIFT: u32 = 16;
const TEST_MASK: u32 = 0x000f_0000;
const FAIL_S_SHIFT: u32 = 20;
const FAIL_S_MASK: u32 = 0x00f0_0000;
const FAIL_Z_SHIFT: u32 = 24;
const FAIL_Z_MASK: u32 = 0x0f00_0000;
const PASS_SHIFT: u32 = 28;
const PASS_MASK: u32 = 0xf000_0000;

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StencilFlags(u32);

impl StencilFlags {
    /// Stencil test disabled.
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    const fn with_field(self, value: u32, mask: u32, shift: u32) -> Self {
        Self((self.0 & !mask) | ((value << shift) & mask))
    }

    #[inline]
    const fn field(self, mask: u32, shift: u32) -> u8 {
        ((self.0 & mask) >> shift) as u8
    }

    pub const fn with_ref(self, v: u8) -> Self {
        self.with_field(v as u32, RVAL_MASK, RVAL_SHIFT)
    }

    pub const fn with_write_mask(self, v: u8) -> Self {
        self.with_field(v as u32, WMASK_MASK, WMASK_SHIFT)
    }

    pub const fn with_test(self, v: StencilTest) -> Self {
        self.with_field(v as u32, TEST_MASK, TEST_SHIFT)
    }

    pub const fn with_fail_stencil(self, v: StencilOp) -> Self {
        self.with_field(v as u32, FAIL_S_MASK, FAIL_S_SHIFT)
    }

    pub const fn with_fail_depth(self, v: StencilOp) -> Self {
        self.with_field(v as u32, FAIL_Z_MASK, FAIL_Z_SHIFT)
    }

    pub const fn with_pass(self, v: StencilOp) -> Self {
        self.with_field(v as u32, PASS_MASK, PASS_SHIFT)
    }

    pub const fn reference(self) -> u8 {
        self.field(RVAL_MASK, RVAL_SHIFT)
    }

    pub const fn write_mask(self) -> u8 {
        self.field(WMASK_MASK, WMASK_SHIFT)
    }

    pub fn test(self) -> Option<StencilTest> {
        StencilTest::try_from(self.field(TEST_MASK, TEST_SHIFT)).ok()
    }

    pub fn fail_stencil(self) -> Option<StencilOp> {
        StencilOp::try_from(self.field(FAIL_S_MASK, FAIL_S_SHIFT)).ok()
    }

    pub fn fail_depth(self) -> Option<StencilOp> {
        StencilOp::try_from(self.field(FAIL_Z_MASK, FAIL_Z_SHIFT)).ok()
    }

    pub fn pass(self) -> Option<StencilOp> {
        StencilOp::try_from(self.field(PASS_MASK, PASS_SHIFT)).ok()
    }
}
