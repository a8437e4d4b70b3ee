//! Packed 64-bit pipeline state word.
//!
//! | bits  | field          |
//! |-------|----------------|
//! | 0-3   | depth test     |
//! | 4-7   | cull test      |
//! | 8-11  | primitive type |
//! | 12-15 | polygon mode   |
//! | 16-23 | point size     |
//! | 24-31 | line width     |
//!
//! Bits 32-63 are reserved.

u8_enum! {
    pub enum DepthTest {
        Disabled = 0,
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
    /// Winding order treated as the front face when culling is on.
    pub enum CullTest {
        Disabled = 0,
        Cw = 1,
        Ccw = 2,
    }
}

u8_enum! {
    pub enum PrimitiveType {
        Points = 0x00,
        LineStrip = 0x01,
        LineLoop = 0x02,
        Lines = 0x03,
        LineStripAdjacency = 0x04,
        LinesAdjacency = 0x05,
        TriangleStrip = 0x06,
        TriangleFan = 0x07,
        Triangles = 0x08,
        TriangleStripAdjacency = 0x09,
        TrianglesAdjacency = 0x0a,
    }
}

u8_enum! {
    pub enum Polygon {
        Fill = 0,
        Line = 1,
        Point = 2,
    }
}

const DEPTH_TEST_SHIFT: u32 = 0;
const DEPTH_TEST_MASK: u64 = 0x0000_000f;
const CULL_TEST_SHIFT: u32 = 4;
const CULL_TEST_MASK: u64 = 0x0000_00f0;
const PRIMITIVE_SHIFT: u32 = 8;
const PRIMITIVE_MASK: u64 = 0x0000_0f00;
const POLYGON_SHIFT: u32 = 12;
const POLYGON_MASK: u64 = 0x0000_f000;
const POINT_SIZE_SHIFT: u32 = 16;
const POINT_SIZE_MASK: u64 = 0x00ff_0000;
const LINE_WIDTH_SHIFT: u32 = 24;
const LINE_WIDTH_MASK: u64 = 0xff00_0000;

#[inline]
const fn encode(value: u64, mask: u64, shift: u32) -> u64 {
    (value << shift) & mask
}

#[inline]
const fn decode(bits: u64, mask: u64, shift: u32) -> u8 {
    ((bits & mask) >> shift) as u8
}

/// Pipeline state of a draw call.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StateFlags(u64);

impl StateFlags {
    /// Depth `Less`, cull `Cw`, triangles, fill, point size 1, line width 1.
    pub const DEFAULT: Self = Self(
        encode(DepthTest::Less as u64, DEPTH_TEST_MASK, DEPTH_TEST_SHIFT)
            | encode(CullTest::Cw as u64, CULL_TEST_MASK, CULL_TEST_SHIFT)
            | encode(PrimitiveType::Triangles as u64, PRIMITIVE_MASK, PRIMITIVE_SHIFT)
            | encode(Polygon::Fill as u64, POLYGON_MASK, POLYGON_SHIFT)
            | encode(1, POINT_SIZE_MASK, POINT_SIZE_SHIFT)
            | encode(1, LINE_WIDTH_MASK, LINE_WIDTH_SHIFT),
    );

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
        Self((self.0 & !mask) | encode(value, mask, shift))
    }

    pub const fn with_depth_test(self, v: DepthTest) -> Self {
        self.with_field(v as u64, DEPTH_TEST_MASK, DEPTH_TEST_SHIFT)
    }

    pub const fn with_cull_test(self, v: CullTest) -> Self {
        self.with_field(v as u64, CULL_TEST_MASK, CULL_TEST_SHIFT)
    }

    pub const fn with_primitive(self, v: PrimitiveType) -> Self {
        self.with_field(v as u64, PRIMITIVE_MASK, PRIMITIVE_SHIFT)
    }

    pub const fn with_polygon(self, v: Polygon) -> Self {
        self.with_field(v as u64, POLYGON_MASK, POLYGON_SHIFT)
    }

    pub const fn with_point_size(self, v: u8) -> Self {
        self.with_field(v as u64, POINT_SIZE_MASK, POINT_SIZE_SHIFT)
    }

    pub const fn with_line_width(self, v: u8) -> Self {
        self.with_field(v as u64, LINE_WIDTH_MASK, LINE_WIDTH_SHIFT)
    }

    /// Raw depth-test nibble; may be out of range for hand-built words.
    #[inline]
    pub const fn depth_test_bits(self) -> u8 {
        decode(self.0, DEPTH_TEST_MASK, DEPTH_TEST_SHIFT)
    }

    #[inline]
    pub const fn cull_test_bits(self) -> u8 {
        decode(self.0, CULL_TEST_MASK, CULL_TEST_SHIFT)
    }

    #[inline]
    pub const fn primitive_bits(self) -> u8 {
        decode(self.0, PRIMITIVE_MASK, PRIMITIVE_SHIFT)
    }

    #[inline]
    pub const fn polygon_bits(self) -> u8 {
        decode(self.0, POLYGON_MASK, POLYGON_SHIFT)
    }

    pub fn depth_test(self) -> Option<DepthTest> {
        DepthTest::try_from(self.depth_test_bits()).ok()
    }

    pub fn cull_test(self) -> Option<CullTest> {
        CullTest::try_from(self.cull_test_bits()).ok()
    }

    pub fn primitive(self) -> Option<PrimitiveType> {
        PrimitiveType::try_from(self.primitive_bits()).ok()
    }

    pub fn polygon(self) -> Option<Polygon> {
        Polygon::try_from(self.polygon_bits()).ok()
    }

    pub const fn point_size(self) -> u8 {
        decode(self.0, POINT_SIZE_MASK, POINT_SIZE_SHIFT)
    }

    pub const fn line_width(self) -> u8 {
        decode(self.0, LINE_WIDTH_MASK, LINE_WIDTH_SHIFT)
    }
}

impl Default for StateFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Debug for StateFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StateFlags({:#018x})", self.0)
    }
}
