u8_enum! {
    /// GLSL type of a uniform value.
    pub enum UniformType {
        Int32 = 0x00,
        Uint32 = 0x01,
        Float = 0x02,
        Double = 0x03,
        IVec2 = 0x04,
        IVec3 = 0x05,
        IVec4 = 0x06,
        UVec2 = 0x07,
        UVec3 = 0x08,
        UVec4 = 0x09,
        Vec2 = 0x0a,
        Vec3 = 0x0b,
        Vec4 = 0x0c,
        DVec2 = 0x0d,
        DVec3 = 0x0e,
        DVec4 = 0x0f,
        Mat2 = 0x10,
        Mat2x3 = 0x11,
        Mat2x4 = 0x12,
        Mat3x2 = 0x13,
        Mat3 = 0x14,
        Mat3x4 = 0x15,
        Mat4x2 = 0x16,
        Mat4x3 = 0x17,
        Mat4 = 0x18,
        Sampler1D = 0x19,
        Sampler2D = 0x1a,
        Sampler3D = 0x1b,
        SamplerCube = 0x1c,
        Sampler2DRect = 0x1d,
        Sampler1DArray = 0x1e,
        Sampler2DArray = 0x1f,
        SamplerCubeArray = 0x20,
        SamplerBuffer = 0x21,
        Sampler1DShadow = 0x22,
        Sampler2DShadow = 0x23,
        SamplerCubeShadow = 0x24,
        Sampler2DRectShadow = 0x25,
        Sampler1DArrayShadow = 0x26,
        Sampler2DArrayShadow = 0x27,
        SamplerCubeArrayShadow = 0x28,
    }
}

impl UniformType {
    /// Byte width of one element.
    pub const fn size(self) -> usize {
        use UniformType::*;
        match self {
            Int32 | Uint32 | Float => 4,
            Double => 8,
            IVec2 | UVec2 | Vec2 => 8,
            IVec3 | UVec3 | Vec3 => 12,
            IVec4 | UVec4 | Vec4 => 16,
            DVec2 => 16,
            DVec3 => 24,
            DVec4 => 32,
            Mat2 => 16,
            Mat2x3 | Mat3x2 => 24,
            Mat2x4 | Mat4x2 => 32,
            Mat3 => 36,
            Mat3x4 | Mat4x3 => 48,
            Mat4 => 64,
            _ => 4,
        }
    }

    pub const fn is_sampler(self) -> bool {
        self as u8 >= UniformType::Sampler1D as u8
    }

    pub const fn is_matrix(self) -> bool {
        let v = self as u8;
        v >= UniformType::Mat2 as u8 && v <= UniformType::Mat4 as u8
    }

    /// Double-precision types.
    pub const fn is_f64(self) -> bool {
        matches!(
            self,
            UniformType::Double | UniformType::DVec2 | UniformType::DVec3 | UniformType::DVec4
        )
    }
}
