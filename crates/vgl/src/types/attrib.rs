u8_enum! {
    /// Vertex attribute semantic. Doubles as the fixed shader location.
    pub enum Attrib {
        Position = 0x00,
        Normal = 0x01,
        Tangent = 0x02,
        Bitangent = 0x03,
        Color0 = 0x04,
        Color1 = 0x05,
        Color2 = 0x06,
        Color3 = 0x07,
        Indices = 0x08,
        Weight = 0x09,
        TexCoord0 = 0x0a,
        TexCoord1 = 0x0b,
        TexCoord2 = 0x0c,
        TexCoord3 = 0x0d,
        TexCoord4 = 0x0e,
        TexCoord5 = 0x0f,
    }
}

u8_enum! {
    /// Element type of a vertex attribute.
    pub enum AttribType {
        Int8 = 0,
        Int16 = 1,
        Int32 = 2,
        Uint8 = 3,
        Uint16 = 4,
        Uint32 = 5,
        Half = 6,
        Float = 7,
        Double = 8,
    }
}

impl AttribType {
    /// Byte width of one component.
    pub const fn size(self) -> u16 {
        match self {
            AttribType::Int8 | AttribType::Uint8 => 1,
            AttribType::Int16 | AttribType::Uint16 | AttribType::Half => 2,
            AttribType::Int32 | AttribType::Uint32 | AttribType::Float => 4,
            AttribType::Double => 8,
        }
    }

    /// Integer types bind through the integer attribute path (never normalized).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            AttribType::Int8
                | AttribType::Int16
                | AttribType::Int32
                | AttribType::Uint8
                | AttribType::Uint16
                | AttribType::Uint32
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrib_try_from_roundtrips_every_variant() {
        for a in Attrib::ALL {
            assert_eq!(Attrib::try_from(a.as_u8()), Ok(*a));
        }
        assert_eq!(Attrib::try_from(Attrib::COUNT), Err(0x10));
    }

    #[test]
    fn type_sizes() {
        assert_eq!(AttribType::Float.size(), 4);
        assert_eq!(AttribType::Half.size(), 2);
        assert_eq!(AttribType::Double.size(), 8);
        assert!(AttribType::Uint16.is_integer());
        assert!(!AttribType::Half.is_integer());
    }
}
