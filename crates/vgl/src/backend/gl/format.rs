//! Translation of vgl enums and packed words into GL enums.
//!
//! Everything here is pure; nothing touches a GL context.

use crate::types::{
    AttachmentSlot, AttribType, CullTest, DepthTest, Polygon, PrimitiveType, StateFlags, StencilOp,
    StencilTest, TexCompare, TexFilter, TexFormat, TexLayout, TexTarget, TexWrap, TextureFlags,
};

/// GL triple for a [`TexFormat`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) struct GlFormat {
    /// Sized internal format. `None` for layouts GL can only upload from.
    pub internal: Option<u32>,
    pub format: u32,
    pub ty: u32,
}

/// Component type per colour variant: `U8, I8, U16, I16, F16, U32, I32, F32`.
const COLOUR_TYPES: [u32; 8] = [
    glow::UNSIGNED_BYTE,
    glow::BYTE,
    glow::UNSIGNED_SHORT,
    glow::SHORT,
    glow::HALF_FLOAT,
    glow::UNSIGNED_INT,
    glow::INT,
    glow::FLOAT,
];

/// Sized internal formats per layout, in colour-variant order.
const R_INTERNAL: [u32; 8] = [
    glow::R8,
    glow::R8_SNORM,
    glow::R16,
    glow::R16_SNORM,
    glow::R16F,
    glow::R32UI,
    glow::R32I,
    glow::R32F,
];
const RG_INTERNAL: [u32; 8] = [
    glow::RG8,
    glow::RG8_SNORM,
    glow::RG16,
    glow::RG16_SNORM,
    glow::RG16F,
    glow::RG32UI,
    glow::RG32I,
    glow::RG32F,
];
const RGB_INTERNAL: [u32; 8] = [
    glow::RGB8,
    glow::RGB8_SNORM,
    glow::RGB16,
    glow::RGB16_SNORM,
    glow::RGB16F,
    glow::RGB32UI,
    glow::RGB32I,
    glow::RGB32F,
];
const RGBA_INTERNAL: [u32; 8] = [
    glow::RGBA8,
    glow::RGBA8_SNORM,
    glow::RGBA16,
    glow::RGBA16_SNORM,
    glow::RGBA16F,
    glow::RGBA32UI,
    glow::RGBA32I,
    glow::RGBA32F,
];

pub(super) fn tex_format(f: TexFormat) -> GlFormat {
    let v = f.as_u8() as usize;
    let variant = v & 7;
    // 32-bit integer variants go through the *_INTEGER upload path.
    let integer = variant == 5 || variant == 6;
    let pick = |plain: u32, int: u32| if integer { int } else { plain };

    match f.info().layout {
        TexLayout::R => GlFormat {
            internal: Some(R_INTERNAL[variant]),
            format: pick(glow::RED, glow::RED_INTEGER),
            ty: COLOUR_TYPES[variant],
        },
        TexLayout::RG => GlFormat {
            internal: Some(RG_INTERNAL[variant]),
            format: pick(glow::RG, glow::RG_INTEGER),
            ty: COLOUR_TYPES[variant],
        },
        TexLayout::RGB => GlFormat {
            internal: Some(RGB_INTERNAL[variant]),
            format: pick(glow::RGB, glow::RGB_INTEGER),
            ty: COLOUR_TYPES[variant],
        },
        TexLayout::RGBA => GlFormat {
            internal: Some(RGBA_INTERNAL[variant]),
            format: pick(glow::RGBA, glow::RGBA_INTEGER),
            ty: COLOUR_TYPES[variant],
        },
        TexLayout::BGR => GlFormat { internal: None, format: glow::BGR, ty: COLOUR_TYPES[variant] },
        TexLayout::BGRA => GlFormat { internal: None, format: glow::BGRA, ty: COLOUR_TYPES[variant] },
        TexLayout::Depth => GlFormat {
            internal: Some(match f {
                TexFormat::D16F => glow::DEPTH_COMPONENT16,
                TexFormat::D24F => glow::DEPTH_COMPONENT24,
                _ => glow::DEPTH_COMPONENT32F,
            }),
            format: glow::DEPTH_COMPONENT,
            ty: glow::FLOAT,
        },
        TexLayout::DepthStencil => match f {
            TexFormat::D24FS8U => GlFormat {
                internal: Some(glow::DEPTH24_STENCIL8),
                format: glow::DEPTH_STENCIL,
                ty: glow::UNSIGNED_INT_24_8,
            },
            _ => GlFormat {
                internal: Some(glow::DEPTH32F_STENCIL8),
                format: glow::DEPTH_STENCIL,
                ty: glow::FLOAT_32_UNSIGNED_INT_24_8_REV,
            },
        },
        TexLayout::Stencil => match f {
            TexFormat::S8U => GlFormat {
                internal: Some(glow::STENCIL_INDEX8),
                format: glow::STENCIL_INDEX,
                ty: glow::UNSIGNED_BYTE,
            },
            _ => GlFormat {
                internal: Some(glow::STENCIL_INDEX16),
                format: glow::STENCIL_INDEX,
                ty: glow::UNSIGNED_SHORT,
            },
        },
    }
}

pub(super) const fn tex_target(t: TexTarget) -> u32 {
    match t {
        TexTarget::T1D => glow::TEXTURE_1D,
        TexTarget::T2D => glow::TEXTURE_2D,
        TexTarget::T3D => glow::TEXTURE_3D,
        TexTarget::Cube => glow::TEXTURE_CUBE_MAP,
        TexTarget::T1DArray => glow::TEXTURE_1D_ARRAY,
        TexTarget::T2DArray => glow::TEXTURE_2D_ARRAY,
        TexTarget::CubeArray => glow::TEXTURE_CUBE_MAP_ARRAY,
    }
}

const fn tex_wrap(w: TexWrap) -> u32 {
    match w {
        TexWrap::Repeat => glow::REPEAT,
        TexWrap::Mirror => glow::MIRRORED_REPEAT,
        TexWrap::Clamp => glow::CLAMP_TO_EDGE,
        TexWrap::Border => glow::CLAMP_TO_BORDER,
    }
}

const fn mag_filter(f: TexFilter) -> u32 {
    match f {
        TexFilter::Nearest => glow::NEAREST,
        TexFilter::Linear => glow::LINEAR,
    }
}

/// Minification filter from the min and mip filters. Mip selection only
/// matters when the texture has mips.
const fn min_filter(min: TexFilter, mip: TexFilter, use_mips: bool) -> u32 {
    match (use_mips, min, mip) {
        (false, TexFilter::Nearest, _) => glow::NEAREST,
        (false, TexFilter::Linear, _) => glow::LINEAR,
        (true, TexFilter::Nearest, TexFilter::Nearest) => glow::NEAREST_MIPMAP_NEAREST,
        (true, TexFilter::Linear, TexFilter::Nearest) => glow::LINEAR_MIPMAP_NEAREST,
        (true, TexFilter::Nearest, TexFilter::Linear) => glow::NEAREST_MIPMAP_LINEAR,
        (true, TexFilter::Linear, TexFilter::Linear) => glow::LINEAR_MIPMAP_LINEAR,
    }
}

/// Sampler parameters decoded from [`TextureFlags`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct SamplerParams {
    /// Compare function, `None` when comparison is off.
    pub compare: Option<u32>,
    pub wrap: [u32; 3],
    pub mag_filter: u32,
    pub min_filter: u32,
    /// Only applied when some axis clamps to the border.
    pub border_colour: Option<[f32; 4]>,
}

fn or_default<T: std::fmt::Debug>(v: Option<T>, default: T, what: &str) -> T {
    v.unwrap_or_else(|| {
        log::warn!("invalid {what}, using {default:?}");
        default
    })
}

/// Out-of-range fields fall back to repeat wrap, nearest filtering and no
/// comparison, with a warning.
pub(super) fn sampler_params(flags: TextureFlags, use_mips: bool) -> SamplerParams {
    let compare = match or_default(flags.compare(), TexCompare::None, "texture compare") {
        TexCompare::None => None,
        c => Some(compare_func(c)),
    };
    let wrap = [
        tex_wrap(or_default(flags.wrap_u(), TexWrap::Repeat, "texture wrap u")),
        tex_wrap(or_default(flags.wrap_v(), TexWrap::Repeat, "texture wrap v")),
        tex_wrap(or_default(flags.wrap_w(), TexWrap::Repeat, "texture wrap w")),
    ];
    let min = or_default(flags.min_filter(), TexFilter::Nearest, "texture min filter");
    let mip = or_default(flags.mip_filter(), TexFilter::Nearest, "texture mip filter");
    let mag = or_default(flags.mag_filter(), TexFilter::Nearest, "texture mag filter");

    let border_colour = flags.uses_border().then(|| {
        let c = flags.border_colour();
        [
            ((c >> 24) & 0xff) as f32 / 255.0,
            ((c >> 16) & 0xff) as f32 / 255.0,
            ((c >> 8) & 0xff) as f32 / 255.0,
            (c & 0xff) as f32 / 255.0,
        ]
    });

    SamplerParams {
        compare,
        wrap,
        mag_filter: mag_filter(mag),
        min_filter: min_filter(min, mip, use_mips),
        border_colour,
    }
}

const fn compare_func(c: TexCompare) -> u32 {
    match c {
        TexCompare::Less | TexCompare::None => glow::LESS,
        TexCompare::Lequal => glow::LEQUAL,
        TexCompare::Equal => glow::EQUAL,
        TexCompare::Gequal => glow::GEQUAL,
        TexCompare::Greater => glow::GREATER,
        TexCompare::NotEqual => glow::NOTEQUAL,
        TexCompare::Never => glow::NEVER,
        TexCompare::Always => glow::ALWAYS,
    }
}

// ── pipeline state ───────────────────────────────────────────────────────

/// Depth function, `None` when the test is disabled.
/// Pipeline state of one draw in GL terms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct DrawState {
    /// `None` disables the depth test.
    pub depth_func: Option<u32>,
    /// `None` disables face culling.
    pub front_face: Option<u32>,
    pub mode: u32,
    pub polygon_mode: u32,
    pub line_width: f32,
}

/// Out-of-range fields fall back to depth `Less`, cull `Ccw`, triangles and
/// fill, with a warning.
pub(super) fn draw_state(state: StateFlags) -> DrawState {
    let depth = or_default(state.depth_test(), DepthTest::Less, "depth test");
    let cull = or_default(state.cull_test(), CullTest::Ccw, "cull test");
    let prim = or_default(state.primitive(), PrimitiveType::Triangles, "primitive");
    let polygon = or_default(state.polygon(), Polygon::Fill, "polygon mode");
    DrawState {
        depth_func: depth_func(depth),
        front_face: front_face(cull),
        mode: primitive(prim),
        polygon_mode: polygon_mode(polygon),
        line_width: state.line_width().max(1) as f32,
    }
}

pub(super) const fn depth_func(d: DepthTest) -> Option<u32> {
    match d {
        DepthTest::Disabled => None,
        DepthTest::Less => Some(glow::LESS),
        DepthTest::Lequal => Some(glow::LEQUAL),
        DepthTest::Equal => Some(glow::EQUAL),
        DepthTest::Gequal => Some(glow::GEQUAL),
        DepthTest::Greater => Some(glow::GREATER),
        DepthTest::NotEqual => Some(glow::NOTEQUAL),
        DepthTest::Never => Some(glow::NEVER),
        DepthTest::Always => Some(glow::ALWAYS),
    }
}

/// Front-face winding for back-face culling, `None` when culling is off.
///
/// The cull test names the winding that gets culled, so `Cw` keeps
/// counter-clockwise faces.
pub(super) const fn front_face(c: CullTest) -> Option<u32> {
    match c {
        CullTest::Disabled => None,
        CullTest::Cw => Some(glow::CCW),
        CullTest::Ccw => Some(glow::CW),
    }
}

pub(super) const fn primitive(p: PrimitiveType) -> u32 {
    match p {
        PrimitiveType::Points => glow::POINTS,
        PrimitiveType::LineStrip => glow::LINE_STRIP,
        PrimitiveType::LineLoop => glow::LINE_LOOP,
        PrimitiveType::Lines => glow::LINES,
        PrimitiveType::LineStripAdjacency => glow::LINE_STRIP_ADJACENCY,
        PrimitiveType::LinesAdjacency => glow::LINES_ADJACENCY,
        PrimitiveType::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveType::TriangleFan => glow::TRIANGLE_FAN,
        PrimitiveType::Triangles => glow::TRIANGLES,
        PrimitiveType::TriangleStripAdjacency => glow::TRIANGLE_STRIP_ADJACENCY,
        PrimitiveType::TrianglesAdjacency => glow::TRIANGLES_ADJACENCY,
    }
}

pub(super) const fn polygon_mode(p: Polygon) -> u32 {
    match p {
        Polygon::Fill => glow::FILL,
        Polygon::Line => glow::LINE,
        Polygon::Point => glow::POINT,
    }
}

/// Stencil function, `None` when the face's test is disabled.
pub(super) const fn stencil_func(t: StencilTest) -> Option<u32> {
    match t {
        StencilTest::Disable => None,
        StencilTest::Less => Some(glow::LESS),
        StencilTest::Lequal => Some(glow::LEQUAL),
        StencilTest::Equal => Some(glow::EQUAL),
        StencilTest::Gequal => Some(glow::GEQUAL),
        StencilTest::Greater => Some(glow::GREATER),
        StencilTest::NotEqual => Some(glow::NOTEQUAL),
        StencilTest::Never => Some(glow::NEVER),
        StencilTest::Always => Some(glow::ALWAYS),
    }
}

pub(super) const fn stencil_op(op: StencilOp) -> u32 {
    match op {
        StencilOp::Zero => glow::ZERO,
        StencilOp::Keep => glow::KEEP,
        StencilOp::Replace => glow::REPLACE,
        StencilOp::Incr => glow::INCR_WRAP,
        StencilOp::IncrSat => glow::INCR,
        StencilOp::Decr => glow::DECR_WRAP,
        StencilOp::DecrSat => glow::DECR,
        StencilOp::Invert => glow::INVERT,
    }
}

// ── vertex input ─────────────────────────────────────────────────────────

pub(super) const fn attrib_type(t: AttribType) -> u32 {
    match t {
        AttribType::Int8 => glow::BYTE,
        AttribType::Int16 => glow::SHORT,
        AttribType::Int32 => glow::INT,
        AttribType::Uint8 => glow::UNSIGNED_BYTE,
        AttribType::Uint16 => glow::UNSIGNED_SHORT,
        AttribType::Uint32 => glow::UNSIGNED_INT,
        AttribType::Half => glow::HALF_FLOAT,
        AttribType::Float => glow::FLOAT,
        AttribType::Double => glow::DOUBLE,
    }
}

// ── framebuffers ─────────────────────────────────────────────────────────

pub(super) const fn attachment_point(slot: AttachmentSlot) -> u32 {
    match slot {
        AttachmentSlot::Depth => glow::DEPTH_ATTACHMENT,
        AttachmentSlot::Stencil => glow::STENCIL_ATTACHMENT,
        AttachmentSlot::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
        colour => glow::COLOR_ATTACHMENT0 + colour as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn colour_formats_pick_variant_columns() {
        let f = tex_format(TexFormat::RGBA8U);
        assert_eq!(f, GlFormat {
            internal: Some(glow::RGBA8),
            format: glow::RGBA,
            ty: glow::UNSIGNED_BYTE,
        });
        assert_eq!(tex_format(TexFormat::R16F).internal, Some(glow::R16F));
        assert_eq!(tex_format(TexFormat::RG8I).ty, glow::BYTE);
        assert_eq!(tex_format(TexFormat::RGB32F).format, glow::RGB);
    }

    #[test]
    fn integer_formats_use_integer_upload() {
        assert_eq!(tex_format(TexFormat::R32U).format, glow::RED_INTEGER);
        assert_eq!(tex_format(TexFormat::RGBA32I).format, glow::RGBA_INTEGER);
        assert_eq!(tex_format(TexFormat::RGBA32I).internal, Some(glow::RGBA32I));
        assert_eq!(tex_format(TexFormat::RGBA16U).format, glow::RGBA);
    }

    #[test]
    fn bgr_has_no_internal_format() {
        assert_eq!(tex_format(TexFormat::BGRA8U).internal, None);
        assert_eq!(tex_format(TexFormat::BGRA8U).format, glow::BGRA);
        assert_eq!(tex_format(TexFormat::BGR32F).ty, glow::FLOAT);
    }

    #[test]
    fn depth_and_stencil_formats() {
        assert_eq!(tex_format(TexFormat::D24F).internal, Some(glow::DEPTH_COMPONENT24));
        assert_eq!(tex_format(TexFormat::D24FS8U).ty, glow::UNSIGNED_INT_24_8);
        assert_eq!(tex_format(TexFormat::D32FS8U).internal, Some(glow::DEPTH32F_STENCIL8));
        assert_eq!(tex_format(TexFormat::S8U).format, glow::STENCIL_INDEX);
    }

    #[test]
    fn every_format_maps() {
        for f in TexFormat::ALL {
            let gl = tex_format(*f);
            assert_ne!(gl.format, 0, "{f:?}");
            assert_ne!(gl.ty, 0, "{f:?}");
        }
    }

    #[test]
    fn min_filter_follows_mips() {
        use TexFilter::*;
        assert_eq!(min_filter(Linear, Linear, false), glow::LINEAR);
        assert_eq!(min_filter(Linear, Linear, true), glow::LINEAR_MIPMAP_LINEAR);
        assert_eq!(min_filter(Nearest, Linear, true), glow::NEAREST_MIPMAP_LINEAR);
        assert_eq!(min_filter(Linear, Nearest, true), glow::LINEAR_MIPMAP_NEAREST);
    }

    #[test]
    fn default_sampler() {
        let p = sampler_params(TextureFlags::DEFAULT, false);
        assert_eq!(p.compare, None);
        assert_eq!(p.wrap, [glow::REPEAT; 3]);
        assert_eq!(p.mag_filter, glow::NEAREST);
        assert_eq!(p.min_filter, glow::NEAREST);
        assert_eq!(p.border_colour, None);
    }

    #[test]
    fn border_colour_only_with_border_wrap() {
        let flags = TextureFlags::DEFAULT
            .with_wrap_v(TexWrap::Border)
            .with_border_colour(0xff00_00ff)
            .with_compare(TexCompare::Lequal);
        let p = sampler_params(flags, true);
        assert_eq!(p.wrap[1], glow::CLAMP_TO_BORDER);
        assert_eq!(p.border_colour, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(p.compare, Some(glow::LEQUAL));
    }

    #[test]
    fn invalid_sampler_fields_fall_back() {
        // Wrap U nibble 0xf is out of range.
        let p = sampler_params(TextureFlags::from_bits(0xf0), false);
        assert_eq!(p.wrap[0], glow::REPEAT);
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[test]
    fn state_tables() {
        assert_eq!(depth_func(DepthTest::Disabled), None);
        assert_eq!(depth_func(DepthTest::Gequal), Some(glow::GEQUAL));
        assert_eq!(front_face(CullTest::Cw), Some(glow::CCW));
        assert_eq!(front_face(CullTest::Ccw), Some(glow::CW));
        assert_eq!(primitive(PrimitiveType::TrianglesAdjacency), glow::TRIANGLES_ADJACENCY);
        assert_eq!(polygon_mode(Polygon::Line), glow::LINE);
        assert_eq!(stencil_func(StencilTest::Disable), None);
        assert_eq!(stencil_op(StencilOp::IncrSat), glow::INCR);
    }

    #[test]
    fn default_state_decodes() {
        let s = draw_state(StateFlags::DEFAULT);
        assert_eq!(s.depth_func, Some(glow::LESS));
        assert_eq!(s.front_face, Some(glow::CCW));
        assert_eq!((s.mode, s.polygon_mode, s.line_width), (glow::TRIANGLES, glow::FILL, 1.0));
    }

    #[test]
    fn invalid_state_fields_fall_back() {
        // Every field nibble set to 0xf.
        let s = draw_state(StateFlags::from_bits(0xffff));
        assert_eq!(s.depth_func, Some(glow::LESS));
        assert_eq!(s.front_face, front_face(CullTest::Ccw));
        assert_eq!(s.front_face, Some(glow::CW));
        assert_eq!(s.mode, glow::TRIANGLES);
        assert_eq!(s.polygon_mode, glow::FILL);
    }

    #[test]
    fn zero_line_width_draws_one_pixel() {
        let s = draw_state(StateFlags::DEFAULT.with_line_width(0).with_cull_test(CullTest::Disabled));
        assert_eq!(s.line_width, 1.0);
        assert_eq!(s.front_face, None);
    }

    #[test]
    fn attachment_points() {
        assert_eq!(attachment_point(AttachmentSlot::Colour0), glow::COLOR_ATTACHMENT0);
        assert_eq!(attachment_point(AttachmentSlot::Colour5), glow::COLOR_ATTACHMENT0 + 5);
        assert_eq!(
            attachment_point(AttachmentSlot::DepthStencil),
            glow::DEPTH_STENCIL_ATTACHMENT
        );
    }
}
