//! Demo scenes. Each one owns its resources and records one frame's draws
//! per `update`.

use anyhow::{Result, bail};
use bytemuck::{Pod, Zeroable};
use vgl::handle::Handle;
use vgl::types::{
    Attrib, AttribType, BufferFlags, ClearFlags, CullTest, DepthTest, DiscardFlags, ShaderType,
    StateFlags, TexFilter, TexFormat, TexWrap, TextureFlags, UniformType,
};
use vgl::{
    Context, FrameBufferHandle, IndexBufferHandle, ProgramHandle, TextureHandle,
    VertexBufferHandle, VertexLayout,
};

pub trait Scene {
    fn name(&self) -> &'static str;
    fn init(&mut self, ctx: &mut Context) -> Result<()>;
    /// Records the draws for one frame. `time` is in seconds since start.
    fn update(&mut self, ctx: &Context, time: f32);
    fn release(&mut self, ctx: &mut Context);
}

pub const NAMES: [&str; 5] = ["clear", "triangle", "cube", "texture", "framebuffer"];

pub fn by_name(name: &str) -> Option<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match name {
        "clear" => Box::new(Clear),
        "triangle" => Box::<Triangle>::default(),
        "cube" => Box::<Cube>::default(),
        "texture" => Box::<Textured>::default(),
        "framebuffer" => Box::<Offscreen>::default(),
        _ => return None,
    };
    Some(scene)
}

// ── shared geometry and shaders ──────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PosColour {
    pos: [f32; 3],
    abgr: u32,
}

impl PosColour {
    const fn new(x: f32, y: f32, z: f32, abgr: u32) -> Self {
        Self { pos: [x, y, z], abgr }
    }

    fn layout() -> VertexLayout {
        VertexLayout::builder()
            .add(Attrib::Position, AttribType::Float, 3, 1, false, false)
            .add(Attrib::Color0, AttribType::Uint8, 4, 1, true, false)
            .end()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PosUv {
    pos: [f32; 3],
    uv: [f32; 2],
}

impl PosUv {
    fn layout() -> VertexLayout {
        VertexLayout::builder()
            .add(Attrib::Position, AttribType::Float, 3, 1, false, false)
            .add(Attrib::TexCoord0, AttribType::Float, 2, 1, false, false)
            .end()
    }
}

const VS_COLOUR: &str = r#"#version 330 core
layout(location = 0) in vec3 a_position;
layout(location = 4) in vec4 a_color0;
uniform mat4 u_mvp;
out vec4 v_color;
void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color0;
}
"#;

const FS_COLOUR: &str = r#"#version 330 core
in vec4 v_color;
out vec4 o_color;
void main() { o_color = v_color; }
"#;

const VS_TEXTURED: &str = r#"#version 330 core
layout(location = 0) in vec3 a_position;
layout(location = 10) in vec2 a_texcoord0;
out vec2 v_uv;
void main() {
    gl_Position = vec4(a_position, 1.0);
    v_uv = a_texcoord0;
}
"#;

const FS_TEXTURED: &str = r#"#version 330 core
uniform sampler2D s_tex;
in vec2 v_uv;
out vec4 o_color;
void main() { o_color = texture(s_tex, v_uv); }
"#;

const QUAD: [PosUv; 4] = [
    PosUv { pos: [-0.8, -0.8, 0.0], uv: [0.0, 0.0] },
    PosUv { pos: [0.8, -0.8, 0.0], uv: [1.0, 0.0] },
    PosUv { pos: [0.8, 0.8, 0.0], uv: [1.0, 1.0] },
    PosUv { pos: [-0.8, 0.8, 0.0], uv: [0.0, 1.0] },
];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

const TRIANGLE: [PosColour; 3] = [
    PosColour::new(0.0, 0.6, 0.0, 0xff0000ff),
    PosColour::new(-0.6, -0.6, 0.0, 0xff00ff00),
    PosColour::new(0.6, -0.6, 0.0, 0xffff0000),
];

fn check<H: Handle>(handle: H, what: &str) -> Result<H> {
    if !handle.is_valid() {
        bail!("failed to create {what}");
    }
    Ok(handle)
}

/// Links a program and hands shader ownership to it.
fn load_program(ctx: &mut Context, vs: &str, fs: &str) -> Result<ProgramHandle> {
    let vert = check(ctx.create_shader(ShaderType::Vertex, vs), "vertex shader")?;
    let frag = check(ctx.create_shader(ShaderType::Fragment, fs), "fragment shader")?;
    let program = ctx.create_program(vert, frag);
    ctx.destroy(vert);
    ctx.destroy(frag);
    check(program, "program")
}

/// Static vertex buffer over `vertices`, owning its layout.
fn load_vertices<V: Pod>(
    ctx: &mut Context,
    layout: &VertexLayout,
    vertices: &[V],
) -> Result<VertexBufferHandle> {
    let lh = check(ctx.create_vertex_layout(layout), "vertex layout")?;
    let vb = ctx.create_vertex_buffer(bytemuck::cast_slice(vertices), lh, BufferFlags::empty());
    // The buffer holds its own reference to the layout.
    ctx.destroy(lh);
    check(vb, "vertex buffer")
}

fn load_indices(ctx: &mut Context, indices: &[u16]) -> Result<IndexBufferHandle> {
    let ib = ctx.create_index_buffer(bytemuck::cast_slice(indices), BufferFlags::empty());
    check(ib, "index buffer")
}

fn destroy_all<H: vgl::context::Resource>(ctx: &mut Context, handles: impl IntoIterator<Item = H>) {
    for h in handles {
        if h.is_valid() {
            ctx.destroy(h);
        }
    }
}

// ── matrices (column major) ──────────────────────────────────────────────

type Mat4 = [f32; 16];

const IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    out
}

fn rotate_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let mut m = IDENTITY;
    m[0] = c;
    m[1] = s;
    m[4] = -s;
    m[5] = c;
    m
}

fn rotate_xy(ax: f32, ay: f32) -> Mat4 {
    let (sx, cx) = ax.sin_cos();
    let (sy, cy) = ay.sin_cos();
    [
        cy, sx * sy, -cx * sy, 0.0, //
        0.0, cx, sx, 0.0, //
        sy, -sx * cy, cx * cy, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = IDENTITY;
    m[12] = x;
    m[13] = y;
    m[14] = z;
    m
}

fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fovy * 0.5).tan();
    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    let mut m = [0.0; 16];
    m[0] = f / aspect;
    m[5] = f;
    m[10] = (far + near) / (near - far);
    m[11] = -1.0;
    m[14] = 2.0 * far * near / (near - far);
    m
}

// ── clear ────────────────────────────────────────────────────────────────

struct Clear;

impl Scene for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn init(&mut self, ctx: &mut Context) -> Result<()> {
        ctx.set_view_clear(0, ClearFlags::ALL, 0x3070b0ff, 1.0, 0);
        Ok(())
    }

    fn update(&mut self, ctx: &Context, _time: f32) {
        // Nothing drawn; the touch alone makes view 0 clear.
        if let Some(mut enc) = ctx.begin() {
            enc.touch(0);
        }
    }

    fn release(&mut self, ctx: &mut Context) {
        ctx.reset_view(0);
    }
}

// ── triangle ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Triangle {
    vb: Option<VertexBufferHandle>,
    program: Option<ProgramHandle>,
}

impl Scene for Triangle {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn init(&mut self, ctx: &mut Context) -> Result<()> {
        let vb = load_vertices(ctx, &PosColour::layout(), &TRIANGLE)?;
        self.vb = Some(vb);
        self.program = Some(load_program(ctx, VS_COLOUR, FS_COLOUR)?);
        Ok(())
    }

    fn update(&mut self, ctx: &Context, time: f32) {
        let (Some(vb), Some(program)) = (self.vb, self.program) else {
            return;
        };
        let Some(mut enc) = ctx.begin() else {
            return;
        };
        enc.set_vertex_buffer_whole(0, vb);
        enc.set_uniform("u_mvp", UniformType::Mat4, &rotate_z(time), 1, false);
        enc.set_state(StateFlags::DEFAULT.with_cull_test(CullTest::Disabled));
        enc.submit(0, program, DiscardFlags::ALL);
    }

    fn release(&mut self, ctx: &mut Context) {
        destroy_all(ctx, self.vb.take());
        destroy_all(ctx, self.program.take());
    }
}

// ── cube ─────────────────────────────────────────────────────────────────

const CUBE: [PosColour; 8] = [
    PosColour::new(-1.0, 1.0, 1.0, 0xff000000),
    PosColour::new(1.0, 1.0, 1.0, 0xff0000ff),
    PosColour::new(-1.0, -1.0, 1.0, 0xff00ff00),
    PosColour::new(1.0, -1.0, 1.0, 0xff00ffff),
    PosColour::new(-1.0, 1.0, -1.0, 0xffff0000),
    PosColour::new(1.0, 1.0, -1.0, 0xffff00ff),
    PosColour::new(-1.0, -1.0, -1.0, 0xffffff00),
    PosColour::new(1.0, -1.0, -1.0, 0xffffffff),
];

const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 1, 3, 2, //
    4, 6, 5, 5, 6, 7, //
    0, 2, 4, 4, 2, 6, //
    1, 5, 3, 5, 7, 3, //
    0, 4, 1, 4, 5, 1, //
    2, 3, 6, 6, 3, 7,
];

#[derive(Default)]
struct Cube {
    vb: Option<VertexBufferHandle>,
    ib: Option<IndexBufferHandle>,
    program: Option<ProgramHandle>,
}

impl Scene for Cube {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn init(&mut self, ctx: &mut Context) -> Result<()> {
        let vb = load_vertices(ctx, &PosColour::layout(), &CUBE)?;
        self.vb = Some(vb);
        self.ib = Some(load_indices(ctx, &CUBE_INDICES)?);
        self.program = Some(load_program(ctx, VS_COLOUR, FS_COLOUR)?);
        Ok(())
    }

    fn update(&mut self, ctx: &Context, time: f32) {
        let (Some(vb), Some(ib), Some(program)) = (self.vb, self.ib, self.program) else {
            return;
        };
        let Some(mut enc) = ctx.begin() else {
            return;
        };
        let proj = perspective(60f32.to_radians(), ctx.resolution().aspect(), 0.1, 100.0);
        let model = mul(&translate(0.0, 0.0, -5.0), &rotate_xy(time * 0.7, time));
        enc.set_vertex_buffer_whole(0, vb);
        enc.set_index_buffer_whole(ib);
        enc.set_uniform("u_mvp", UniformType::Mat4, &mul(&proj, &model), 1, false);
        enc.set_state(
            StateFlags::DEFAULT
                .with_depth_test(DepthTest::Less)
                .with_cull_test(CullTest::Cw),
        );
        enc.submit(0, program, DiscardFlags::ALL);
    }

    fn release(&mut self, ctx: &mut Context) {
        destroy_all(ctx, self.vb.take());
        destroy_all(ctx, self.ib.take());
        destroy_all(ctx, self.program.take());
    }
}

// ── texture ──────────────────────────────────────────────────────────────

fn checkerboard(size: u16, cell: u16) -> Vec<u8> {
    let mut texels = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let on = (x / cell + y / cell) % 2 == 0;
            let v = if on { 0xff } else { 0x20 };
            texels.extend_from_slice(&[v, v, v, 0xff]);
        }
    }
    texels
}

#[derive(Default)]
struct Textured {
    vb: Option<VertexBufferHandle>,
    ib: Option<IndexBufferHandle>,
    texture: Option<TextureHandle>,
    program: Option<ProgramHandle>,
}

impl Scene for Textured {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn init(&mut self, ctx: &mut Context) -> Result<()> {
        let vb = load_vertices(ctx, &PosUv::layout(), &QUAD)?;
        self.vb = Some(vb);
        self.ib = Some(load_indices(ctx, &QUAD_INDICES)?);
        let flags = TextureFlags::DEFAULT
            .with_filter(TexFilter::Nearest)
            .with_wrap(TexWrap::Clamp);
        let texels = checkerboard(64, 8);
        let texture = ctx.create_texture_2d(
            64,
            64,
            1,
            true,
            TexFormat::RGBA8U,
            TexFormat::RGBA8U,
            flags,
            Some(&texels),
        );
        self.texture = Some(check(texture, "checkerboard texture")?);
        self.program = Some(load_program(ctx, VS_TEXTURED, FS_TEXTURED)?);
        Ok(())
    }

    fn update(&mut self, ctx: &Context, _time: f32) {
        let (Some(vb), Some(ib), Some(texture), Some(program)) =
            (self.vb, self.ib, self.texture, self.program)
        else {
            return;
        };
        let Some(mut enc) = ctx.begin() else {
            return;
        };
        enc.set_vertex_buffer_whole(0, vb);
        enc.set_index_buffer_whole(ib);
        enc.set_texture_unit(0, "s_tex", texture);
        enc.submit(0, program, DiscardFlags::ALL);
    }

    fn release(&mut self, ctx: &mut Context) {
        destroy_all(ctx, self.vb.take());
        destroy_all(ctx, self.ib.take());
        destroy_all(ctx, self.texture.take());
        destroy_all(ctx, self.program.take());
    }
}

// ── framebuffer ──────────────────────────────────────────────────────────

const OFFSCREEN_VIEW: vgl::ViewId = 0;
const SCREEN_VIEW: vgl::ViewId = 1;
const OFFSCREEN_SIZE: u16 = 256;

/// Spinning triangle rendered into an offscreen target, then sampled onto a
/// quad in the backbuffer.
#[derive(Default)]
struct Offscreen {
    triangle: Option<VertexBufferHandle>,
    quad: Option<VertexBufferHandle>,
    quad_ib: Option<IndexBufferHandle>,
    colour: Option<TextureHandle>,
    depth: Option<TextureHandle>,
    fb: Option<FrameBufferHandle>,
    colour_program: Option<ProgramHandle>,
    textured_program: Option<ProgramHandle>,
}

impl Scene for Offscreen {
    fn name(&self) -> &'static str {
        "framebuffer"
    }

    fn init(&mut self, ctx: &mut Context) -> Result<()> {
        let triangle = load_vertices(ctx, &PosColour::layout(), &TRIANGLE)?;
        self.triangle = Some(triangle);
        let quad = load_vertices(ctx, &PosUv::layout(), &QUAD)?;
        self.quad = Some(quad);
        self.quad_ib = Some(load_indices(ctx, &QUAD_INDICES)?);

        let flags = TextureFlags::DEFAULT
            .with_filter(TexFilter::Linear)
            .with_wrap(TexWrap::Clamp);
        let colour = ctx.create_texture_2d(
            OFFSCREEN_SIZE,
            OFFSCREEN_SIZE,
            1,
            false,
            TexFormat::RGBA8U,
            TexFormat::RGBA8U,
            flags,
            None,
        );
        self.colour = Some(check(colour, "offscreen colour target")?);
        let depth = ctx.create_texture_2d(
            OFFSCREEN_SIZE,
            OFFSCREEN_SIZE,
            1,
            false,
            TexFormat::D24FS8U,
            TexFormat::D24FS8U,
            TextureFlags::DEFAULT,
            None,
        );
        self.depth = Some(check(depth, "offscreen depth target")?);
        let fb = check(ctx.create_frame_buffer_pair(colour, depth), "offscreen framebuffer")?;
        self.fb = Some(fb);

        ctx.set_view_frame_buffer(OFFSCREEN_VIEW, fb);
        ctx.set_view_clear(OFFSCREEN_VIEW, ClearFlags::ALL, 0x202040ff, 1.0, 0);
        ctx.set_view_clear(SCREEN_VIEW, ClearFlags::COLOUR | ClearFlags::DEPTH, 0x101010ff, 1.0, 0);

        self.colour_program = Some(load_program(ctx, VS_COLOUR, FS_COLOUR)?);
        self.textured_program = Some(load_program(ctx, VS_TEXTURED, FS_TEXTURED)?);
        Ok(())
    }

    fn update(&mut self, ctx: &Context, time: f32) {
        let (Some(triangle), Some(quad), Some(quad_ib), Some(colour)) =
            (self.triangle, self.quad, self.quad_ib, self.colour)
        else {
            return;
        };
        let (Some(colour_program), Some(textured_program)) =
            (self.colour_program, self.textured_program)
        else {
            return;
        };
        let Some(mut enc) = ctx.begin() else {
            return;
        };

        enc.set_vertex_buffer_whole(0, triangle);
        enc.set_uniform("u_mvp", UniformType::Mat4, &rotate_z(-time), 1, false);
        enc.set_state(StateFlags::DEFAULT.with_cull_test(CullTest::Disabled));
        enc.submit(OFFSCREEN_VIEW, colour_program, DiscardFlags::ALL);

        enc.set_vertex_buffer_whole(0, quad);
        enc.set_index_buffer_whole(quad_ib);
        enc.set_texture_unit(0, "s_tex", colour);
        enc.submit(SCREEN_VIEW, textured_program, DiscardFlags::ALL);
    }

    fn release(&mut self, ctx: &mut Context) {
        ctx.reset_view(OFFSCREEN_VIEW);
        ctx.reset_view(SCREEN_VIEW);
        destroy_all(ctx, [self.triangle.take(), self.quad.take()].into_iter().flatten());
        destroy_all(ctx, self.quad_ib.take());
        // Textures stay alive until the framebuffer holding them goes.
        destroy_all(ctx, [self.colour.take(), self.depth.take()].into_iter().flatten());
        destroy_all(ctx, self.fb.take());
        destroy_all(ctx, [self.colour_program.take(), self.textured_program.take()].into_iter().flatten());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── matrices ──

    #[test]
    fn identity_is_neutral() {
        let m = rotate_xy(0.3, 1.1);
        assert_eq!(mul(&IDENTITY, &m), m);
        assert_eq!(mul(&m, &IDENTITY), m);
    }

    #[test]
    fn translate_moves_origin() {
        let m = mul(&translate(1.0, 2.0, 3.0), &IDENTITY);
        assert_eq!(&m[12..15], &[1.0, 2.0, 3.0]);
    }

    // ── scenes ──

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert_eq!(by_name(name).map(|s| s.name()), Some(name));
        }
        assert!(by_name("teapot").is_none());
    }

    #[test]
    fn checkerboard_alternates() {
        let texels = checkerboard(4, 2);
        assert_eq!(texels.len(), 64);
        assert_eq!(texels[0], 0xff);
        assert_eq!(texels[2 * 4], 0x20);
    }

    #[test]
    fn scenes_round_trip_through_noop_context() {
        let mut ctx = Context::new(vgl::Config::new(vgl::types::RendererType::Noop, 320, 240))
            .expect("noop context");
        for name in NAMES {
            let mut scene = by_name(name).expect("known scene");
            scene.init(&mut ctx).expect("scene init");
            scene.update(&ctx, 0.5);
            ctx.frame();
            ctx.render();
            assert!(ctx.stats().num_draw_calls <= 2, "{name}");
            scene.release(&mut ctx);
            ctx.frame();
            ctx.render();
            assert_eq!(ctx.stats().num_programs, 0, "{name} leaked a program");
            assert_eq!(ctx.stats().num_textures, 0, "{name} leaked a texture");
        }
    }
}
