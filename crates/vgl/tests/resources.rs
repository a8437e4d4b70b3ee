mod common;

use common::{Call, context, f32_bytes, position_layout, program, render, take};
use vgl::types::{
    Attachment, AttachmentSlot, BufferFlags, ShaderType, TexFormat, TexTarget, TextureFlags,
};
use vgl::{FrameBufferHandle, TextureHandle, VertexBufferHandle};

// ── validation ───────────────────────────────────────────────────────────

#[test]
fn depth_storage_with_colour_upload_is_rejected() {
    let (mut ctx, log) = context();
    let tex = ctx.create_texture_2d(
        64,
        64,
        1,
        false,
        TexFormat::D24F,
        TexFormat::RGBA8U,
        TextureFlags::DEFAULT,
        None,
    );
    assert_eq!(tex, TextureHandle::INVALID);
    assert_eq!(render(&mut ctx, &log), vec![Call::Render { draws: vec![], clears: vec![] }]);
    assert_eq!(ctx.stats().num_textures, 0);
}

#[test]
fn rejected_creations_queue_nothing() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    take(&log);

    assert_eq!(ctx.create_vertex_buffer(&[], layout, BufferFlags::empty()), VertexBufferHandle::INVALID);
    assert!(!ctx.create_shader(ShaderType::Vertex, "   ").is_valid());
    assert!(!ctx.create_frame_buffer(&[]).is_valid());

    let calls = render(&mut ctx, &log);
    assert_eq!(calls.len(), 2, "layout create and render only: {calls:?}");
}

// ── ref counting ─────────────────────────────────────────────────────────

#[test]
fn shared_layout_is_destroyed_once_after_its_last_buffer() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let a = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    let b = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    render(&mut ctx, &log);

    ctx.destroy(layout);
    ctx.destroy(a);
    assert!(ctx.vertex_layout(layout).is_some(), "still referenced by b");
    ctx.destroy(b);

    let calls = render(&mut ctx, &log);
    let destroys: Vec<&Call> = calls
        .iter()
        .filter(|c| matches!(c, Call::DestroyVertexBuffer(_) | Call::DestroyVertexLayout(_)))
        .collect();
    assert_eq!(destroys, vec![
        &Call::DestroyVertexBuffer(a),
        &Call::DestroyVertexBuffer(b),
        &Call::DestroyVertexLayout(layout),
    ]);
}

#[test]
fn program_keeps_its_shaders_alive() {
    let (mut ctx, log) = context();
    let vs = ctx.create_shader(ShaderType::Vertex, "void main() {}");
    let fs = ctx.create_shader(ShaderType::Fragment, "void main() {}");
    let prog = ctx.create_program(vs, fs);
    assert!(prog.is_valid());
    render(&mut ctx, &log);

    ctx.destroy(vs);
    ctx.destroy(fs);
    assert!(!render(&mut ctx, &log).iter().any(|c| matches!(c, Call::DestroyShader(_))));

    ctx.destroy(prog);
    let calls = render(&mut ctx, &log);
    assert!(calls.contains(&Call::DestroyProgram(prog)));
    assert!(calls.contains(&Call::DestroyShader(vs)));
    assert!(calls.contains(&Call::DestroyShader(fs)));
}

#[test]
fn frame_buffer_releases_its_textures() {
    let (mut ctx, log) = context();
    let colour = ctx.create_texture_2d(
        128,
        128,
        1,
        false,
        TexFormat::RGBA8U,
        TexFormat::RGBA8U,
        TextureFlags::DEFAULT,
        None,
    );
    let depth = ctx.create_texture_2d(
        128,
        128,
        1,
        false,
        TexFormat::D24FS8U,
        TexFormat::D24FS8U,
        TextureFlags::DEFAULT,
        None,
    );
    let fb = ctx.create_frame_buffer_pair(colour, depth);
    assert_ne!(fb, FrameBufferHandle::INVALID);

    let calls = render(&mut ctx, &log);
    assert!(calls.contains(&Call::CreateFrameBuffer(fb, vec![
        Attachment::new(AttachmentSlot::Colour0, colour),
        Attachment::new(AttachmentSlot::DepthStencil, depth),
    ])));

    ctx.destroy(colour);
    ctx.destroy(depth);
    assert!(!render(&mut ctx, &log).iter().any(|c| matches!(c, Call::DestroyTexture(_))));

    ctx.destroy(fb);
    let calls = render(&mut ctx, &log);
    let fb_at = calls.iter().position(|c| *c == Call::DestroyFrameBuffer(fb)).expect("fb destroy");
    let tex_at = calls.iter().position(|c| *c == Call::DestroyTexture(colour)).expect("texture destroy");
    assert!(fb_at < tex_at);
    assert!(calls.contains(&Call::DestroyTexture(depth)));
    assert_eq!(ctx.stats().num_textures, 0);
}

// ── handles ──────────────────────────────────────────────────────────────

#[test]
fn destroyed_slots_are_reused_after_render() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let a = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    render(&mut ctx, &log);

    ctx.destroy(a);
    let b = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    assert_ne!(a, b, "a's slot is held until its destroy has rendered");
    render(&mut ctx, &log);

    let c = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    assert_eq!(a, c);
}

#[test]
fn destroying_a_dead_handle_is_a_no_op() {
    let (mut ctx, log) = context();
    ctx.destroy(VertexBufferHandle::INVALID);
    ctx.destroy(VertexBufferHandle::new(7));
    assert_eq!(render(&mut ctx, &log), vec![Call::Render { draws: vec![], clears: vec![] }]);
}

// ── dynamic buffers ──────────────────────────────────────────────────────

#[test]
fn dynamic_updates_are_dispatched_in_order() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let vb = ctx.create_dynamic_vertex_buffer(48, layout, BufferFlags::empty());
    let ib = ctx.create_dynamic_index_buffer(12, BufferFlags::empty());
    ctx.update_dynamic_vertex_buffer(vb, 0, &[1; 24]);
    ctx.update_dynamic_vertex_buffer(vb, 24, &[2; 24]);
    ctx.update_dynamic_vertex_buffer(vb, 40, &[3; 24]);
    ctx.update_dynamic_index_buffer(ib, 0, &[0, 0, 1, 0, 2, 0]);

    let calls = render(&mut ctx, &log);
    let updates: Vec<&Call> = calls
        .iter()
        .filter(|c| {
            matches!(c, Call::UpdateDynamicVertexBuffer { .. } | Call::UpdateDynamicIndexBuffer { .. })
        })
        .collect();
    assert_eq!(updates, vec![
        &Call::UpdateDynamicVertexBuffer { handle: vb, offset: 0, data: vec![1; 24] },
        &Call::UpdateDynamicVertexBuffer { handle: vb, offset: 24, data: vec![2; 24] },
        &Call::UpdateDynamicIndexBuffer { handle: ib, offset: 0, data: vec![0, 0, 1, 0, 2, 0] },
    ]);
    assert!(calls.contains(&Call::CreateDynamicVertexBuffer { handle: vb, size: 48 }));

    ctx.destroy(vb);
    ctx.destroy(ib);
    let calls = render(&mut ctx, &log);
    assert!(calls.contains(&Call::DestroyDynamicVertexBuffer(vb)));
    assert!(calls.contains(&Call::DestroyDynamicIndexBuffer(ib)));
}

// ── textures ─────────────────────────────────────────────────────────────

#[test]
fn texture_wrappers_pick_targets() {
    let (mut ctx, log) = context();
    let face = 4 * 4 * 4;
    let cube = ctx.create_texture_cube(
        4,
        1,
        false,
        TexFormat::RGBA8U,
        TexFormat::RGBA8U,
        TextureFlags::DEFAULT,
        Some(&vec![0; face * 6]),
    );
    let array = ctx.create_texture_2d(
        8,
        8,
        3,
        true,
        TexFormat::R8U,
        TexFormat::R8U,
        TextureFlags::DEFAULT,
        None,
    );
    let volume = ctx.create_texture_3d(
        4,
        4,
        4,
        false,
        TexFormat::R32F,
        TexFormat::R32F,
        TextureFlags::DEFAULT,
        None,
    );
    assert_eq!(ctx.texture_desc(cube).map(|d| (d.target, d.depth)), Some((TexTarget::Cube, 6)));
    assert_eq!(ctx.texture_desc(array).map(|d| d.target), Some(TexTarget::T2DArray));
    assert_eq!(ctx.texture_desc(volume).map(|d| d.target), Some(TexTarget::T3D));

    let calls = render(&mut ctx, &log);
    let uploads: Vec<(TextureHandle, usize)> = calls
        .iter()
        .filter_map(|c| match c {
            Call::CreateTexture(h, _, len) => Some((*h, *len)),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec![(cube, face * 6), (array, 0), (volume, 0)]);
}

#[test]
fn short_cube_data_is_rejected() {
    let (mut ctx, _log) = context();
    let cube = ctx.create_texture_cube(
        4,
        1,
        false,
        TexFormat::RGBA8U,
        TexFormat::RGBA8U,
        TextureFlags::DEFAULT,
        Some(&[0; 64]),
    );
    assert!(!cube.is_valid(), "one face of data for six faces");
}

#[test]
fn shader_and_program_commands_carry_their_arguments() {
    let (mut ctx, log) = context();
    let prog = program(&mut ctx);
    let calls = render(&mut ctx, &log);
    let shaders: Vec<ShaderType> = calls
        .iter()
        .filter_map(|c| match c {
            Call::CreateShader(_, ty, source) if !source.is_empty() => Some(*ty),
            _ => None,
        })
        .collect();
    assert_eq!(shaders, vec![ShaderType::Vertex, ShaderType::Fragment]);
    assert!(calls.iter().any(|c| matches!(c, Call::CreateProgram(p, _, _) if *p == prog)));
}
