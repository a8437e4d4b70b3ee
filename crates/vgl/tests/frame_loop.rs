mod common;

use common::{Call, Draw, context, f32_bytes, position_layout, program, render, take, u16_bytes};
use vgl::types::{BufferFlags, ClearFlags, DiscardFlags, TexFormat, TextureFlags, UniformType};

// ── triangle ─────────────────────────────────────────────────────────────

#[test]
fn indexed_triangle_reaches_the_backend() {
    let (mut ctx, log) = context();

    let layout = ctx.create_vertex_layout(&position_layout());
    assert_eq!(ctx.vertex_layout(layout).map(|l| l.stride()), Some(12));
    let vertices = f32_bytes(&[0.0, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0]);
    let vb = ctx.create_vertex_buffer(&vertices, layout, BufferFlags::empty());
    let ib = ctx.create_index_buffer(&u16_bytes(&[0, 1, 2]), BufferFlags::empty());
    let prog = program(&mut ctx);
    ctx.set_view_clear(0, ClearFlags::ALL, 0x000000ff, 1.0, 0);

    {
        let mut enc = ctx.begin().expect("encoder");
        enc.set_vertex_buffer(0, vb, 0, 3);
        enc.set_index_buffer_whole(ib);
        enc.submit(0, prog, DiscardFlags::ALL);
        assert_eq!(enc.num_submitted(), 1);
    }

    ctx.frame();
    assert_eq!(ctx.render_frame().num_draw_calls(), 1);
    let draw = ctx.render_frame().draw_calls().next().cloned().expect("one draw");
    assert_eq!(draw.num_vertices, Some(3));
    ctx.render();
    let calls = take(&log);

    let render_at = calls
        .iter()
        .position(|c| matches!(c, Call::Render { .. }))
        .expect("render call");
    assert!(calls[..render_at].iter().all(|c| !matches!(c, Call::Render { .. })));
    assert_eq!(calls[render_at], Call::Render {
        draws: vec![Draw {
            view: 0,
            program: prog,
            num_vertices: Some(3),
            indexed: true,
            num_uniforms: 0,
        }],
        clears: vec![0],
    });
    assert_eq!(calls[..render_at].len(), 6, "layout, vb, ib, two shaders, program: {calls:?}");
    assert!(matches!(calls[1], Call::CreateVertexBuffer { size: 36, .. }));
    assert_eq!(ctx.stats().num_draw_calls, 1);
    assert_eq!(ctx.stats().num_views, 1);
}

#[test]
fn clear_runs_once_per_view() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let vb = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    let prog = program(&mut ctx);
    ctx.set_view_clear(0, ClearFlags::COLOUR, 0xff0000ff, 1.0, 0);
    ctx.set_view_clear(1, ClearFlags::DEPTH, 0, 1.0, 0);

    {
        let mut enc = ctx.begin().expect("encoder");
        for view in [0, 0, 1, 0] {
            enc.set_vertex_buffer_whole(0, vb);
            enc.submit(view, prog, DiscardFlags::ALL);
        }
    }
    let calls = render(&mut ctx, &log);
    let Some(Call::Render { draws, clears }) = calls.iter().find(|c| matches!(c, Call::Render { .. })) else {
        panic!("no render call in {calls:?}");
    };
    assert_eq!(draws.len(), 4);
    assert_eq!(clears, &vec![0, 1]);
}

#[test]
fn views_without_a_drawable_area_never_clear() {
    let (mut ctx, log) = context();
    let colour = ctx.create_texture_2d(
        64,
        64,
        1,
        false,
        TexFormat::RGBA8U,
        TexFormat::RGBA8U,
        TextureFlags::DEFAULT,
        None,
    );
    let fb = ctx.create_frame_buffer(&[vgl::types::Attachment::new(
        vgl::types::AttachmentSlot::Colour0,
        colour,
    )]);
    for view in 0..4 {
        ctx.set_view_clear(view, ClearFlags::COLOUR, 0, 1.0, 0);
    }
    ctx.set_view_rect(1, 0, 0, 0, 0);
    ctx.set_view_rect(2, 16, 16, 128, 0);
    ctx.set_view_frame_buffer(3, fb);

    {
        let mut enc = ctx.begin().expect("encoder");
        for view in [2, 3, 1, 2, 0] {
            enc.touch(view);
        }
    }
    let calls = render(&mut ctx, &log);
    let Some(Call::Render { clears, .. }) = calls.iter().find(|c| matches!(c, Call::Render { .. })) else {
        panic!("no render call in {calls:?}");
    };
    assert_eq!(clears, &vec![3, 1, 0], "view 2 has a zero-height viewport");

    ctx.window(640, 0);
    {
        let mut enc = ctx.begin().expect("encoder");
        enc.touch(0);
        enc.touch(3);
    }
    let calls = render(&mut ctx, &log);
    let Some(Call::Render { clears, .. }) = calls.iter().find(|c| matches!(c, Call::Render { .. })) else {
        panic!("no render call in {calls:?}");
    };
    assert_eq!(clears, &vec![3], "an empty backbuffer skips the default target");
}

#[test]
fn uniforms_travel_with_the_draw() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let vb = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    let prog = program(&mut ctx);
    take(&log);

    {
        let mut enc = ctx.begin().expect("encoder");
        enc.set_vertex_buffer_whole(0, vb);
        enc.set_uniform("u_mvp", UniformType::Mat4, &[0.0f32; 16], 1, false);
        enc.set_uniform("u_tint", UniformType::Vec4, &[1.0f32; 4], 1, false);
        enc.submit(0, prog, DiscardFlags::VERTEX_STREAMS);
        // Uniforms survive a discard that leaves them alone.
        enc.set_vertex_buffer_whole(0, vb);
        enc.submit(0, prog, DiscardFlags::ALL);
    }
    let calls = render(&mut ctx, &log);
    let uniforms: Vec<usize> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Render { draws, .. } => Some(draws.iter().map(|d| d.num_uniforms)),
            _ => None,
        })
        .flatten()
        .collect();
    assert_eq!(uniforms, vec![2, 2]);
}

// ── frame swap ───────────────────────────────────────────────────────────

#[test]
fn creates_precede_draws_and_destroys_follow() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let vb = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    let prog = program(&mut ctx);
    {
        let mut enc = ctx.begin().expect("encoder");
        enc.set_vertex_buffer_whole(0, vb);
        enc.submit(0, prog, DiscardFlags::ALL);
    }
    ctx.destroy(vb);
    ctx.destroy(layout);

    let calls = render(&mut ctx, &log);
    let render_at = calls.iter().position(|c| matches!(c, Call::Render { .. })).expect("render");
    let create_at = calls.iter().position(|c| matches!(c, Call::CreateVertexBuffer { .. })).expect("create");
    let destroy_vb = calls.iter().position(|c| *c == Call::DestroyVertexBuffer(vb)).expect("vb destroy");
    let destroy_layout = calls.iter().position(|c| *c == Call::DestroyVertexLayout(layout)).expect("layout destroy");
    assert!(create_at < render_at);
    assert!(render_at < destroy_vb);
    assert!(destroy_vb < destroy_layout);
}

#[test]
fn frame_swap_hands_over_exactly_the_recorded_draws() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let vb = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    let prog = program(&mut ctx);

    let submit = |ctx: &vgl::Context, views: &[u16]| {
        let mut enc = ctx.begin().expect("encoder");
        for &view in views {
            enc.set_vertex_buffer_whole(0, vb);
            enc.submit(view, prog, DiscardFlags::ALL);
        }
    };

    submit(&ctx, &[2, 0, 1]);
    ctx.frame();
    let order: Vec<u16> = ctx.render_frame().draw_calls().map(|d| d.view).collect();
    assert_eq!(order, vec![2, 0, 1]);

    // Recording into the new submit frame does not disturb the sealed one.
    submit(&ctx, &[5]);
    assert_eq!(ctx.render_frame().num_draw_calls(), 3);
    ctx.render();

    ctx.frame();
    let order: Vec<u16> = ctx.render_frame().draw_calls().map(|d| d.view).collect();
    assert_eq!(order, vec![5]);
    ctx.render();
    take(&log);

    let calls = render(&mut ctx, &log);
    assert_eq!(calls, vec![Call::Render { draws: vec![], clears: vec![] }]);
}

#[test]
fn render_counts_frames_and_ignores_unsealed_calls() {
    let (mut ctx, log) = context();
    assert_eq!(ctx.render(), 0);
    assert!(take(&log).is_empty());

    ctx.frame();
    assert_eq!(ctx.render(), 1);
    ctx.frame();
    ctx.frame();
    assert_eq!(ctx.render(), 3);
}

#[test]
fn empty_draws_are_dropped_not_rendered() {
    let (mut ctx, log) = context();
    let prog = program(&mut ctx);
    {
        let mut enc = ctx.begin().expect("encoder");
        enc.submit(0, prog, DiscardFlags::ALL);
        enc.submit(0, prog, DiscardFlags::ALL);
        assert_eq!(enc.num_dropped(), 2);
    }
    let calls = render(&mut ctx, &log);
    assert_eq!(ctx.stats().num_draw_calls, 0);
    assert_eq!(ctx.stats().num_dropped, 2);
    assert!(calls.contains(&Call::Render { draws: vec![], clears: vec![] }));
}

// ── lifecycle ────────────────────────────────────────────────────────────

#[test]
fn window_and_shutdown_reach_the_backend() {
    let (mut ctx, log) = context();
    ctx.window(1280, 720);
    assert_eq!(take(&log), vec![Call::Window { width: 1280, height: 720 }]);
    assert_eq!(ctx.resolution(), vgl::Resolution::new(1280, 720));

    drop(ctx);
    assert_eq!(take(&log), vec![Call::Shutdown]);
}

#[test]
fn encoders_record_from_many_threads() {
    let (mut ctx, log) = context();
    let layout = ctx.create_vertex_layout(&position_layout());
    let vb = ctx.create_vertex_buffer(&f32_bytes(&[0.0; 9]), layout, BufferFlags::empty());
    let prog = program(&mut ctx);

    std::thread::scope(|s| {
        for view in 0..8u16 {
            let ctx = &ctx;
            s.spawn(move || {
                let mut enc = ctx.begin().expect("encoder");
                for _ in 0..25 {
                    enc.set_vertex_buffer_whole(0, vb);
                    enc.submit(view, prog, DiscardFlags::ALL);
                }
            });
        }
    });

    let calls = render(&mut ctx, &log);
    let Some(Call::Render { draws, .. }) = calls.iter().find(|c| matches!(c, Call::Render { .. })) else {
        panic!("no render call");
    };
    assert_eq!(draws.len(), 200);
    assert_eq!(ctx.stats().num_views, 8);
}
