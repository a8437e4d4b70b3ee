use glow::HasContext;

use super::format::{attrib_type, draw_state, stencil_func, stencil_op};
use super::{GlBackend, GlBuffer, GlUniformLocation};
use crate::handle::ProgramHandle;
use crate::pipeline::{DrawCall, Frame, Rect, Uniform, ViewSetup, ViewStep, ViewWalk};
use crate::types::{
    AttribType, ClearFlags, StateFlags, StencilFlags, StencilOp, StencilTest, UniformType,
};
use crate::vertex::VertexLayout;

/// Per-frame bookkeeping of the render loop.
struct Pass {
    views: ViewWalk,
    program: Option<ProgramHandle>,
    /// Attribute locations enabled by the current draw.
    enabled: Vec<u32>,
    drawn: u32,
    skipped: u32,
}

impl GlBackend {
    pub(super) fn render_frame(&mut self, frame: &Frame) {
        let mut pass = Pass {
            views: ViewWalk::new(),
            program: None,
            enabled: Vec::new(),
            drawn: 0,
            skipped: 0,
        };
        let backbuffer = Rect::new(0, 0, self.resolution.width, self.resolution.height);

        unsafe {
            self.gl.bind_vertex_array(self.vao);
            self.gl.disable(glow::BLEND);
        }

        for draw in frame.draw_calls() {
            let step = pass.views.step(frame.views(), draw.view, backbuffer, |fb| {
                self.frame_buffers.get(fb).map(|fb| Rect::new(0, 0, fb.width, fb.height))
            });
            match step {
                ViewStep::Keep => {}
                ViewStep::Enter(setup) => self.apply_view(&setup),
                ViewStep::Skip => {
                    pass.skipped += 1;
                    continue;
                }
            }
            // Touch draws only trigger the view clear.
            if !draw.program.is_valid() {
                continue;
            }
            if self.draw(draw, &mut pass) {
                pass.drawn += 1;
            } else {
                pass.skipped += 1;
            }
            for loc in pass.enabled.drain(..) {
                unsafe { self.gl.disable_vertex_attrib_array(loc) };
            }
        }

        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
            self.gl.use_program(None);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            self.gl.disable(glow::SCISSOR_TEST);
        }
        self.check_errors("render");
        log::trace!("gl render: {} drawn, {} skipped", pass.drawn, pass.skipped);
    }

    /// Binds the view's target and viewport and runs its clear, if any.
    fn apply_view(&self, setup: &ViewSetup) {
        let fbo = self.frame_buffers.get(setup.frame_buffer).map(|fb| fb.fbo);
        let rect = setup.viewport;
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, fbo);
            self.gl.viewport(rect.x as i32, rect.y as i32, rect.width as i32, rect.height as i32);
            self.gl.disable(glow::SCISSOR_TEST);
        }

        let Some(clear) = setup.clear else {
            return;
        };
        let mut mask = 0;
        unsafe {
            if clear.flags.contains(ClearFlags::COLOUR) {
                let [r, g, b, a] = clear.colour_f32();
                self.gl.color_mask(true, true, true, true);
                self.gl.clear_color(r, g, b, a);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            if clear.flags.contains(ClearFlags::DEPTH) {
                self.gl.depth_mask(true);
                self.gl.clear_depth_f32(clear.depth);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            if clear.flags.contains(ClearFlags::STENCIL) {
                self.gl.stencil_mask(0xff);
                self.gl.clear_stencil(clear.stencil as i32);
                mask |= glow::STENCIL_BUFFER_BIT;
            }
            self.gl.clear(mask);
        }
    }

    /// Issues one draw. Returns false if it was skipped.
    fn draw(&mut self, draw: &DrawCall, pass: &mut Pass) -> bool {
        // Resolve everything the draw references before touching GL state.
        if self.programs.get(draw.program).is_none() {
            log::error!("draw references {}, which is not live", draw.program);
            return false;
        }
        let mut streams: Vec<(GlBuffer, &VertexLayout, u32, u32, u32)> = Vec::new();
        for (i, stream) in draw.streams() {
            let Some(vb) = self.vertex_buffers.get(stream.handle) else {
                log::error!("draw stream {i} references {}, which is not live", stream.handle);
                return false;
            };
            let Some(layout) = self.vertex_layouts.get(vb.layout) else {
                log::error!("{} has no live layout ({})", stream.handle, vb.layout);
                return false;
            };
            streams.push((vb.id, layout, vb.size, stream.start, stream.count));
        }

        let mode = self.apply_state(draw.state);
        self.apply_stencil(draw.front_stencil, draw.back_stencil);
        unsafe {
            if draw.scissor.is_zero_area() {
                self.gl.disable(glow::SCISSOR_TEST);
            } else {
                let s = draw.scissor;
                self.gl.enable(glow::SCISSOR_TEST);
                self.gl.scissor(s.x as i32, s.y as i32, s.width as i32, s.height as i32);
            }
        }

        let gl = &self.gl;
        let Some(program) = self.programs.get_mut(draw.program) else {
            return false;
        };
        if pass.program != Some(draw.program) {
            unsafe { gl.use_program(Some(program.id)) };
            pass.program = Some(draw.program);
        }

        for (unit, tu) in draw.textures() {
            let Some(tex) = self.textures.get(tu.handle) else {
                log::error!("texture unit {unit} references {}, which is not live", tu.handle);
                continue;
            };
            let loc = program.location(gl, &tu.name);
            unsafe {
                gl.active_texture(glow::TEXTURE0 + unit as u32);
                gl.bind_texture(tex.target, Some(tex.id));
                gl.uniform_1_i32(loc.as_ref(), unit as i32);
            }
        }

        for uniform in &draw.uniforms {
            let loc = program.location(gl, &uniform.name);
            upload_uniform(gl, loc.as_ref(), uniform);
        }

        for &(buffer, layout, ..) in &streams {
            unsafe { gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer)) };
            bind_attributes(gl, layout, &mut pass.enabled);
        }

        if draw.is_indexed() {
            let Some(ib) = self.index_buffers.get(draw.index_stream.handle) else {
                log::error!("draw references {}, which is not live", draw.index_stream.handle);
                return false;
            };
            let index_size = ib.flags.index_size();
            let total = ib.size / index_size;
            let (start, count) = match (draw.index_stream.start, draw.index_stream.count) {
                (0, 0) => (0, total),
                range => range,
            };
            if start as u64 + count as u64 > total as u64 {
                log::error!(
                    "index range {start}+{count} exceeds {} ({total} indices), draw skipped",
                    draw.index_stream.handle
                );
                return false;
            }
            let ty = if index_size == 4 { glow::UNSIGNED_INT } else { glow::UNSIGNED_SHORT };
            unsafe {
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ib.id));
                gl.draw_elements(mode, count as i32, ty, (start * index_size) as i32);
            }
        } else {
            let Some(&(_, layout, size, start, count)) = streams.first() else {
                log::error!("draw has neither vertex streams nor an index buffer");
                return false;
            };
            let count = match count {
                0 => (size / layout.stride().max(1) as u32).saturating_sub(start),
                n => n,
            };
            unsafe { gl.draw_arrays(mode, start as i32, count as i32) };
        }
        true
    }

    /// Applies depth, cull, polygon and line state. Returns the primitive mode.
    fn apply_state(&self, state: StateFlags) -> u32 {
        let s = draw_state(state);
        unsafe {
            match s.depth_func {
                Some(func) => {
                    self.gl.enable(glow::DEPTH_TEST);
                    self.gl.depth_func(func);
                }
                None => self.gl.disable(glow::DEPTH_TEST),
            }
            match s.front_face {
                Some(front) => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::BACK);
                    self.gl.front_face(front);
                }
                None => self.gl.disable(glow::CULL_FACE),
            }
            self.gl.polygon_mode(glow::FRONT_AND_BACK, s.polygon_mode);
            self.gl.line_width(s.line_width);
        }
        s.mode
    }

    fn apply_stencil(&self, front: StencilFlags, back: StencilFlags) {
        if front == StencilFlags::NONE && back == StencilFlags::NONE {
            unsafe { self.gl.disable(glow::STENCIL_TEST) };
            return;
        }
        unsafe { self.gl.enable(glow::STENCIL_TEST) };
        for (face, flags) in [(glow::FRONT, front), (glow::BACK, back)] {
            let test = flags.test().unwrap_or(StencilTest::Disable);
            let (func, ops) = match stencil_func(test) {
                Some(func) => {
                    let op = |o: Option<StencilOp>| stencil_op(o.unwrap_or(StencilOp::Keep));
                    (func, [op(flags.fail_stencil()), op(flags.fail_depth()), op(flags.pass())])
                }
                // A face without a test passes and leaves the buffer alone.
                None => (glow::ALWAYS, [glow::KEEP; 3]),
            };
            unsafe {
                self.gl.stencil_func_separate(face, func, flags.reference() as i32, 0xff);
                self.gl.stencil_op_separate(face, ops[0], ops[1], ops[2]);
                self.gl.stencil_mask_separate(face, flags.write_mask() as u32);
            }
        }
    }
}

/// Enables and points every attribute of `layout` at the bound array buffer.
///
/// Attributes live at the location equal to their semantic; multi-element
/// attributes take consecutive locations.
fn bind_attributes(gl: &glow::Context, layout: &VertexLayout, enabled: &mut Vec<u32>) {
    let stride = layout.stride() as i32;
    for a in layout.attributes() {
        let elements = a.num_elements.max(1) as u32;
        let element_size = a.num_components as i32 * a.ty.size() as i32;
        let ty = attrib_type(a.ty);
        for e in 0..elements {
            let loc = a.attrib.as_u8() as u32 + e;
            let offset = a.offset as i32 + e as i32 * element_size;
            unsafe {
                gl.enable_vertex_attrib_array(loc);
                if a.ty.is_integer() {
                    gl.vertex_attrib_pointer_i32(loc, a.num_components as i32, ty, stride, offset);
                } else if a.ty == AttribType::Double {
                    gl.vertex_attrib_pointer_f64(loc, a.num_components as i32, ty, stride, offset);
                } else {
                    gl.vertex_attrib_pointer_f32(
                        loc,
                        a.num_components as i32,
                        ty,
                        a.normalized,
                        stride,
                        offset,
                    );
                }
            }
            enabled.push(loc);
        }
    }
}

fn read_vec<T: bytemuck::Pod>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(size_of::<T>()).map(bytemuck::pod_read_unaligned).collect()
}

/// Uploads a uniform through the typed call matching its tag.
fn upload_uniform(gl: &glow::Context, loc: Option<&GlUniformLocation>, u: &Uniform) {
    use UniformType::*;

    if loc.is_none() {
        return;
    }
    let t = u.transpose;
    unsafe {
        match u.ty {
            Int32 => gl.uniform_1_i32_slice(loc, &read_vec(&u.data)),
            IVec2 => gl.uniform_2_i32_slice(loc, &read_vec(&u.data)),
            IVec3 => gl.uniform_3_i32_slice(loc, &read_vec(&u.data)),
            IVec4 => gl.uniform_4_i32_slice(loc, &read_vec(&u.data)),
            Uint32 => gl.uniform_1_u32_slice(loc, &read_vec(&u.data)),
            UVec2 => gl.uniform_2_u32_slice(loc, &read_vec(&u.data)),
            UVec3 => gl.uniform_3_u32_slice(loc, &read_vec(&u.data)),
            UVec4 => gl.uniform_4_u32_slice(loc, &read_vec(&u.data)),
            Float => gl.uniform_1_f32_slice(loc, &read_vec(&u.data)),
            Vec2 => gl.uniform_2_f32_slice(loc, &read_vec(&u.data)),
            Vec3 => gl.uniform_3_f32_slice(loc, &read_vec(&u.data)),
            Vec4 => gl.uniform_4_f32_slice(loc, &read_vec(&u.data)),
            Mat2 => gl.uniform_matrix_2_f32_slice(loc, t, &read_vec(&u.data)),
            Mat2x3 => gl.uniform_matrix_2x3_f32_slice(loc, t, &read_vec(&u.data)),
            Mat2x4 => gl.uniform_matrix_2x4_f32_slice(loc, t, &read_vec(&u.data)),
            Mat3x2 => gl.uniform_matrix_3x2_f32_slice(loc, t, &read_vec(&u.data)),
            Mat3 => gl.uniform_matrix_3_f32_slice(loc, t, &read_vec(&u.data)),
            Mat3x4 => gl.uniform_matrix_3x4_f32_slice(loc, t, &read_vec(&u.data)),
            Mat4x2 => gl.uniform_matrix_4x2_f32_slice(loc, t, &read_vec(&u.data)),
            Mat4x3 => gl.uniform_matrix_4x3_f32_slice(loc, t, &read_vec(&u.data)),
            Mat4 => gl.uniform_matrix_4_f32_slice(loc, t, &read_vec(&u.data)),
            Double | DVec2 | DVec3 | DVec4 => {
                log::error!("uniform `{}`: double-precision uniforms are not supported", u.name);
            }
            // Samplers carry a texture unit index.
            _ => gl.uniform_1_i32_slice(loc, &read_vec(&u.data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_vec_ignores_alignment() {
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(bytemuck::cast_slice(&[1.0f32, -2.5]));
        let v: Vec<f32> = read_vec(&bytes[1..]);
        assert_eq!(v, vec![1.0, -2.5]);
    }

    #[test]
    fn read_vec_drops_trailing_bytes() {
        let v: Vec<i32> = read_vec(&[1, 0, 0, 0, 9]);
        assert_eq!(v, vec![1]);
    }
}
