use std::collections::HashMap;

use glow::{HasContext, PixelUnpackData};

use super::format::{attachment_point, sampler_params, tex_format, tex_target};
use super::{
    GlBackend, GlBuffer, GlFramebuffer, GlProgram, GlShader, GlTexture, GlUniformLocation,
};
use crate::handle::{
    FrameBufferHandle, Handle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::types::{Attachment, BufferFlags, ShaderType, TexTarget, TextureDesc};

/// Backend objects indexed by handle slot.
pub(super) struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Slots<T> {
    pub fn new(capacity: usize) -> Self {
        Self { items: (0..capacity).map(|_| None).collect() }
    }

    pub fn get<H: Handle>(&self, handle: H) -> Option<&T> {
        self.items.get(handle.index() as usize)?.as_ref()
    }

    pub fn get_mut<H: Handle>(&mut self, handle: H) -> Option<&mut T> {
        self.items.get_mut(handle.index() as usize)?.as_mut()
    }

    /// Stores `value`, handing back whatever occupied the slot.
    pub fn insert<H: Handle>(&mut self, handle: H, value: T) -> Option<T> {
        match self.items.get_mut(handle.index() as usize) {
            Some(slot) => slot.replace(value),
            None => {
                log::error!("{handle:?} is outside the backend table, dropped");
                None
            }
        }
    }

    pub fn take<H: Handle>(&mut self, handle: H) -> Option<T> {
        self.items.get_mut(handle.index() as usize)?.take()
    }

    /// Live entries.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|s| s.is_some()).count()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.iter_mut().filter_map(Option::take)
    }
}

/// Where a buffer's contents come from.
#[derive(Debug, Copy, Clone)]
pub(super) enum Usage<'a> {
    /// Uploaded once at creation.
    Static(Option<&'a [u8]>),
    /// Allocated empty, filled by updates.
    Dynamic,
}

pub(super) struct BufferGl {
    pub id: GlBuffer,
    pub size: u32,
    /// Invalid for index buffers.
    pub layout: VertexLayoutHandle,
    pub flags: BufferFlags,
    pub dynamic: bool,
}

pub(super) struct ShaderGl {
    pub id: GlShader,
    pub ty: ShaderType,
}

pub(super) struct ProgramGl {
    pub id: GlProgram,
    /// Resolved uniform locations by name, including misses.
    locations: HashMap<String, Option<GlUniformLocation>>,
}

impl ProgramGl {
    pub fn location(&mut self, gl: &glow::Context, name: &str) -> Option<GlUniformLocation> {
        if let Some(loc) = self.locations.get(name) {
            return loc.clone();
        }
        let loc = unsafe { gl.get_uniform_location(self.id, name) };
        if loc.is_none() {
            log::debug!("uniform `{name}` not active in program");
        }
        self.locations.insert(name.to_owned(), loc.clone());
        loc
    }
}

pub(super) struct TextureGl {
    pub id: GlTexture,
    pub target: u32,
    pub width: u16,
    pub height: u16,
    /// Framebuffers this texture is attached to. Blocks destruction.
    pub num_rt: u32,
}

pub(super) struct FrameBufferGl {
    pub fbo: GlFramebuffer,
    pub width: u16,
    pub height: u16,
    attached: Vec<TextureHandle>,
}

impl GlBackend {
    // ── buffers ──────────────────────────────────────────────────────────

    /// Creates a buffer object on `target`, sized and filled per `usage`.
    fn create_buffer_object(&self, target: u32, size: u32, usage: Usage<'_>) -> Option<GlBuffer> {
        if size == 0 {
            log::error!("cannot create a buffer of size 0");
            return None;
        }
        if let Usage::Static(data) = usage {
            match data {
                Some(d) if d.len() >= size as usize => {}
                _ => {
                    log::error!("static buffer of {size} bytes created without enough data");
                    return None;
                }
            }
        }
        let id = match unsafe { self.gl.create_buffer() } {
            Ok(id) => id,
            Err(e) => {
                log::error!("glGenBuffers failed: {e}");
                return None;
            }
        };
        unsafe {
            self.gl.bind_buffer(target, Some(id));
            match usage {
                Usage::Static(Some(data)) => {
                    self.gl.buffer_data_u8_slice(target, &data[..size as usize], glow::STATIC_DRAW)
                }
                _ => self.gl.buffer_data_size(target, size as i32, glow::DYNAMIC_DRAW),
            }
            self.gl.bind_buffer(target, None);
        }
        Some(id)
    }

    fn update_buffer_object(&self, target: u32, buffer: &BufferGl, offset: u32, data: &[u8]) -> bool {
        if !buffer.dynamic {
            log::error!("cannot update a static buffer");
            return false;
        }
        if offset as u64 + data.len() as u64 > buffer.size as u64 {
            log::error!(
                "update of {} bytes at {offset} overruns a {}-byte buffer",
                data.len(),
                buffer.size
            );
            return false;
        }
        unsafe {
            self.gl.bind_buffer(target, Some(buffer.id));
            self.gl.buffer_sub_data_u8_slice(target, offset as i32, data);
            self.gl.bind_buffer(target, None);
        }
        true
    }

    pub(super) fn create_vertex_buffer_gl(
        &mut self,
        handle: VertexBufferHandle,
        size: u32,
        layout: VertexLayoutHandle,
        usage: Usage<'_>,
        flags: BufferFlags,
    ) {
        if let Some(old) = self.vertex_buffers.take(handle) {
            log::warn!("{handle} already in use, overwritten");
            unsafe { self.gl.delete_buffer(old.id) };
        }
        let Some(id) = self.create_buffer_object(glow::ARRAY_BUFFER, size, usage) else {
            log::error!("{handle} not created");
            return;
        };
        let dynamic = matches!(usage, Usage::Dynamic);
        self.vertex_buffers.insert(handle, BufferGl { id, size, layout, flags, dynamic });
        log::debug!("created {handle} ({size} bytes, dynamic: {dynamic})");
    }

    pub(super) fn update_vertex_buffer_gl(&mut self, handle: VertexBufferHandle, offset: u32, data: &[u8]) {
        let Some(buffer) = self.vertex_buffers.get(handle) else {
            log::error!("cannot update {handle}: not live");
            return;
        };
        if !self.update_buffer_object(glow::ARRAY_BUFFER, buffer, offset, data) {
            log::error!("{handle} not updated");
        }
    }

    pub(super) fn destroy_vertex_buffer_gl(&mut self, handle: VertexBufferHandle, dynamic: bool) {
        let Some(buffer) = self.vertex_buffers.take(handle) else {
            log::warn!("skip destroying {handle}: not live");
            return;
        };
        if buffer.dynamic != dynamic {
            log::warn!("{handle} destroyed through the wrong kind (dynamic: {})", buffer.dynamic);
        }
        unsafe { self.gl.delete_buffer(buffer.id) };
        log::debug!("destroyed {handle}");
    }

    pub(super) fn create_index_buffer_gl(
        &mut self,
        handle: IndexBufferHandle,
        size: u32,
        usage: Usage<'_>,
        flags: BufferFlags,
    ) {
        if let Some(old) = self.index_buffers.take(handle) {
            log::warn!("{handle} already in use, overwritten");
            unsafe { self.gl.delete_buffer(old.id) };
        }
        let Some(id) = self.create_buffer_object(glow::ELEMENT_ARRAY_BUFFER, size, usage) else {
            log::error!("{handle} not created");
            return;
        };
        let dynamic = matches!(usage, Usage::Dynamic);
        let layout = VertexLayoutHandle::INVALID;
        self.index_buffers.insert(handle, BufferGl { id, size, layout, flags, dynamic });
        log::debug!("created {handle} ({size} bytes, dynamic: {dynamic})");
    }

    pub(super) fn update_index_buffer_gl(&mut self, handle: IndexBufferHandle, offset: u32, data: &[u8]) {
        let Some(buffer) = self.index_buffers.get(handle) else {
            log::error!("cannot update {handle}: not live");
            return;
        };
        if !self.update_buffer_object(glow::ELEMENT_ARRAY_BUFFER, buffer, offset, data) {
            log::error!("{handle} not updated");
        }
    }

    pub(super) fn destroy_index_buffer_gl(&mut self, handle: IndexBufferHandle, dynamic: bool) {
        let Some(buffer) = self.index_buffers.take(handle) else {
            log::warn!("skip destroying {handle}: not live");
            return;
        };
        if buffer.dynamic != dynamic {
            log::warn!("{handle} destroyed through the wrong kind (dynamic: {})", buffer.dynamic);
        }
        unsafe { self.gl.delete_buffer(buffer.id) };
        log::debug!("destroyed {handle}");
    }

    // ── shaders ──────────────────────────────────────────────────────────

    pub(super) fn create_shader_gl(&mut self, handle: ShaderHandle, ty: ShaderType, source: &str) {
        if let Some(old) = self.shaders.take(handle) {
            log::warn!("{handle} already in use, overwritten");
            unsafe { self.gl.delete_shader(old.id) };
        }
        let kind = match ty {
            ShaderType::Vertex => glow::VERTEX_SHADER,
            ShaderType::Fragment => glow::FRAGMENT_SHADER,
        };
        let id = match unsafe { self.gl.create_shader(kind) } {
            Ok(id) => id,
            Err(e) => {
                log::error!("{handle}: glCreateShader failed: {e}");
                return;
            }
        };
        unsafe {
            self.gl.shader_source(id, source);
            self.gl.compile_shader(id);
            if !self.gl.get_shader_compile_status(id) {
                let info = self.gl.get_shader_info_log(id);
                log::error!("{handle}: {ty:?} shader failed to compile:\n{info}");
                self.gl.delete_shader(id);
                return;
            }
        }
        self.shaders.insert(handle, ShaderGl { id, ty });
        log::debug!("compiled {handle} ({ty:?})");
    }

    pub(super) fn destroy_shader_gl(&mut self, handle: ShaderHandle) {
        match self.shaders.take(handle) {
            Some(shader) => unsafe { self.gl.delete_shader(shader.id) },
            None => log::warn!("skip destroying {handle}: not live"),
        }
    }

    pub(super) fn create_program_gl(&mut self, handle: ProgramHandle, vert: ShaderHandle, frag: ShaderHandle) {
        if let Some(old) = self.programs.take(handle) {
            log::warn!("{handle} already in use, overwritten");
            unsafe { self.gl.delete_program(old.id) };
        }
        let (Some(vs), Some(fs)) = (self.shaders.get(vert), self.shaders.get(frag)) else {
            log::error!("{handle}: {vert} or {frag} did not compile, program not linked");
            return;
        };
        if vs.ty != ShaderType::Vertex || fs.ty != ShaderType::Fragment {
            log::error!("{handle}: shader stages do not match, program not linked");
            return;
        }
        let id = match unsafe { self.gl.create_program() } {
            Ok(id) => id,
            Err(e) => {
                log::error!("{handle}: glCreateProgram failed: {e}");
                return;
            }
        };
        unsafe {
            self.gl.attach_shader(id, vs.id);
            self.gl.attach_shader(id, fs.id);
            self.gl.link_program(id);
            self.gl.detach_shader(id, vs.id);
            self.gl.detach_shader(id, fs.id);
            if !self.gl.get_program_link_status(id) {
                let info = self.gl.get_program_info_log(id);
                log::error!("{handle}: program failed to link:\n{info}");
                self.gl.delete_program(id);
                return;
            }
        }
        self.programs.insert(handle, ProgramGl { id, locations: HashMap::new() });
        log::debug!("linked {handle} from {vert} + {frag}");
    }

    pub(super) fn destroy_program_gl(&mut self, handle: ProgramHandle) {
        match self.programs.take(handle) {
            Some(program) => unsafe { self.gl.delete_program(program.id) },
            None => log::warn!("skip destroying {handle}: not live"),
        }
    }

    // ── textures ─────────────────────────────────────────────────────────

    pub(super) fn create_texture_gl(&mut self, handle: TextureHandle, desc: &TextureDesc, data: Option<&[u8]>) {
        if let Some(old) = self.textures.get(handle) {
            if old.num_rt > 0 {
                log::error!("cannot overwrite {handle}: attached to {} framebuffers", old.num_rt);
                return;
            }
            log::warn!("{handle} already in use, overwritten");
            if let Some(old) = self.textures.take(handle) {
                unsafe { self.gl.delete_texture(old.id) };
            }
        }

        let Some(internal) = tex_format(desc.internal_format).internal else {
            log::error!("{handle}: {:?} cannot be a storage format", desc.internal_format);
            return;
        };
        let upload = tex_format(desc.format);
        let target = tex_target(desc.target);
        let params = sampler_params(desc.flags, desc.use_mips);

        let id = match unsafe { self.gl.create_texture() } {
            Ok(id) => id,
            Err(e) => {
                log::error!("{handle}: glGenTextures failed: {e}");
                return;
            }
        };

        let (w, h) = (desc.width as i32, desc.height as i32);
        let layers = desc.num_layers.max(1) as i32;
        let internal = internal as i32;
        unsafe {
            self.gl.bind_texture(target, Some(id));
            match desc.target {
                TexTarget::T1D => self.gl.tex_image_1d(
                    target, 0, internal, w, 0, upload.format, upload.ty,
                    PixelUnpackData::Slice(data),
                ),
                TexTarget::T2D => self.gl.tex_image_2d(
                    target, 0, internal, w, h, 0, upload.format, upload.ty,
                    PixelUnpackData::Slice(data),
                ),
                TexTarget::T1DArray => self.gl.tex_image_2d(
                    target, 0, internal, w, layers, 0, upload.format, upload.ty,
                    PixelUnpackData::Slice(data),
                ),
                TexTarget::T3D => self.gl.tex_image_3d(
                    target, 0, internal, w, h, desc.depth as i32, 0, upload.format, upload.ty,
                    PixelUnpackData::Slice(data),
                ),
                TexTarget::T2DArray => self.gl.tex_image_3d(
                    target, 0, internal, w, h, layers, 0, upload.format, upload.ty,
                    PixelUnpackData::Slice(data),
                ),
                TexTarget::Cube => {
                    // Faces are laid out +X, -X, +Y, -Y, +Z, -Z.
                    let face_size = desc.width as usize * desc.height as usize * desc.format.size() as usize;
                    for face in 0..6u32 {
                        let start = face as usize * face_size;
                        let texels = data.and_then(|d| d.get(start..start + face_size));
                        self.gl.tex_image_2d(
                            glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                            0, internal, w, h, 0, upload.format, upload.ty,
                            PixelUnpackData::Slice(texels),
                        );
                    }
                }
                TexTarget::CubeArray => self.gl.tex_image_3d(
                    target, 0, internal, w, h, layers * 6, 0, upload.format, upload.ty,
                    PixelUnpackData::Slice(data),
                ),
            }

            if desc.use_mips && data.is_some() {
                self.gl.generate_mipmap(target);
            }

            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, params.wrap[0] as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, params.wrap[1] as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, params.wrap[2] as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, params.mag_filter as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, params.min_filter as i32);
            match params.compare {
                Some(func) => {
                    self.gl.tex_parameter_i32(
                        target,
                        glow::TEXTURE_COMPARE_MODE,
                        glow::COMPARE_REF_TO_TEXTURE as i32,
                    );
                    self.gl.tex_parameter_i32(target, glow::TEXTURE_COMPARE_FUNC, func as i32);
                }
                None => self.gl.tex_parameter_i32(target, glow::TEXTURE_COMPARE_MODE, glow::NONE as i32),
            }
            if let Some(colour) = params.border_colour {
                self.gl.tex_parameter_f32_slice(target, glow::TEXTURE_BORDER_COLOR, &colour);
            }
            self.gl.bind_texture(target, None);
        }
        self.check_errors("texture upload");

        self.textures.insert(handle, TextureGl {
            id,
            target,
            width: desc.width,
            height: desc.height,
            num_rt: 0,
        });
        log::debug!(
            "created {handle} {:?} {:?} {}x{}x{}",
            desc.target,
            desc.internal_format,
            desc.width,
            desc.height,
            desc.depth
        );
    }

    pub(super) fn destroy_texture_gl(&mut self, handle: TextureHandle) {
        match self.textures.get(handle) {
            Some(tex) if tex.num_rt > 0 => {
                log::error!("cannot destroy {handle}: attached to {} framebuffers", tex.num_rt);
            }
            Some(_) => {
                if let Some(tex) = self.textures.take(handle) {
                    unsafe { self.gl.delete_texture(tex.id) };
                }
                log::debug!("destroyed {handle}");
            }
            None => log::warn!("skip destroying {handle}: not live"),
        }
    }

    // ── framebuffers ─────────────────────────────────────────────────────

    pub(super) fn create_frame_buffer_gl(&mut self, handle: FrameBufferHandle, attachments: &[Attachment]) {
        if let Some(old) = self.frame_buffers.take(handle) {
            log::warn!("{handle} already in use, overwritten");
            self.release_frame_buffer(old);
        }

        let fbo = match unsafe { self.gl.create_framebuffer() } {
            Ok(fbo) => fbo,
            Err(e) => {
                log::error!("{handle}: glGenFramebuffers failed: {e}");
                return;
            }
        };

        let mut draw_buffers = Vec::new();
        let mut attached = Vec::with_capacity(attachments.len());
        let (mut width, mut height) = (0, 0);
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo)) };
        for a in attachments {
            let Some(tex) = self.textures.get_mut(a.texture) else {
                log::error!("{handle}: cannot attach {}: not live", a.texture);
                continue;
            };
            if tex.target != glow::TEXTURE_2D {
                log::error!("{handle}: cannot attach non-2D {}", a.texture);
                continue;
            }
            let point = attachment_point(a.slot);
            unsafe {
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    point,
                    glow::TEXTURE_2D,
                    Some(tex.id),
                    0,
                );
            }
            tex.num_rt += 1;
            attached.push(a.texture);
            if a.slot.colour_index().is_some() {
                draw_buffers.push(point);
            }
            if width == 0 {
                (width, height) = (tex.width, tex.height);
            }
        }

        unsafe {
            if draw_buffers.is_empty() {
                self.gl.draw_buffer(glow::NONE);
                self.gl.read_buffer(glow::NONE);
            } else {
                self.gl.draw_buffers(&draw_buffers);
            }
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::error!("{handle} incomplete (status {status:#06x})");
            } else {
                log::debug!("created {handle} ({} attachments, {width}x{height})", attached.len());
            }
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }

        self.frame_buffers.insert(handle, FrameBufferGl { fbo, width, height, attached });
    }

    pub(super) fn destroy_frame_buffer_gl(&mut self, handle: FrameBufferHandle) {
        match self.frame_buffers.take(handle) {
            Some(fb) => {
                self.release_frame_buffer(fb);
                log::debug!("destroyed {handle}");
            }
            None => log::warn!("skip destroying {handle}: not live"),
        }
    }

    fn release_frame_buffer(&mut self, fb: FrameBufferGl) {
        for tex in &fb.attached {
            if let Some(tex) = self.textures.get_mut(*tex) {
                tex.num_rt = tex.num_rt.saturating_sub(1);
            }
        }
        unsafe { self.gl.delete_framebuffer(fb.fbo) };
    }

    /// Deletes every live GL object. Framebuffers go first so no texture is
    /// still attached when it is deleted.
    pub(super) fn release_all(&mut self) {
        let gl = &self.gl;
        unsafe {
            for fb in self.frame_buffers.drain() {
                gl.delete_framebuffer(fb.fbo);
            }
            for tex in self.textures.drain() {
                gl.delete_texture(tex.id);
            }
            for program in self.programs.drain() {
                gl.delete_program(program.id);
            }
            for shader in self.shaders.drain() {
                gl.delete_shader(shader.id);
            }
            for buffer in self.vertex_buffers.drain().chain(self.index_buffers.drain()) {
                gl.delete_buffer(buffer.id);
            }
        }
        self.vertex_layouts.drain().for_each(drop);
    }
}
