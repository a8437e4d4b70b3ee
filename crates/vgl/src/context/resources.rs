//! Resource creation and destruction.
//!
//! Every `create_*` validates, allocates a handle, mirrors the resource in the
//! registry and serializes a create command into the submit frame's pre
//! buffer. Failures return the invalid handle with a warning and queue
//! nothing. Destroy commands go to the post buffer so the frame's draws still
//! see the resource.

use super::Context;
use super::registry::{
    FrameBufferRef, IndexBufferRef, ProgramRef, ShaderRef, TextureRef, VertexBufferRef,
    VertexLayoutRef,
};
use crate::command::{CommandBuffer, Opcode};
use crate::handle::{
    FrameBufferHandle, Handle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::limits::MAX_ATTACHMENTS;
use crate::pipeline::PendingFree;
use crate::types::{
    Attachment, AttachmentSlot, AttachmentType, BufferFlags, ShaderType, TexFormat, TexTarget,
    TextureDesc, TextureFlags,
};
use crate::vertex::VertexLayout;

mod sealed {
    pub trait Sealed {}
}

/// Handle types accepted by [`Context::destroy`].
pub trait Resource: Handle + sealed::Sealed {
    #[doc(hidden)]
    fn release(self, ctx: &mut Context);
}

macro_rules! resource {
    ($handle:ty, $release:ident) => {
        impl sealed::Sealed for $handle {}

        impl Resource for $handle {
            #[inline]
            fn release(self, ctx: &mut Context) {
                ctx.$release(self);
            }
        }
    };
}

resource!(VertexLayoutHandle, release_vertex_layout);
resource!(VertexBufferHandle, release_vertex_buffer);
resource!(IndexBufferHandle, release_index_buffer);
resource!(ShaderHandle, release_shader);
resource!(ProgramHandle, release_program);
resource!(TextureHandle, release_texture);
resource!(FrameBufferHandle, release_frame_buffer);

fn byte_len(data: &[u8], what: &str) -> Option<u32> {
    if data.is_empty() {
        log::warn!("{what}: no data, creation rejected");
        return None;
    }
    match u32::try_from(data.len()) {
        Ok(len) => Some(len),
        Err(_) => {
            log::warn!("{what}: {} bytes exceeds the 4 GiB limit", data.len());
            None
        }
    }
}

impl Context {
    /// Writes `op` into the submit frame's pre or post buffer and returns it
    /// for the arguments.
    fn cmd(&mut self, op: Opcode) -> &mut CommandBuffer {
        let frame = &mut self.frames[self.submit];
        let cb = if op.is_pre() { &mut frame.cmd_pre } else { &mut frame.cmd_post };
        cb.write_opcode(op);
        cb
    }

    fn defer_free(&mut self, pending: PendingFree) {
        self.frames[self.submit].pending_frees.push(pending);
    }

    // ── vertex layouts ───────────────────────────────────────────────────

    pub fn create_vertex_layout(&mut self, layout: &VertexLayout) -> VertexLayoutHandle {
        if layout.attributes().is_empty() || layout.stride() == 0 {
            log::warn!("vertex layout is empty, creation rejected");
            return VertexLayoutHandle::INVALID;
        }
        let entry = VertexLayoutRef { layout: layout.clone(), ref_count: 1 };
        let Some(handle) = self.registry.vertex_layouts.insert(entry) else {
            log::warn!("vertex layout pool exhausted");
            return VertexLayoutHandle::INVALID;
        };

        let cb = self.cmd(Opcode::CreateVertexLayout);
        cb.write(&handle);
        layout.encode(cb);
        log::info!("created {handle} (stride {})", layout.stride());
        handle
    }

    /// Layout registered under `handle`, if it is live.
    pub fn vertex_layout(&self, handle: VertexLayoutHandle) -> Option<&VertexLayout> {
        self.registry.vertex_layouts.get(handle).map(|r| &r.layout)
    }

    fn retain_vertex_layout(&mut self, handle: VertexLayoutHandle) {
        if let Some(r) = self.registry.vertex_layouts.get_mut(handle) {
            r.ref_count += 1;
        }
    }

    fn release_vertex_layout(&mut self, handle: VertexLayoutHandle) {
        let Some(r) = self.registry.vertex_layouts.get_mut(handle) else {
            log::warn!("destroy of {handle}: not a live vertex layout");
            return;
        };
        r.ref_count -= 1;
        if r.ref_count > 0 {
            log::trace!("{handle} still referenced ({})", r.ref_count);
            return;
        }
        self.registry.vertex_layouts.remove(handle);
        self.cmd(Opcode::DestroyVertexLayout).write(&handle);
        self.defer_free(PendingFree::VertexLayout(handle));
        log::info!("destroyed {handle}");
    }

    // ── vertex buffers ───────────────────────────────────────────────────

    /// Static vertex buffer initialised from a copy of `data`.
    pub fn create_vertex_buffer(
        &mut self,
        data: &[u8],
        layout: VertexLayoutHandle,
        flags: BufferFlags,
    ) -> VertexBufferHandle {
        let Some(size) = byte_len(data, "vertex buffer") else {
            return VertexBufferHandle::INVALID;
        };
        let Some(handle) = self.insert_vertex_buffer(size, layout, false) else {
            return VertexBufferHandle::INVALID;
        };
        let cb = self.cmd(Opcode::CreateVertexBuffer);
        cb.write(&handle);
        cb.write(&size);
        cb.write(&layout);
        cb.write_payload(Some(data.to_vec()));
        cb.write(&flags.bits());
        log::info!("created {handle} ({size} bytes, {layout})");
        handle
    }

    /// Vertex buffer of `size` bytes filled later with
    /// [`update_dynamic_vertex_buffer`](Self::update_dynamic_vertex_buffer).
    pub fn create_dynamic_vertex_buffer(
        &mut self,
        size: u32,
        layout: VertexLayoutHandle,
        flags: BufferFlags,
    ) -> VertexBufferHandle {
        if size == 0 {
            log::warn!("dynamic vertex buffer of zero size rejected");
            return VertexBufferHandle::INVALID;
        }
        let Some(handle) = self.insert_vertex_buffer(size, layout, true) else {
            return VertexBufferHandle::INVALID;
        };
        let cb = self.cmd(Opcode::CreateDynamicVertexBuffer);
        cb.write(&handle);
        cb.write(&size);
        cb.write(&layout);
        cb.write(&flags.bits());
        log::info!("created dynamic {handle} ({size} bytes, {layout})");
        handle
    }

    fn insert_vertex_buffer(
        &mut self,
        size: u32,
        layout: VertexLayoutHandle,
        dynamic: bool,
    ) -> Option<VertexBufferHandle> {
        if !self.registry.vertex_layouts.contains(layout) {
            log::warn!("vertex buffer references {layout}, which is not live");
            return None;
        }
        let Some(handle) = self.registry.vertex_buffers.insert(VertexBufferRef { size, layout, dynamic })
        else {
            log::warn!("vertex buffer pool exhausted");
            return None;
        };
        self.retain_vertex_layout(layout);
        Some(handle)
    }

    /// Overwrites `data.len()` bytes at `offset` of a dynamic vertex buffer.
    pub fn update_dynamic_vertex_buffer(&mut self, handle: VertexBufferHandle, offset: u32, data: &[u8]) {
        let Some(r) = self.registry.vertex_buffers.get(handle) else {
            log::warn!("update of {handle}: not a live vertex buffer");
            return;
        };
        if !r.dynamic {
            log::warn!("update of {handle}: buffer is static");
            return;
        }
        if offset as u64 + data.len() as u64 > r.size as u64 || data.is_empty() {
            log::warn!(
                "update of {handle}: {} bytes at {offset} outside its {} bytes",
                data.len(),
                r.size
            );
            return;
        }
        let cb = self.cmd(Opcode::UpdateDynamicVertexBuffer);
        cb.write(&handle);
        cb.write(&offset);
        cb.write_payload(Some(data.to_vec()));
    }

    fn release_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        let Some(r) = self.registry.vertex_buffers.remove(handle) else {
            log::warn!("destroy of {handle}: not a live vertex buffer");
            return;
        };
        let op = if r.dynamic { Opcode::DestroyDynamicVertexBuffer } else { Opcode::DestroyVertexBuffer };
        self.cmd(op).write(&handle);
        self.defer_free(PendingFree::VertexBuffer(handle));
        log::info!("destroyed {handle}");
        self.release_vertex_layout(r.layout);
    }

    // ── index buffers ────────────────────────────────────────────────────

    /// Static index buffer. `BufferFlags::INDEX32` selects `u32` indices.
    pub fn create_index_buffer(&mut self, data: &[u8], flags: BufferFlags) -> IndexBufferHandle {
        let Some(size) = byte_len(data, "index buffer") else {
            return IndexBufferHandle::INVALID;
        };
        if size % flags.index_size() != 0 {
            log::warn!("index buffer of {size} bytes is not a whole number of indices");
        }
        let Some(handle) = self.registry.index_buffers.insert(IndexBufferRef { size, dynamic: false })
        else {
            log::warn!("index buffer pool exhausted");
            return IndexBufferHandle::INVALID;
        };
        let cb = self.cmd(Opcode::CreateIndexBuffer);
        cb.write(&handle);
        cb.write(&size);
        cb.write_payload(Some(data.to_vec()));
        cb.write(&flags.bits());
        log::info!("created {handle} ({size} bytes)");
        handle
    }

    pub fn create_dynamic_index_buffer(&mut self, size: u32, flags: BufferFlags) -> IndexBufferHandle {
        if size == 0 {
            log::warn!("dynamic index buffer of zero size rejected");
            return IndexBufferHandle::INVALID;
        }
        let Some(handle) = self.registry.index_buffers.insert(IndexBufferRef { size, dynamic: true })
        else {
            log::warn!("index buffer pool exhausted");
            return IndexBufferHandle::INVALID;
        };
        let cb = self.cmd(Opcode::CreateDynamicIndexBuffer);
        cb.write(&handle);
        cb.write(&size);
        cb.write(&flags.bits());
        log::info!("created dynamic {handle} ({size} bytes)");
        handle
    }

    pub fn update_dynamic_index_buffer(&mut self, handle: IndexBufferHandle, offset: u32, data: &[u8]) {
        let Some(r) = self.registry.index_buffers.get(handle) else {
            log::warn!("update of {handle}: not a live index buffer");
            return;
        };
        if !r.dynamic {
            log::warn!("update of {handle}: buffer is static");
            return;
        }
        if offset as u64 + data.len() as u64 > r.size as u64 || data.is_empty() {
            log::warn!(
                "update of {handle}: {} bytes at {offset} outside its {} bytes",
                data.len(),
                r.size
            );
            return;
        }
        let cb = self.cmd(Opcode::UpdateDynamicIndexBuffer);
        cb.write(&handle);
        cb.write(&offset);
        cb.write_payload(Some(data.to_vec()));
    }

    fn release_index_buffer(&mut self, handle: IndexBufferHandle) {
        let Some(r) = self.registry.index_buffers.remove(handle) else {
            log::warn!("destroy of {handle}: not a live index buffer");
            return;
        };
        let op = if r.dynamic { Opcode::DestroyDynamicIndexBuffer } else { Opcode::DestroyIndexBuffer };
        self.cmd(op).write(&handle);
        self.defer_free(PendingFree::IndexBuffer(handle));
        log::info!("destroyed {handle}");
    }

    // ── shaders and programs ─────────────────────────────────────────────

    /// Shader stage from GLSL source. Compilation happens at render time.
    pub fn create_shader(&mut self, ty: ShaderType, source: &str) -> ShaderHandle {
        if source.trim().is_empty() {
            log::warn!("{ty:?} shader without source rejected");
            return ShaderHandle::INVALID;
        }
        let Some(handle) = self.registry.shaders.insert(ShaderRef { ty, ref_count: 1 }) else {
            log::warn!("shader pool exhausted");
            return ShaderHandle::INVALID;
        };
        let cb = self.cmd(Opcode::CreateShader);
        cb.write(&handle);
        cb.write(&ty.as_u8());
        cb.write_payload(Some(source.as_bytes().to_vec()));
        log::info!("created {handle} ({ty:?})");
        handle
    }

    pub fn create_program(&mut self, vert: ShaderHandle, frag: ShaderHandle) -> ProgramHandle {
        for (shader, ty) in [(vert, ShaderType::Vertex), (frag, ShaderType::Fragment)] {
            match self.registry.shaders.get(shader) {
                Some(r) if r.ty == ty => {}
                Some(r) => {
                    log::warn!("program needs a {ty:?} shader, {shader} is {:?}", r.ty);
                    return ProgramHandle::INVALID;
                }
                None => {
                    log::warn!("program references {shader}, which is not live");
                    return ProgramHandle::INVALID;
                }
            }
        }
        let Some(handle) = self.registry.programs.insert(ProgramRef { vert, frag }) else {
            log::warn!("program pool exhausted");
            return ProgramHandle::INVALID;
        };
        for shader in [vert, frag] {
            if let Some(r) = self.registry.shaders.get_mut(shader) {
                r.ref_count += 1;
            }
        }
        let cb = self.cmd(Opcode::CreateProgram);
        cb.write(&handle);
        cb.write(&vert);
        cb.write(&frag);
        log::info!("created {handle} ({vert}, {frag})");
        handle
    }

    fn release_shader(&mut self, handle: ShaderHandle) {
        let Some(r) = self.registry.shaders.get_mut(handle) else {
            log::warn!("destroy of {handle}: not a live shader");
            return;
        };
        r.ref_count -= 1;
        if r.ref_count > 0 {
            log::trace!("{handle} still referenced ({})", r.ref_count);
            return;
        }
        self.registry.shaders.remove(handle);
        self.cmd(Opcode::DestroyShader).write(&handle);
        self.defer_free(PendingFree::Shader(handle));
        log::info!("destroyed {handle}");
    }

    fn release_program(&mut self, handle: ProgramHandle) {
        let Some(r) = self.registry.programs.remove(handle) else {
            log::warn!("destroy of {handle}: not a live program");
            return;
        };
        self.cmd(Opcode::DestroyProgram).write(&handle);
        self.defer_free(PendingFree::Program(handle));
        log::info!("destroyed {handle}");
        self.release_shader(r.vert);
        self.release_shader(r.frag);
    }

    // ── textures ─────────────────────────────────────────────────────────

    /// Texture from a full description. `data`, when given, must hold at
    /// least `desc.byte_size()` bytes.
    pub fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> TextureHandle {
        let internal = desc.internal_format.attachment_type();
        let upload = desc.format.attachment_type();
        if internal != upload {
            log::warn!(
                "texture formats disagree: {:?} is {internal:?}, {:?} is {upload:?}",
                desc.internal_format,
                desc.format
            );
            return TextureHandle::INVALID;
        }
        let size = desc.byte_size();
        if size == 0 {
            log::warn!("texture {}x{}x{} has no texels", desc.width, desc.height, desc.depth);
            return TextureHandle::INVALID;
        }
        if matches!(desc.target, TexTarget::Cube | TexTarget::CubeArray) && desc.width != desc.height {
            log::warn!("cube texture faces must be square, got {}x{}", desc.width, desc.height);
            return TextureHandle::INVALID;
        }
        if let Some(data) = data {
            if (data.len() as u64) < size {
                log::warn!("texture data holds {} of {size} bytes", data.len());
                return TextureHandle::INVALID;
            }
        }

        let Some(handle) = self.registry.textures.insert(TextureRef { desc: *desc, ref_count: 1 }) else {
            log::warn!("texture pool exhausted");
            return TextureHandle::INVALID;
        };
        let cb = self.cmd(Opcode::CreateTexture);
        cb.write(&handle);
        cb.write(&desc.target.as_u8());
        cb.write(&desc.internal_format.as_u8());
        cb.write(&desc.width);
        cb.write(&desc.height);
        cb.write(&desc.depth);
        cb.write(&desc.num_layers);
        cb.write_bool(desc.use_mips);
        cb.write(&desc.format.as_u8());
        cb.write_payload(data.map(<[u8]>::to_vec));
        cb.write(&desc.flags.bits());
        log::info!(
            "created {handle} ({:?} {}x{}x{} {:?})",
            desc.target,
            desc.width,
            desc.height,
            desc.depth,
            desc.internal_format
        );
        handle
    }

    /// 2D texture; more than one layer makes it a 2D array.
    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_2d(
        &mut self,
        width: u16,
        height: u16,
        num_layers: u8,
        use_mips: bool,
        internal_format: TexFormat,
        format: TexFormat,
        flags: TextureFlags,
        data: Option<&[u8]>,
    ) -> TextureHandle {
        let num_layers = num_layers.max(1);
        let target = if num_layers > 1 { TexTarget::T2DArray } else { TexTarget::T2D };
        let desc = TextureDesc {
            target,
            internal_format,
            width,
            height,
            depth: 1,
            num_layers,
            use_mips,
            format,
            flags,
        };
        self.create_texture(&desc, data)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_3d(
        &mut self,
        width: u16,
        height: u16,
        depth: u16,
        use_mips: bool,
        internal_format: TexFormat,
        format: TexFormat,
        flags: TextureFlags,
        data: Option<&[u8]>,
    ) -> TextureHandle {
        let desc = TextureDesc {
            target: TexTarget::T3D,
            internal_format,
            width,
            height,
            depth,
            num_layers: 1,
            use_mips,
            format,
            flags,
        };
        self.create_texture(&desc, data)
    }

    /// Cube map with `size`x`size` faces. Data holds the six faces in
    /// +X, -X, +Y, -Y, +Z, -Z order, layer by layer.
    #[allow(clippy::too_many_arguments)]
    pub fn create_texture_cube(
        &mut self,
        size: u16,
        num_layers: u8,
        use_mips: bool,
        internal_format: TexFormat,
        format: TexFormat,
        flags: TextureFlags,
        data: Option<&[u8]>,
    ) -> TextureHandle {
        let num_layers = num_layers.max(1);
        let target = if num_layers > 1 { TexTarget::CubeArray } else { TexTarget::Cube };
        let desc = TextureDesc {
            target,
            internal_format,
            width: size,
            height: size,
            depth: 6,
            num_layers,
            use_mips,
            format,
            flags,
        };
        self.create_texture(&desc, data)
    }

    /// Description of a live texture.
    pub fn texture_desc(&self, handle: TextureHandle) -> Option<&TextureDesc> {
        self.registry.textures.get(handle).map(|r| &r.desc)
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        let Some(r) = self.registry.textures.get_mut(handle) else {
            log::warn!("destroy of {handle}: not a live texture");
            return;
        };
        r.ref_count -= 1;
        if r.ref_count > 0 {
            log::trace!("{handle} still referenced ({})", r.ref_count);
            return;
        }
        self.registry.textures.remove(handle);
        self.cmd(Opcode::DestroyTexture).write(&handle);
        self.defer_free(PendingFree::Texture(handle));
        log::info!("destroyed {handle}");
    }

    // ── framebuffers ─────────────────────────────────────────────────────

    /// Framebuffer rendering into `attachments`. Each attachment's texture
    /// must be live and its format must match the slot category.
    pub fn create_frame_buffer(&mut self, attachments: &[Attachment]) -> FrameBufferHandle {
        if !self.validate_attachments(attachments) {
            return FrameBufferHandle::INVALID;
        }
        let entry = FrameBufferRef { attachments: attachments.to_vec() };
        let Some(handle) = self.registry.frame_buffers.insert(entry) else {
            log::warn!("framebuffer pool exhausted");
            return FrameBufferHandle::INVALID;
        };
        for a in attachments {
            if let Some(r) = self.registry.textures.get_mut(a.texture) {
                r.ref_count += 1;
            }
        }
        let cb = self.cmd(Opcode::CreateFrameBuffer);
        cb.write(&handle);
        cb.write(&(attachments.len() as u8));
        for a in attachments {
            cb.write(&a.slot.as_u8());
            cb.write(&a.texture);
        }
        log::info!("created {handle} ({} attachments)", attachments.len());
        handle
    }

    /// Colour target in slot 0 plus a combined depth-stencil target.
    pub fn create_frame_buffer_pair(
        &mut self,
        colour: TextureHandle,
        depth_stencil: TextureHandle,
    ) -> FrameBufferHandle {
        self.create_frame_buffer(&[
            Attachment::new(AttachmentSlot::Colour0, colour),
            Attachment::new(AttachmentSlot::DepthStencil, depth_stencil),
        ])
    }

    fn validate_attachments(&self, attachments: &[Attachment]) -> bool {
        if attachments.is_empty() || attachments.len() > MAX_ATTACHMENTS {
            log::warn!("framebuffer needs 1..={MAX_ATTACHMENTS} attachments, got {}", attachments.len());
            return false;
        }
        let mut colour_slots = 0u8;
        let (mut depth, mut stencil, mut depth_stencil) = (false, false, false);
        for a in attachments {
            let Some(texture) = self.registry.textures.get(a.texture) else {
                log::warn!("framebuffer attachment {:?} references a dead {}", a.slot, a.texture);
                return false;
            };
            let kind = texture.desc.internal_format.attachment_type();
            if kind != a.slot.attachment_type() {
                log::warn!("{} is a {kind:?} texture, it cannot go in {:?}", a.texture, a.slot);
                return false;
            }
            let duplicate = match kind {
                AttachmentType::Colour => {
                    let bit = 1 << a.slot.as_u8();
                    let seen = colour_slots & bit != 0;
                    colour_slots |= bit;
                    seen
                }
                AttachmentType::Depth => std::mem::replace(&mut depth, true) || depth_stencil,
                AttachmentType::Stencil => std::mem::replace(&mut stencil, true) || depth_stencil,
                AttachmentType::DepthStencil => {
                    std::mem::replace(&mut depth_stencil, true) || depth || stencil
                }
            };
            if duplicate {
                log::warn!("framebuffer has conflicting {:?} attachments", a.slot);
                return false;
            }
        }
        true
    }

    fn release_frame_buffer(&mut self, handle: FrameBufferHandle) {
        let Some(r) = self.registry.frame_buffers.remove(handle) else {
            log::warn!("destroy of {handle}: not a live framebuffer");
            return;
        };
        self.cmd(Opcode::DestroyFrameBuffer).write(&handle);
        self.defer_free(PendingFree::FrameBuffer(handle));
        log::info!("destroyed {handle}");
        for a in r.attachments {
            self.release_texture(a.texture);
        }
    }

    // ── destroy ──────────────────────────────────────────────────────────

    /// Releases one reference to a resource.
    ///
    /// Shared resources (layouts, shaders, textures) are destroyed when their
    /// last reference goes; everything else is destroyed immediately and then
    /// releases what it referenced. Invalid or dead handles are ignored with a
    /// warning.
    pub fn destroy<R: Resource>(&mut self, handle: R) {
        if !handle.is_valid() {
            log::warn!("destroy of an invalid {handle:?}");
            return;
        }
        handle.release(self);
    }
}
