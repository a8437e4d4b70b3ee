//! Render-side decoding of resource commands.

use crate::backend::Backend;
use crate::command::{CommandBuffer, Opcode};
use crate::handle::{
    FrameBufferHandle, IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle,
    VertexBufferHandle, VertexLayoutHandle,
};
use crate::types::{
    Attachment, AttachmentSlot, BufferFlags, ShaderType, TexFormat, TexTarget, TextureDesc,
    TextureFlags,
};
use crate::vertex::VertexLayout;

/// Walks a sealed command buffer from the start, forwarding each command to
/// `backend`, until `End`. Payloads are dropped once the backend returns.
pub(crate) fn execute(cb: &mut CommandBuffer, backend: &mut dyn Backend) {
    cb.rewind();
    loop {
        if cb.is_exhausted() {
            log::error!("command buffer ended without an End marker");
            return;
        }
        let op = match cb.read_opcode() {
            Ok(op) => op,
            Err(byte) => {
                // Argument layout unknown: nothing after this point can be decoded.
                log::error!("unknown opcode {byte:#04x}, abandoning command buffer");
                return;
            }
        };
        log::trace!("dispatch {op:?}");

        match op {
            Opcode::End => return,

            Opcode::RendererInit
            | Opcode::RendererShutdownBegin
            | Opcode::RendererShutdownEnd
            | Opcode::UpdateTexture
            | Opcode::ResizeTexture => {
                log::warn!("{op:?} has no handler, ignored");
            }

            Opcode::CreateVertexLayout => {
                let handle = cb.read::<VertexLayoutHandle>();
                match VertexLayout::decode(cb) {
                    Some(layout) => backend.create_vertex_layout(handle, &layout),
                    None => log::error!("{handle}: malformed vertex layout, skipped"),
                }
            }
            Opcode::CreateVertexBuffer => {
                let handle = cb.read::<VertexBufferHandle>();
                let size = cb.read::<u32>();
                let layout = cb.read::<VertexLayoutHandle>();
                let data = cb.read_payload();
                let flags = BufferFlags::from_bits_truncate(cb.read::<u8>());
                backend.create_vertex_buffer(handle, size, layout, data.as_deref(), flags);
            }
            Opcode::CreateIndexBuffer => {
                let handle = cb.read::<IndexBufferHandle>();
                let size = cb.read::<u32>();
                let data = cb.read_payload();
                let flags = BufferFlags::from_bits_truncate(cb.read::<u8>());
                backend.create_index_buffer(handle, size, data.as_deref(), flags);
            }
            Opcode::CreateDynamicVertexBuffer => {
                let handle = cb.read::<VertexBufferHandle>();
                let size = cb.read::<u32>();
                let layout = cb.read::<VertexLayoutHandle>();
                let flags = BufferFlags::from_bits_truncate(cb.read::<u8>());
                backend.create_dynamic_vertex_buffer(handle, size, layout, flags);
            }
            Opcode::UpdateDynamicVertexBuffer => {
                let handle = cb.read::<VertexBufferHandle>();
                let offset = cb.read::<u32>();
                match cb.read_payload() {
                    Some(data) => backend.update_dynamic_vertex_buffer(handle, offset, &data),
                    None => log::error!("{handle}: update without data, skipped"),
                }
            }
            Opcode::CreateDynamicIndexBuffer => {
                let handle = cb.read::<IndexBufferHandle>();
                let size = cb.read::<u32>();
                let flags = BufferFlags::from_bits_truncate(cb.read::<u8>());
                backend.create_dynamic_index_buffer(handle, size, flags);
            }
            Opcode::UpdateDynamicIndexBuffer => {
                let handle = cb.read::<IndexBufferHandle>();
                let offset = cb.read::<u32>();
                match cb.read_payload() {
                    Some(data) => backend.update_dynamic_index_buffer(handle, offset, &data),
                    None => log::error!("{handle}: update without data, skipped"),
                }
            }
            Opcode::CreateShader => {
                let handle = cb.read::<ShaderHandle>();
                let ty = cb.read_enum::<ShaderType>();
                let source = cb.read_payload().map(String::from_utf8);
                match (ty, source) {
                    (Ok(ty), Some(Ok(source))) => backend.create_shader(handle, ty, &source),
                    (Err(byte), _) => log::error!("{handle}: unknown shader type {byte}, skipped"),
                    (_, Some(Err(e))) => log::error!("{handle}: shader source is not UTF-8: {e}"),
                    (_, None) => log::error!("{handle}: shader without source, skipped"),
                }
            }
            Opcode::CreateProgram => {
                let handle = cb.read::<ProgramHandle>();
                let vert = cb.read::<ShaderHandle>();
                let frag = cb.read::<ShaderHandle>();
                backend.create_program(handle, vert, frag);
            }
            Opcode::CreateTexture => {
                let handle = cb.read::<TextureHandle>();
                let target = cb.read_enum::<TexTarget>();
                let internal_format = cb.read_enum::<TexFormat>();
                let width = cb.read::<u16>();
                let height = cb.read::<u16>();
                let depth = cb.read::<u16>();
                let num_layers = cb.read::<u8>();
                let use_mips = cb.read_bool();
                let format = cb.read_enum::<TexFormat>();
                let data = cb.read_payload();
                let flags = TextureFlags::from_bits(cb.read::<u64>());
                match (target, internal_format, format) {
                    (Ok(target), Ok(internal_format), Ok(format)) => {
                        let desc = TextureDesc {
                            target,
                            internal_format,
                            width,
                            height,
                            depth,
                            num_layers,
                            use_mips,
                            format,
                            flags,
                        };
                        backend.create_texture(handle, &desc, data.as_deref());
                    }
                    _ => log::error!("{handle}: malformed texture command, skipped"),
                }
            }
            Opcode::CreateFrameBuffer => {
                let handle = cb.read::<FrameBufferHandle>();
                let num = cb.read::<u8>();
                let mut attachments = Vec::with_capacity(num as usize);
                let mut valid = true;
                for _ in 0..num {
                    let slot = cb.read_enum::<AttachmentSlot>();
                    let texture = cb.read::<TextureHandle>();
                    match slot {
                        Ok(slot) => attachments.push(Attachment::new(slot, texture)),
                        Err(_) => valid = false,
                    }
                }
                if valid {
                    backend.create_frame_buffer(handle, &attachments);
                } else {
                    log::error!("{handle}: malformed attachment list, skipped");
                }
            }

            Opcode::DestroyVertexLayout => backend.destroy_vertex_layout(cb.read()),
            Opcode::DestroyVertexBuffer => backend.destroy_vertex_buffer(cb.read()),
            Opcode::DestroyIndexBuffer => backend.destroy_index_buffer(cb.read()),
            Opcode::DestroyDynamicVertexBuffer => backend.destroy_dynamic_vertex_buffer(cb.read()),
            Opcode::DestroyDynamicIndexBuffer => backend.destroy_dynamic_index_buffer(cb.read()),
            Opcode::DestroyShader => backend.destroy_shader(cb.read()),
            Opcode::DestroyProgram => backend.destroy_program(cb.read()),
            Opcode::DestroyTexture => backend.destroy_texture(cb.read()),
            Opcode::DestroyFrameBuffer => backend.destroy_frame_buffer(cb.read()),
        }
    }
}
