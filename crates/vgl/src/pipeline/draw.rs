use super::{Rect, ViewId};
use crate::handle::{IndexBufferHandle, ProgramHandle, TextureHandle, VertexBufferHandle};
use crate::limits::{MAX_TEXTURE_UNITS, MAX_VERTEX_STREAMS};
use crate::types::{DiscardFlags, StateFlags, StencilFlags, UniformType};

/// Vertex buffer bound to a stream. A zero count means "whole buffer".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct VertexStream {
    pub handle: VertexBufferHandle,
    pub start: u32,
    pub count: u32,
}

/// Index buffer range. Zero start and count mean "whole buffer".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct IndexStream {
    pub handle: IndexBufferHandle,
    pub start: u32,
    pub count: u32,
}

/// Texture bound to a unit and the sampler uniform that reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureUnit {
    pub name: String,
    pub handle: TextureHandle,
}

/// Owned copy of a uniform value.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub ty: UniformType,
    /// `ty.size() * num_elements` bytes.
    pub data: Vec<u8>,
    pub num_elements: u16,
    pub transpose: bool,
}

/// Complete description of one draw.
///
/// Stream and texture slots carry a presence bit so a slot set to handle 0
/// is distinguishable from an unset slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub view: ViewId,

    pub vertex_streams: [VertexStream; MAX_VERTEX_STREAMS],
    pub vertex_streams_set: u8,
    /// Smallest explicit vertex count across set streams.
    pub num_vertices: Option<u32>,

    pub index_stream: IndexStream,

    pub state: StateFlags,
    pub front_stencil: StencilFlags,
    pub back_stencil: StencilFlags,
    pub scissor: Rect,

    pub texture_units: [TextureUnit; MAX_TEXTURE_UNITS],
    pub texture_units_set: u16,

    /// In `set_uniform` order; later entries override earlier ones by name.
    pub uniforms: Vec<Uniform>,

    pub program: ProgramHandle,
}

impl Default for DrawCall {
    fn default() -> Self {
        Self {
            view: ViewId::MAX,
            vertex_streams: [VertexStream::default(); MAX_VERTEX_STREAMS],
            vertex_streams_set: 0,
            num_vertices: None,
            index_stream: IndexStream::default(),
            state: StateFlags::DEFAULT,
            front_stencil: StencilFlags::NONE,
            back_stencil: StencilFlags::NONE,
            scissor: Rect::ZERO,
            texture_units: std::array::from_fn(|_| TextureUnit::default()),
            texture_units_set: 0,
            uniforms: Vec::new(),
            program: ProgramHandle::INVALID,
        }
    }
}

impl DrawCall {
    #[inline]
    pub fn is_stream_set(&self, stream: usize) -> bool {
        stream < MAX_VERTEX_STREAMS && self.vertex_streams_set & (1 << stream) != 0
    }

    #[inline]
    pub fn is_texture_unit_set(&self, unit: usize) -> bool {
        unit < MAX_TEXTURE_UNITS && self.texture_units_set & (1 << unit) != 0
    }

    /// Set vertex streams with their stream index.
    pub fn streams(&self) -> impl Iterator<Item = (usize, &VertexStream)> {
        self.vertex_streams
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_stream_set(*i))
    }

    /// Set texture units with their unit index.
    pub fn textures(&self) -> impl Iterator<Item = (usize, &TextureUnit)> {
        self.texture_units
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_texture_unit_set(*i))
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index_stream.handle.is_valid()
    }

    /// True if the draw references any vertex or index data.
    #[inline]
    pub fn has_geometry(&self) -> bool {
        self.vertex_streams_set != 0 || self.is_indexed()
    }

    /// Resets the state groups named by `flags`. The program is always reset.
    pub fn discard(&mut self, flags: DiscardFlags) {
        if flags.contains(DiscardFlags::VERTEX_STREAMS) {
            self.vertex_streams = [VertexStream::default(); MAX_VERTEX_STREAMS];
            self.vertex_streams_set = 0;
            self.num_vertices = None;
        }
        if flags.contains(DiscardFlags::INDEX_BUFFER) {
            self.index_stream = IndexStream::default();
        }
        if flags.contains(DiscardFlags::STATE) {
            self.state = StateFlags::DEFAULT;
            self.front_stencil = StencilFlags::NONE;
            self.back_stencil = StencilFlags::NONE;
            self.scissor = Rect::ZERO;
        }
        if flags.contains(DiscardFlags::UNIFORMS) {
            self.uniforms.clear();
        }
        if flags.contains(DiscardFlags::TEXTURES) {
            for unit in &mut self.texture_units {
                unit.name.clear();
                unit.handle = TextureHandle::INVALID;
            }
            self.texture_units_set = 0;
        }
        self.program = ProgramHandle::INVALID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> DrawCall {
        let mut d = DrawCall::default();
        d.vertex_streams[1] = VertexStream { handle: VertexBufferHandle::new(0), start: 0, count: 3 };
        d.vertex_streams_set = 0b10;
        d.num_vertices = Some(3);
        d.index_stream = IndexStream { handle: IndexBufferHandle::new(2), start: 0, count: 6 };
        d.state = StateFlags::DEFAULT.with_point_size(4);
        d.texture_units[0] = TextureUnit { name: "u_tex".into(), handle: TextureHandle::new(1) };
        d.texture_units_set = 1;
        d.uniforms.push(Uniform {
            name: "u_time".into(),
            ty: UniformType::Float,
            data: 1.0f32.to_ne_bytes().to_vec(),
            num_elements: 1,
            transpose: false,
        });
        d.program = ProgramHandle::new(0);
        d
    }

    // ── presence ──────────────────────────────────────────────────────────

    #[test]
    fn handle_zero_is_distinct_from_unset() {
        let d = populated();
        assert!(!d.is_stream_set(0));
        assert!(d.is_stream_set(1));
        assert_eq!(d.streams().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
        assert_eq!(d.textures().count(), 1);
        assert!(d.has_geometry());
        assert!(!DrawCall::default().has_geometry());
    }

    // ── discard ───────────────────────────────────────────────────────────

    #[test]
    fn discard_is_selective() {
        let mut d = populated();
        d.discard(DiscardFlags::UNIFORMS);
        assert!(d.uniforms.is_empty());
        assert!(d.is_stream_set(1));
        assert!(d.is_indexed());
        assert_eq!(d.state.point_size(), 4);
        assert!(!d.program.is_valid(), "program always resets");

        d.discard(DiscardFlags::VERTEX_STREAMS | DiscardFlags::STATE);
        assert_eq!(d.vertex_streams_set, 0);
        assert_eq!(d.num_vertices, None);
        assert_eq!(d.state, StateFlags::DEFAULT);
        assert!(d.is_indexed());
        assert_eq!(d.texture_units_set, 1);
    }

    #[test]
    fn discard_all_restores_default() {
        let mut d = populated();
        d.view = 0;
        d.discard(DiscardFlags::ALL);
        d.view = ViewId::MAX;
        assert_eq!(d, DrawCall::default());
    }
}
