use crate::command::CommandBuffer;
use crate::limits::MAX_ATTRIBUTES;
use crate::types::{Attrib, AttribType};

/// One attribute of an interleaved vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub attrib: Attrib,
    pub ty: AttribType,
    /// Components per element, 1..=4 for the GL attribute path.
    pub num_components: u8,
    /// Array elements (e.g. 4 for a mat4 split over four locations).
    pub num_elements: u8,
    pub normalized: bool,
    pub optional: bool,
    /// Byte offset inside the vertex.
    pub offset: u16,
    /// Byte size of the whole attribute.
    pub size: u16,
}

/// Ordered attribute list plus stride.
///
/// Built with [`VertexLayout::builder`]; offsets are assigned in call order.
///
/// ```ignore
/// let layout = VertexLayout::builder()
///     .add(Attrib::Position, AttribType::Float, 3, 1, false, false)
///     .add(Attrib::TexCoord0, AttribType::Float, 2, 1, false, false)
///     .end();
/// assert_eq!(layout.stride(), 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u16,
}

impl VertexLayout {
    pub fn builder() -> VertexLayoutBuilder {
        VertexLayoutBuilder::default()
    }

    #[inline]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, attrib: Attrib) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.attrib == attrib)
    }

    #[inline]
    pub fn has(&self, attrib: Attrib) -> bool {
        self.attribute(attrib).is_some()
    }

    pub(crate) fn encode(&self, cb: &mut CommandBuffer) {
        cb.write(&(self.attributes.len() as u8));
        cb.write(&self.stride);
        for a in &self.attributes {
            cb.write(&a.attrib.as_u8());
            cb.write(&a.ty.as_u8());
            cb.write(&a.num_components);
            cb.write(&a.num_elements);
            cb.write_bool(a.normalized);
            cb.write_bool(a.optional);
            cb.write(&a.offset);
            cb.write(&a.size);
        }
    }

    /// Reads a layout written by `encode`. Unknown enum bytes yield `None`
    /// after the whole record has been consumed.
    pub(crate) fn decode(cb: &mut CommandBuffer) -> Option<Self> {
        let count = cb.read::<u8>() as usize;
        let stride = cb.read::<u16>();
        let mut attributes = Vec::with_capacity(count);
        let mut valid = true;
        for _ in 0..count {
            let attrib = cb.read_enum::<Attrib>();
            let ty = cb.read_enum::<AttribType>();
            let num_components = cb.read::<u8>();
            let num_elements = cb.read::<u8>();
            let normalized = cb.read_bool();
            let optional = cb.read_bool();
            let offset = cb.read::<u16>();
            let size = cb.read::<u16>();
            match (attrib, ty) {
                (Ok(attrib), Ok(ty)) => attributes.push(VertexAttribute {
                    attrib,
                    ty,
                    num_components,
                    num_elements,
                    normalized,
                    optional,
                    offset,
                    size,
                }),
                _ => valid = false,
            }
        }
        valid.then_some(Self { attributes, stride })
    }
}

/// Accumulates attributes and padding; [`end`](Self::end) freezes the layout.
#[derive(Debug, Clone, Default)]
pub struct VertexLayoutBuilder {
    layout: VertexLayout,
}

impl VertexLayoutBuilder {
    /// Appends an attribute at the current stride.
    ///
    /// Component and element counts are raised to at least 1. Attributes past
    /// the maximum, or repeating a semantic already present, are ignored.
    pub fn add(
        mut self,
        attrib: Attrib,
        ty: AttribType,
        num_components: u8,
        num_elements: u8,
        normalized: bool,
        optional: bool,
    ) -> Self {
        if self.layout.attributes.len() >= MAX_ATTRIBUTES {
            log::warn!("vertex layout already has {MAX_ATTRIBUTES} attributes, {attrib:?} ignored");
            return self;
        }
        if self.layout.has(attrib) {
            log::warn!("vertex layout already contains {attrib:?}, duplicate ignored");
            return self;
        }

        let num_components = num_components.max(1);
        let num_elements = num_elements.max(1);
        let size = (ty.size() as u32)
            .checked_mul(num_components as u32 * num_elements as u32)
            .and_then(|size| u16::try_from(size).ok());
        let grown = size.and_then(|size| self.layout.stride.checked_add(size).map(|stride| (size, stride)));
        let Some((size, stride)) = grown else {
            log::warn!("vertex layout stride overflows with {attrib:?}, ignored");
            return self;
        };

        self.layout.attributes.push(VertexAttribute {
            attrib,
            ty,
            num_components,
            num_elements,
            normalized,
            optional,
            offset: self.layout.stride,
            size,
        });
        self.layout.stride = stride;
        self
    }

    /// Inserts `bytes` of padding. Padding that would overflow the stride is
    /// ignored.
    pub fn skip(mut self, bytes: u8) -> Self {
        match self.layout.stride.checked_add(bytes as u16) {
            Some(stride) => self.layout.stride = stride,
            None => log::warn!("vertex layout stride overflows with {bytes} bytes of padding, ignored"),
        }
        self
    }

    pub fn end(self) -> VertexLayout {
        self.layout
    }
}
