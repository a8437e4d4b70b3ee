use bytemuck::Pod;

use super::Opcode;
use crate::limits::MIN_RESOURCE_COMMAND_BUFFER_SIZE;

/// Growth step when a write runs past capacity.
const GROW_CHUNK: usize = 16 * 1024;
/// Capacities are kept at multiples of this.
const CAPACITY_ALIGN: usize = 1024;
/// Stream marker for "no payload".
const NO_PAYLOAD: u32 = u32::MAX;

#[inline]
const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Linear byte stream of serialized resource commands.
///
/// A command is a one-byte [`Opcode`] followed by its arguments, each aligned
/// to its own alignment. Heap payloads (vertex data, shader source, texels) do
/// not go through the byte stream: the stream carries an index into a side
/// table that owns the bytes until the consumer takes them with
/// [`read_payload`](Self::read_payload).
///
/// Lifecycle per frame: [`start`](Self::start), any number of writes,
/// [`finish`](Self::finish), then reads from the beginning until `End`.
#[derive(Debug)]
pub struct CommandBuffer {
    data: Vec<u8>,
    pos: usize,
    size: usize,
    min_capacity: usize,
    open: bool,
    payloads: Vec<Option<Vec<u8>>>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::with_min_capacity(MIN_RESOURCE_COMMAND_BUFFER_SIZE as usize)
    }

    pub fn with_min_capacity(min_capacity: usize) -> Self {
        let min_capacity = align_up(min_capacity.max(1), CAPACITY_ALIGN);
        Self {
            data: vec![0; min_capacity],
            pos: 0,
            size: 0,
            min_capacity,
            open: false,
            payloads: Vec::new(),
        }
    }

    /// Opens the buffer for recording. Drops anything still recorded.
    pub fn start(&mut self) {
        self.pos = 0;
        self.size = 0;
        self.payloads.clear();
        self.open = true;
    }

    /// Appends `End`, seals the recorded size and rewinds for reading.
    ///
    /// Shrinks back to the minimum capacity if the recorded size fell below it.
    pub fn finish(&mut self) {
        self.write_opcode(Opcode::End);
        self.size = self.pos;
        self.pos = 0;
        self.open = false;

        if self.size < self.min_capacity && self.data.len() != self.min_capacity {
            self.data.truncate(self.min_capacity);
            self.data.shrink_to_fit();
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Recorded size in bytes, valid after [`finish`](Self::finish).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Payloads recorded since the last [`start`](Self::start).
    #[inline]
    pub fn num_payloads(&self) -> usize {
        self.payloads.len()
    }

    /// True once the read cursor has consumed the whole recorded stream.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.size
    }

    /// Rewinds the read cursor so a sealed buffer can be walked again.
    ///
    /// Payloads already taken stay taken.
    #[inline]
    pub fn rewind(&mut self) {
        debug_assert!(!self.open, "rewind on an open command buffer");
        self.pos = 0;
    }

    fn reserve(&mut self, end: usize) {
        if end <= self.data.len() {
            return;
        }
        let mut capacity = self.data.len();
        while capacity < end {
            capacity += GROW_CHUNK;
        }
        let capacity = align_up(capacity, CAPACITY_ALIGN);
        log::trace!("command buffer grows {} -> {capacity}", self.data.len());
        self.data.resize(capacity, 0);
    }

    // ── write ────────────────────────────────────────────────────────────

    pub fn write<T: Pod>(&mut self, value: &T) {
        debug_assert!(self.open, "write to a sealed command buffer");
        let start = align_up(self.pos, align_of::<T>());
        let end = start + size_of::<T>();
        self.reserve(end);
        self.data[start..end].copy_from_slice(bytemuck::bytes_of(value));
        self.pos = end;
    }

    #[inline]
    pub fn write_opcode(&mut self, op: Opcode) {
        self.write(&op.as_u8());
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.write(&u8::from(value));
    }

    /// Moves `payload` into the side table and records its index.
    pub fn write_payload(&mut self, payload: Option<Vec<u8>>) {
        let index = match payload {
            Some(bytes) => {
                self.payloads.push(Some(bytes));
                (self.payloads.len() - 1) as u32
            }
            None => NO_PAYLOAD,
        };
        self.write(&index);
    }

    // ── read ─────────────────────────────────────────────────────────────

    /// Reads the next `T`. A read past the recorded size yields zeroes.
    pub fn read<T: Pod>(&mut self) -> T {
        debug_assert!(!self.open, "read from an open command buffer");
        let start = align_up(self.pos, align_of::<T>());
        let end = start + size_of::<T>();
        debug_assert!(end <= self.size, "read past the recorded command stream");
        if end > self.size {
            log::error!("command buffer read past recorded size ({end} > {})", self.size);
            self.pos = self.size;
            return T::zeroed();
        }
        self.pos = end;
        bytemuck::pod_read_unaligned(&self.data[start..end])
    }

    /// Reads the next opcode. Unknown bytes are returned as `Err`.
    #[inline]
    pub fn read_opcode(&mut self) -> Result<Opcode, u8> {
        Opcode::try_from(self.read::<u8>())
    }

    #[inline]
    pub fn read_bool(&mut self) -> bool {
        self.read::<u8>() != 0
    }

    /// Takes ownership of the next payload. A payload can be taken once.
    pub fn read_payload(&mut self) -> Option<Vec<u8>> {
        let index = self.read::<u32>();
        if index == NO_PAYLOAD {
            return None;
        }
        self.payloads.get_mut(index as usize).and_then(Option::take)
    }

    /// Reads a one-byte enum, handing back the raw byte if it is out of range.
    #[inline]
    pub fn read_enum<E: TryFrom<u8, Error = u8>>(&mut self) -> Result<E, u8> {
        E::try_from(self.read::<u8>())
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}
