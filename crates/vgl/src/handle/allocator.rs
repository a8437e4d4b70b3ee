use super::types::{Handle, INVALID_HANDLE};

/// Fixed-capacity slot allocator with a rotating "next free" cursor.
///
/// `alloc` scans forward (wrapping) from the cursor and returns the first free
/// slot. `free` rewinds the cursor to the released slot so recently freed slots
/// are reused first. Exhaustion yields the invalid handle; it never panics.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    used: Vec<u64>,
    capacity: u16,
    next_free: u16,
    num_allocated: u16,
}

impl HandleAllocator {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(
            capacity < INVALID_HANDLE as usize,
            "allocator capacity collides with the invalid handle"
        );
        let capacity = capacity.min(INVALID_HANDLE as usize - 1) as u16;
        Self {
            used: vec![0; (capacity as usize).div_ceil(64)],
            capacity,
            next_free: 0,
            num_allocated: 0,
        }
    }

    #[inline]
    fn test(&self, idx: u16) -> bool {
        let i = idx as usize;
        self.used[i / 64] & (1 << (i % 64)) != 0
    }

    #[inline]
    fn set(&mut self, idx: u16, value: bool) {
        let i = idx as usize;
        if value {
            self.used[i / 64] |= 1 << (i % 64);
        } else {
            self.used[i / 64] &= !(1 << (i % 64));
        }
    }

    /// Allocates a slot, or returns the invalid handle when every slot is taken.
    pub fn alloc<H: Handle>(&mut self) -> H {
        if self.num_allocated == self.capacity {
            return H::from_index(INVALID_HANDLE);
        }
        for i in 0..self.capacity {
            let idx = ((self.next_free as u32 + i as u32) % self.capacity as u32) as u16;
            if !self.test(idx) {
                self.set(idx, true);
                self.next_free = ((idx as u32 + 1) % self.capacity as u32) as u16;
                self.num_allocated += 1;
                return H::from_index(idx);
            }
        }
        H::from_index(INVALID_HANDLE)
    }

    /// Releases a slot. Out-of-range or already free handles are ignored.
    pub fn free<H: Handle>(&mut self, handle: H) {
        let idx = handle.index();
        if idx < self.capacity && self.test(idx) {
            self.set(idx, false);
            self.next_free = idx;
            self.num_allocated -= 1;
        }
    }

    /// True if the handle refers to a currently allocated slot.
    pub fn is_allocated<H: Handle>(&self, handle: H) -> bool {
        let idx = handle.index();
        idx < self.capacity && self.test(idx)
    }

    #[inline]
    pub fn num_allocated(&self) -> u16 {
        self.num_allocated
    }

    #[inline]
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Releases every slot at once.
    pub fn reset(&mut self) {
        self.used.iter_mut().for_each(|w| *w = 0);
        self.next_free = 0;
        self.num_allocated = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::TextureHandle;

    // ── alloc ─────────────────────────────────────────────────────────────

    #[test]
    fn alloc_is_sequential_from_empty() {
        let mut a = HandleAllocator::new(4);
        let h: Vec<TextureHandle> = (0..4).map(|_| a.alloc()).collect();
        assert_eq!(h.iter().map(|h| h.idx()).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(a.num_allocated(), 4);
    }

    #[test]
    fn alloc_exhausted_returns_invalid() {
        let mut a = HandleAllocator::new(2);
        let _: TextureHandle = a.alloc();
        let _: TextureHandle = a.alloc();
        let h: TextureHandle = a.alloc();
        assert!(!h.is_valid());
        assert_eq!(a.num_allocated(), 2);
    }

    #[test]
    fn capacity_not_multiple_of_word() {
        let mut a = HandleAllocator::new(70);
        for _ in 0..70 {
            let h: TextureHandle = a.alloc();
            assert!(h.is_valid());
        }
        let h: TextureHandle = a.alloc();
        assert!(!h.is_valid());
    }

    // ── free ──────────────────────────────────────────────────────────────

    #[test]
    fn freed_slot_is_reused_next() {
        let mut a = HandleAllocator::new(8);
        let hs: Vec<TextureHandle> = (0..5).map(|_| a.alloc()).collect();
        a.free(hs[1]);
        let h: TextureHandle = a.alloc();
        assert_eq!(h.idx(), 1);
    }

    #[test]
    fn freed_slot_available_when_full() {
        let mut a = HandleAllocator::new(3);
        let hs: Vec<TextureHandle> = (0..3).map(|_| a.alloc()).collect();
        a.free(hs[2]);
        let h: TextureHandle = a.alloc();
        assert_eq!(h.idx(), 2);
    }

    #[test]
    fn double_free_is_ignored() {
        let mut a = HandleAllocator::new(4);
        let h: TextureHandle = a.alloc();
        a.free(h);
        a.free(h);
        assert_eq!(a.num_allocated(), 0);
        a.free(TextureHandle::INVALID);
        assert_eq!(a.num_allocated(), 0);
    }

    #[test]
    fn valid_count_never_exceeds_free_slots() {
        let mut a = HandleAllocator::new(16);
        let mut live: Vec<TextureHandle> = Vec::new();
        // Deterministic interleaving of allocs and frees.
        for step in 0u32..400 {
            if step % 3 == 2 && !live.is_empty() {
                let h = live.remove((step as usize * 7) % live.len());
                a.free(h);
            } else {
                let h: TextureHandle = a.alloc();
                if live.len() < 16 {
                    assert!(h.is_valid());
                    assert!(!live.contains(&h));
                    live.push(h);
                } else {
                    assert!(!h.is_valid());
                }
            }
            assert_eq!(a.num_allocated() as usize, live.len());
        }
    }

    #[test]
    fn reset_releases_everything() {
        let mut a = HandleAllocator::new(4);
        let h: TextureHandle = a.alloc();
        a.reset();
        assert!(!a.is_allocated(h));
        assert_eq!(a.num_allocated(), 0);
    }
}
