use crate::error::TableError;
use crate::types::Scalar;

// ─── Byte Arena ─────────────────────────────────────────────────────────────
//
//  buf: [ free head room ........ | used region ]
//                                 ^ head       ^ buf.len()
//
// Positions handed out by the arena are distances from the end of `buf`
// ("used" offsets). They survive growth because growth only adds head room in
// front of the used region.

/// Downward-growing byte buffer backing a [`Builder`](crate::Builder).
#[derive(Debug)]
pub struct Arena {
    buf: Vec<u8>,
    head: usize,
    min_align: usize,
    max_capacity: usize,
}

impl Arena {
    pub fn new(initial_capacity: usize, max_capacity: usize) -> Self {
        let initial = initial_capacity.min(max_capacity);
        Self {
            buf: vec![0u8; initial],
            head: initial,
            min_align: 1,
            max_capacity,
        }
    }

    /// Bytes written so far.
    #[inline]
    pub fn used(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Largest alignment requested since the last reset.
    #[inline]
    pub fn min_align(&self) -> usize {
        self.min_align
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The used region, position-0 relative.
    #[inline]
    pub fn finished(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Consume the arena, keeping only the used region.
    pub fn into_finished(mut self) -> Vec<u8> {
        self.buf.drain(..self.head);
        self.buf
    }

    /// Forget everything written but keep the allocation.
    pub fn reset(&mut self) {
        self.head = self.buf.len();
        self.min_align = 1;
    }

    // ════════════════════════════════════════════════════════════════════════
    // Space management
    // ════════════════════════════════════════════════════════════════════════

    fn ensure_head_room(&mut self, n: usize) -> Result<(), TableError> {
        if self.head >= n {
            return Ok(());
        }
        let used = self.used();
        let requested = used
            .checked_add(n)
            .ok_or(TableError::CapacityExceeded {
                requested: usize::MAX,
                max: self.max_capacity,
            })?;
        if requested > self.max_capacity {
            tracing::warn!(requested, max = self.max_capacity, "arena growth rejected");
            return Err(TableError::CapacityExceeded {
                requested,
                max: self.max_capacity,
            });
        }

        let new_len = (self.buf.len().max(1) * 2)
            .max(requested)
            .min(self.max_capacity);
        let mut grown = vec![0u8; new_len];
        grown[new_len - used..].copy_from_slice(&self.buf[self.head..]);
        tracing::trace!(from = self.buf.len(), to = new_len, "arena grown");
        self.buf = grown;
        self.head = new_len - used;
        Ok(())
    }

    /// Reserve `n` bytes in front of the used region. Returns the new used size.
    /// The reserved bytes are not cleared.
    #[inline]
    pub fn make_space(&mut self, n: usize) -> Result<usize, TableError> {
        self.ensure_head_room(n)?;
        self.head -= n;
        Ok(self.used())
    }

    /// Write `n` zero bytes.
    pub fn pad(&mut self, n: usize) -> Result<(), TableError> {
        if n == 0 {
            return Ok(());
        }
        self.make_space(n)?;
        self.buf[self.head..self.head + n].fill(0);
        Ok(())
    }

    /// Zero-pad so that after `additional` more bytes are written, the next
    /// write of `size` bytes lands on a `size`-aligned address.
    pub fn prep(&mut self, size: usize, additional: usize) -> Result<(), TableError> {
        debug_assert!(size.is_power_of_two());
        self.min_align = self.min_align.max(size);
        let padding = (size - (self.used() + additional) % size) % size;
        self.pad(padding)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Writes
    // ════════════════════════════════════════════════════════════════════════

    /// Write a scalar at the head without aligning. Returns the new used size.
    #[inline]
    pub fn push<T: Scalar>(&mut self, value: T) -> Result<usize, TableError> {
        let used = self.make_space(T::WIDTH)?;
        value.write_le(&mut self.buf[self.head..self.head + T::WIDTH]);
        Ok(used)
    }

    /// Write raw bytes at the head. Returns the new used size.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<usize, TableError> {
        let used = self.make_space(bytes.len())?;
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
        Ok(used)
    }

    /// Overwrite a scalar previously reserved at used-position `pos`.
    #[inline]
    pub fn write_at<T: Scalar>(&mut self, pos: usize, value: T) {
        let start = self.buf.len() - pos;
        value.write_le(&mut self.buf[start..start + T::WIDTH]);
    }

    /// Borrow `len` bytes starting at used-position `pos`, or `None` if they
    /// are not all inside the used region.
    #[inline]
    pub fn bytes_at(&self, pos: usize, len: usize) -> Option<&[u8]> {
        if pos > self.used() || len > pos {
            return None;
        }
        let start = self.buf.len() - pos;
        Some(&self.buf[start..start + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prep_pads_with_zeros() {
        let mut arena = Arena::new(16, 1024);
        arena.push(0xFFu8).unwrap();
        arena.prep(4, 0).unwrap();
        assert_eq!(arena.used(), 4);
        assert_eq!(arena.finished(), &[0, 0, 0, 0xFF]);
        assert_eq!(arena.min_align(), 4);
    }

    #[test]
    fn test_prep_accounts_for_additional_bytes() {
        let mut arena = Arena::new(16, 1024);
        arena.prep(4, 3).unwrap();
        assert_eq!(arena.used(), 1);
        arena.push_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(arena.used() % 4, 0);
    }

    #[test]
    fn test_growth_keeps_used_region_at_the_end() {
        let mut arena = Arena::new(2, 1024);
        arena.push(0x0102_0304u32).unwrap();
        arena.push(0x0506_0708u32).unwrap();
        assert!(arena.capacity() >= 8);
        assert_eq!(arena.finished(), &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut arena = Arena::new(4, 8);
        arena.push(1u32).unwrap();
        arena.push(2u32).unwrap();
        let err = arena.push(3u8).unwrap_err();
        assert_eq!(err, TableError::CapacityExceeded { requested: 9, max: 8 });
        // Failed growth leaves the written data intact.
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn test_write_at_and_bytes_at() {
        let mut arena = Arena::new(8, 64);
        let pos = arena.push(0i32).unwrap();
        arena.push(9u16).unwrap();
        arena.write_at(pos, -6i32);
        assert_eq!(arena.bytes_at(pos, 4), Some(&(-6i32).to_le_bytes()[..]));
    }

    #[test]
    fn test_bytes_at_stays_inside_used_region() {
        let mut arena = Arena::new(16, 64);
        let pos = arena.push(1u16).unwrap();
        arena.push(2u16).unwrap();
        assert_eq!(arena.bytes_at(4, 4), Some(&[2, 0, 1, 0][..]));
        // Runs past the end of the buffer.
        assert_eq!(arena.bytes_at(pos, 4), None);
        // Starts before the head.
        assert_eq!(arena.bytes_at(6, 2), None);
    }

    #[test]
    fn test_reset_reuses_allocation() {
        let mut arena = Arena::new(8, 64);
        arena.push(7u64).unwrap();
        arena.prep(8, 0).unwrap();
        let cap = arena.capacity();
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.min_align(), 1);
        assert_eq!(arena.capacity(), cap);
        // Stale bytes are never exposed by padding.
        arena.pad(3).unwrap();
        assert_eq!(arena.finished(), &[0, 0, 0]);
    }
}
