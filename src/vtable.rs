use std::num::NonZeroUsize;

use arrayvec::ArrayVec;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use xxhash_rust::xxh64::xxh64;

use crate::arena::Arena;
use crate::error::TableError;
use crate::types::*;

// ─── VTable Registry (write side) ───────────────────────────────────────────

/// Vtables sharing one hash bucket. Collisions are rare; the oldest
/// candidate is dropped when a bucket fills up.
type Bucket = ArrayVec<u32, 4>;

/// Deduplicates vtables emitted during one build session.
///
/// Candidates are found by an `xxh64` of the vtable bytes and confirmed by an
/// exact comparison against the bytes already in the arena, so a hash
/// collision can never merge two different layouts.
pub struct VTableRegistry {
    index: LruCache<u64, Bucket, FxBuildHasher>,
    stats: VTableStats,
}

impl VTableRegistry {
    /// `capacity = None` keeps every vtable of the session.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let index = match capacity {
            Some(cap) => LruCache::with_hasher(cap, FxBuildHasher),
            None => LruCache::unbounded_with_hasher(FxBuildHasher),
        };
        Self {
            index,
            stats: VTableStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> VTableStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.stats = VTableStats::default();
    }

    /// Return the used-position of an identical vtable already in `arena`,
    /// or write `bytes` and register it.
    pub fn find_or_write(&mut self, arena: &mut Arena, bytes: &[u8]) -> Result<usize, TableError> {
        let hash = xxh64(bytes, 0);

        if let Some(bucket) = self.index.get(&hash) {
            let hit = bucket
                .iter()
                .map(|&pos| pos as usize)
                .find(|&pos| arena.bytes_at(pos, bytes.len()) == Some(bytes));
            if let Some(pos) = hit {
                self.stats.reused += 1;
                tracing::trace!(pos, size = bytes.len(), "vtable reused");
                return Ok(pos);
            }
        }

        arena.prep(SIZE_VOFFSET, bytes.len())?;
        let pos = arena.push_bytes(bytes)?;
        self.stats.written += 1;
        tracing::trace!(pos, size = bytes.len(), "vtable written");

        let pos32 = pos as u32;
        match self.index.get_mut(&hash) {
            Some(bucket) => {
                if bucket.is_full() {
                    bucket.remove(0);
                }
                bucket.push(pos32);
            }
            None => {
                let mut bucket = Bucket::new();
                bucket.push(pos32);
                self.index.put(hash, bucket);
            }
        }
        Ok(pos)
    }
}

// ─── VTable (read side) ─────────────────────────────────────────────────────

/// Zero-copy view over a vtable inside a finished buffer.
/// The header is validated once; entry lookups never leave the vtable.
#[derive(Debug, Clone, Copy)]
pub struct VTable<'a> {
    buf: &'a [u8],
    loc: usize,
    num_bytes: usize,
}

impl<'a> VTable<'a> {
    pub fn init(buf: &'a [u8], loc: usize) -> Result<Self, TableError> {
        loc.checked_add(VTABLE_HEADER_SIZE)
            .filter(|&end| end <= buf.len())
            .ok_or(TableError::TruncatedBuffer {
                offset: loc,
                len: buf.len(),
            })?;
        let num_bytes = u16::read_le(&buf[loc..loc + 2]) as usize;
        if num_bytes < VTABLE_HEADER_SIZE || num_bytes % SIZE_VOFFSET != 0 {
            return Err(TableError::InvalidVTable { offset: loc });
        }
        if loc + num_bytes > buf.len() {
            return Err(TableError::TruncatedBuffer {
                offset: loc + num_bytes,
                len: buf.len(),
            });
        }
        Ok(Self {
            buf,
            loc,
            num_bytes,
        })
    }

    #[inline]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Total vtable size in bytes, header included.
    #[inline]
    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    /// Number of field entries the writer emitted.
    #[inline]
    pub fn num_fields(&self) -> usize {
        (self.num_bytes - VTABLE_HEADER_SIZE) / SIZE_VOFFSET
    }

    /// Inline size of the table this vtable describes.
    #[inline]
    pub fn object_inline_num_bytes(&self) -> usize {
        u16::read_le(&self.buf[self.loc + 2..self.loc + 4]) as usize
    }

    /// Slot offset for `slot`; `0` when absent or beyond the writer's schema.
    #[inline]
    pub fn get(&self, slot: usize) -> u16 {
        if slot >= self.num_fields() {
            return 0;
        }
        let pos = self.loc + slot_to_voffset(slot);
        u16::read_le(&self.buf[pos..pos + SIZE_VOFFSET])
    }

    /// Raw vtable bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.buf[self.loc..self.loc + self.num_bytes]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vtable_bytes(object_size: u16, entries: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&((VTABLE_HEADER_SIZE + entries.len() * 2) as u16).to_le_bytes());
        out.extend_from_slice(&object_size.to_le_bytes());
        for e in entries {
            out.extend_from_slice(&e.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_identical_vtables_are_written_once() {
        let mut arena = Arena::new(64, 1024);
        let mut registry = VTableRegistry::new(None);
        let vt = vtable_bytes(12, &[4, 0, 8]);

        let first = registry.find_or_write(&mut arena, &vt).unwrap();
        arena.push(0u32).unwrap();
        let second = registry.find_or_write(&mut arena, &vt).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.stats(), VTableStats { written: 1, reused: 1 });
    }

    #[test]
    fn test_different_presence_is_never_merged() {
        let mut arena = Arena::new(64, 1024);
        let mut registry = VTableRegistry::new(None);
        let a = registry.find_or_write(&mut arena, &vtable_bytes(12, &[4, 0, 8])).unwrap();
        let b = registry.find_or_write(&mut arena, &vtable_bytes(12, &[4, 8, 0])).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.stats().written, 2);
    }

    #[test]
    fn test_bounded_cache_evicts_but_stays_correct() {
        let mut arena = Arena::new(64, 1024);
        let mut registry = VTableRegistry::new(NonZeroUsize::new(1));
        let a = vtable_bytes(8, &[4]);
        let b = vtable_bytes(8, &[0]);

        registry.find_or_write(&mut arena, &a).unwrap();
        registry.find_or_write(&mut arena, &b).unwrap();
        // `a` was evicted, so it is written again rather than reused.
        registry.find_or_write(&mut arena, &a).unwrap();
        assert_eq!(registry.stats(), VTableStats { written: 3, reused: 0 });
    }

    #[test]
    fn test_candidate_outside_the_arena_is_skipped() {
        let mut arena = Arena::new(64, 1024);
        let mut registry = VTableRegistry::new(None);
        let vt = vtable_bytes(8, &[4, 0]);
        registry.find_or_write(&mut arena, &vt).unwrap();

        // The remembered position now lies past the used region.
        arena.reset();
        let pos = registry.find_or_write(&mut arena, &vt).unwrap();
        assert_eq!(pos, vt.len());
        assert_eq!(registry.stats(), VTableStats { written: 2, reused: 0 });
    }

    #[test]
    fn test_view_reads_header_and_entries() {
        let bytes = vtable_bytes(10, &[4, 0, 6]);
        let vt = VTable::init(&bytes, 0).unwrap();
        assert_eq!(vt.num_bytes(), 10);
        assert_eq!(vt.num_fields(), 3);
        assert_eq!(vt.object_inline_num_bytes(), 10);
        assert_eq!(vt.get(0), 4);
        assert_eq!(vt.get(1), 0);
        assert_eq!(vt.get(2), 6);
        // Fields added to the schema after this buffer was written read as absent.
        assert_eq!(vt.get(7), 0);
    }

    #[test]
    fn test_view_rejects_malformed_headers() {
        let odd = [5u8, 0, 4, 0, 0];
        assert_eq!(VTable::init(&odd, 0).unwrap_err(), TableError::InvalidVTable { offset: 0 });

        let too_small = [2u8, 0, 4, 0];
        assert_eq!(
            VTable::init(&too_small, 0).unwrap_err(),
            TableError::InvalidVTable { offset: 0 }
        );

        let truncated = vtable_bytes(8, &[4, 4]);
        assert!(matches!(
            VTable::init(&truncated[..6], 0),
            Err(TableError::TruncatedBuffer { .. })
        ));
        assert!(matches!(VTable::init(&truncated, 6), Err(TableError::TruncatedBuffer { .. })));
    }
}
