use arrayvec::ArrayVec;
use rustc_hash::FxHashMap;

use crate::arena::Arena;
use crate::config::BuilderConfig;
use crate::error::TableError;
use crate::types::*;
use crate::vtable::VTableRegistry;

/// Where a field slot ended up, recorded while its object is open.
#[derive(Debug, Clone, Copy)]
pub(super) struct FieldLoc {
    pub slot: u16,
    /// Used-position of the slot's first byte.
    pub pos: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BuildState {
    Idle,
    Object {
        field_count: usize,
        /// Used size where the object's first slot begins.
        start: usize,
    },
    Vector {
        len: usize,
        pushed: usize,
        /// Element width fixed by `start_vector`.
        width: usize,
    },
    Sealed,
}

/// Single-writer builder for one buffer.
///
/// Children (vectors, strings, nested tables) are built first and referenced
/// by the [`Offset`] they return; the parent is built afterwards and
/// [`finish`](Builder::finish) seals the buffer. Reuse the allocation with
/// [`reset`](Builder::reset).
pub struct Builder {
    pub(super) arena: Arena,
    pub(super) vtables: VTableRegistry,
    pub(super) config: BuilderConfig,
    pub(super) state: BuildState,
    pub(super) field_locs: ArrayVec<FieldLoc, MAX_FIELDS>,
    pub(super) shared_strings: FxHashMap<Box<str>, u32>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_config(BuilderConfig {
            initial_capacity,
            ..Default::default()
        })
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            arena: Arena::new(config.initial_capacity, config.arena_limit()),
            vtables: VTableRegistry::new(config.vtable_cache_capacity),
            config,
            state: BuildState::Idle,
            field_locs: ArrayVec::new(),
            shared_strings: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Bytes written so far.
    #[inline]
    pub fn used(&self) -> usize {
        self.arena.used()
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.state == BuildState::Sealed
    }

    #[inline]
    pub fn vtable_stats(&self) -> VTableStats {
        self.vtables.stats()
    }

    // ════════════════════════════════════════════════════════════════════════
    // State checks
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub(super) fn ensure_writable(&self) -> Result<(), TableError> {
        if self.state == BuildState::Sealed {
            return Err(TableError::SealedBuffer);
        }
        Ok(())
    }

    /// Writes outside of any object or vector (new vectors, strings, root).
    pub(super) fn ensure_idle(&self) -> Result<(), TableError> {
        match self.state {
            BuildState::Idle => Ok(()),
            BuildState::Sealed => Err(TableError::SealedBuffer),
            BuildState::Object { .. } => Err(TableError::UnbalancedObject(
                "an object is still open",
            )),
            BuildState::Vector { .. } => Err(TableError::UnbalancedObject(
                "a vector is still open",
            )),
        }
    }

    /// Reject handles that point past the bytes written in this session.
    pub(super) fn check_offset<T: ?Sized>(&self, off: Offset<T>) -> Result<(), TableError> {
        let used = self.arena.used();
        if off.value() == 0 || off.value() as usize > used {
            return Err(TableError::ForeignOffset {
                offset: off.value(),
                used,
            });
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Finish
    // ════════════════════════════════════════════════════════════════════════

    /// Write the root offset and seal the buffer.
    pub fn finish<T: ?Sized>(&mut self, root: Offset<T>) -> Result<(), TableError> {
        self.finish_with(root, false)
    }

    /// Like [`finish`](Builder::finish), prefixed by the `u32` byte length of
    /// the rest of the buffer.
    pub fn finish_size_prefixed<T: ?Sized>(&mut self, root: Offset<T>) -> Result<(), TableError> {
        self.finish_with(root, true)
    }

    fn finish_with<T: ?Sized>(&mut self, root: Offset<T>, size_prefixed: bool) -> Result<(), TableError> {
        self.ensure_idle()?;
        self.check_offset(root)?;

        let trailer = if size_prefixed {
            SIZE_UOFFSET + SIZE_PREFIX
        } else {
            SIZE_UOFFSET
        };
        let align = self.arena.min_align().max(SIZE_UOFFSET);
        self.arena.prep(align, trailer)?;
        self.push_uoffset(root.value())?;
        if size_prefixed {
            let size = self.arena.used() as u32;
            self.arena.push(size)?;
        }
        self.state = BuildState::Sealed;

        let stats = self.vtables.stats();
        tracing::debug!(
            bytes = self.arena.used(),
            vtables_written = stats.written,
            vtables_reused = stats.reused,
            size_prefixed,
            "buffer finished"
        );
        Ok(())
    }

    /// Write a forward offset to `target` at the (already aligned) head.
    pub(super) fn push_uoffset(&mut self, target: u32) -> Result<usize, TableError> {
        debug_assert_eq!(self.arena.used() % SIZE_UOFFSET, 0);
        let rel = (self.arena.used() + SIZE_UOFFSET) as u32 - target;
        self.arena.push(rel)
    }

    /// The sealed bytes.
    pub fn finished_data(&self) -> Result<&[u8], TableError> {
        if !self.is_sealed() {
            return Err(TableError::NotFinished);
        }
        Ok(self.arena.finished())
    }

    /// Consume the builder and take the sealed bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>, TableError> {
        if !self.is_sealed() {
            return Err(TableError::NotFinished);
        }
        Ok(self.arena.into_finished())
    }

    /// Start a new build session in the same allocation.
    pub fn reset(&mut self) {
        self.arena.reset();
        self.vtables.clear();
        self.field_locs.clear();
        self.shared_strings.clear();
        self.state = BuildState::Idle;
    }
}
