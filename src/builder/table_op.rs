use arrayvec::ArrayVec;

use super::session::{BuildState, Builder, FieldLoc};
use crate::error::TableError;
use crate::types::*;

impl Builder {
    // ════════════════════════════════════════════════════════════════════════
    // Object lifecycle
    // ════════════════════════════════════════════════════════════════════════

    /// Open an object with room for `field_count` fields.
    pub fn start_object(&mut self, field_count: usize) -> Result<(), TableError> {
        self.ensure_idle()?;
        if field_count > MAX_FIELDS {
            return Err(TableError::TooManyFields {
                requested: field_count,
                max: MAX_FIELDS,
            });
        }
        self.field_locs.clear();
        self.state = BuildState::Object {
            field_count,
            start: self.arena.used(),
        };
        Ok(())
    }

    /// Close the open object: write its vtable delta, emit or reuse a vtable,
    /// and return the object's offset.
    pub fn end_object(&mut self) -> Result<Offset<TableFinished>, TableError> {
        let (field_count, start) = match self.state {
            BuildState::Object { field_count, start } => (field_count, start),
            BuildState::Sealed => return Err(TableError::SealedBuffer),
            BuildState::Vector { .. } => {
                return Err(TableError::UnbalancedObject("end_object called inside a vector"));
            }
            BuildState::Idle => {
                return Err(TableError::UnbalancedObject(
                    "end_object called without a matching start_object",
                ));
            }
        };

        // Placeholder for the vtable delta, patched once the vtable is placed.
        self.arena.prep(SIZE_SOFFSET, 0)?;
        let object_pos = self.arena.push(0i32)?;

        let object_size = if self.field_locs.is_empty() {
            SIZE_SOFFSET
        } else {
            object_pos - start
        };
        if object_size > u16::MAX as usize {
            return Err(TableError::ObjectTooLarge { size: object_size });
        }

        let vtable_len = slot_to_voffset(field_count);
        let mut vtable: ArrayVec<u8, MAX_VTABLE_SIZE> = ArrayVec::new();
        vtable.extend(std::iter::repeat_n(0u8, vtable_len));
        vtable[0..2].copy_from_slice(&(vtable_len as u16).to_le_bytes());
        vtable[2..4].copy_from_slice(&(object_size as u16).to_le_bytes());
        for loc in &self.field_locs {
            let voffset = (object_pos - loc.pos as usize) as u16;
            let at = slot_to_voffset(loc.slot as usize);
            vtable[at..at + SIZE_VOFFSET].copy_from_slice(&voffset.to_le_bytes());
        }

        let vtable_pos = self.vtables.find_or_write(&mut self.arena, &vtable)?;
        let delta = vtable_pos as i64 - object_pos as i64;
        self.arena.write_at(object_pos, delta as i32);

        self.field_locs.clear();
        self.state = BuildState::Idle;
        Ok(Offset::new(object_pos as u32))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Field writes
    // ════════════════════════════════════════════════════════════════════════

    fn check_slot(&self, slot: usize) -> Result<(), TableError> {
        match self.state {
            BuildState::Object { field_count, .. } if slot < field_count => Ok(()),
            BuildState::Object { field_count, .. } => {
                Err(TableError::FieldIndexOutOfRange { slot, field_count })
            }
            BuildState::Sealed => Err(TableError::SealedBuffer),
            _ => Err(TableError::NoActiveObject),
        }
    }

    /// Align for a `width`-byte slot. The object's extent starts at its first
    /// aligned slot, so padding before it never changes the vtable.
    fn prep_slot(&mut self, width: usize) -> Result<(), TableError> {
        self.arena.prep(width, 0)?;
        if self.field_locs.is_empty() {
            if let BuildState::Object { start, .. } = &mut self.state {
                *start = self.arena.used();
            }
        }
        Ok(())
    }

    /// Record where `slot` was written. A rewrite of the same slot replaces
    /// the earlier location, so at most `field_count` entries are kept.
    #[inline]
    fn track_field(&mut self, slot: usize, pos: usize) -> Result<(), TableError> {
        let loc = FieldLoc {
            slot: slot as u16,
            pos: pos as u32,
        };
        if let Some(existing) = self.field_locs.iter_mut().find(|l| l.slot == loc.slot) {
            *existing = loc;
            return Ok(());
        }
        self.field_locs
            .try_push(loc)
            .map_err(|_| TableError::TooManyFields {
                requested: self.field_locs.len() + 1,
                max: MAX_FIELDS,
            })
    }

    /// Write an inline scalar unless it equals the schema `default`
    /// (see [`BuilderConfig::force_defaults`](crate::BuilderConfig)).
    pub fn push_slot<T: Scalar>(&mut self, slot: usize, value: T, default: T) -> Result<(), TableError> {
        self.check_slot(slot)?;
        if value == default && !self.config.force_defaults {
            return Ok(());
        }
        self.push_slot_always(slot, value)
    }

    /// Write an inline scalar regardless of its value.
    pub fn push_slot_always<T: Scalar>(&mut self, slot: usize, value: T) -> Result<(), TableError> {
        self.check_slot(slot)?;
        self.prep_slot(T::WIDTH)?;
        let pos = self.arena.push(value)?;
        self.track_field(slot, pos)
    }

    /// Write a forward offset to a finished child.
    pub fn push_offset<T: ?Sized>(&mut self, slot: usize, child: Offset<T>) -> Result<(), TableError> {
        self.check_slot(slot)?;
        self.check_offset(child)?;
        self.prep_slot(SIZE_UOFFSET)?;
        let pos = self.push_uoffset(child.value())?;
        self.track_field(slot, pos)
    }
}
