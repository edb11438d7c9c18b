use super::session::{BuildState, Builder};
use crate::error::TableError;
use crate::types::*;

impl Builder {
    // ════════════════════════════════════════════════════════════════════════
    // Vectors: manual protocol
    // ════════════════════════════════════════════════════════════════════════

    /// Open a vector of `len` elements of `T`. Elements are pushed in reverse
    /// index order with [`push_element`](Builder::push_element).
    pub fn start_vector<T: Scalar>(&mut self, len: usize) -> Result<(), TableError> {
        self.ensure_idle()?;
        let body = T::WIDTH * len;
        self.arena.prep(SIZE_UOFFSET, body)?;
        self.arena.prep(T::WIDTH, body)?;
        self.state = BuildState::Vector {
            len,
            pushed: 0,
            width: T::WIDTH,
        };
        Ok(())
    }

    pub fn push_element<T: Scalar>(&mut self, value: T) -> Result<(), TableError> {
        match &mut self.state {
            BuildState::Vector { width, .. } if *width != T::WIDTH => {
                return Err(TableError::UnbalancedObject("element width differs from the open vector"));
            }
            BuildState::Vector { len, pushed, .. } if *pushed < *len => *pushed += 1,
            BuildState::Vector { .. } => {
                return Err(TableError::UnbalancedObject("more elements pushed than declared"));
            }
            BuildState::Sealed => return Err(TableError::SealedBuffer),
            _ => return Err(TableError::UnbalancedObject("no vector is open")),
        }
        self.arena.push(value)?;
        Ok(())
    }

    /// Close the open vector by writing its element count.
    pub fn end_vector<T: Scalar>(&mut self) -> Result<Offset<[T]>, TableError> {
        let len = match self.state {
            BuildState::Vector { width, .. } if width != T::WIDTH => {
                return Err(TableError::UnbalancedObject("element width differs from the open vector"));
            }
            BuildState::Vector { len, pushed, .. } if len == pushed => len,
            BuildState::Vector { .. } => {
                return Err(TableError::UnbalancedObject("fewer elements pushed than declared"));
            }
            BuildState::Sealed => return Err(TableError::SealedBuffer),
            _ => return Err(TableError::UnbalancedObject("no vector is open")),
        };
        let pos = self.arena.push(len as u32)?;
        self.state = BuildState::Idle;
        Ok(Offset::new(pos as u32))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Vectors: one shot
    // ════════════════════════════════════════════════════════════════════════

    /// Write `values` as a length-prefixed vector, element 0 first in memory.
    pub fn create_vector<T: Scalar>(&mut self, values: &[T]) -> Result<Offset<[T]>, TableError> {
        self.start_vector::<T>(values.len())?;
        let body = T::WIDTH * values.len();
        let end = self.arena.make_space(body)?;
        for (i, value) in values.iter().enumerate() {
            self.arena.write_at(end - i * T::WIDTH, *value);
        }
        self.state = BuildState::Vector {
            len: values.len(),
            pushed: values.len(),
            width: T::WIDTH,
        };
        self.end_vector::<T>()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Strings
    // ════════════════════════════════════════════════════════════════════════

    /// Write a UTF-8 string: a byte vector followed by a NUL that is not
    /// counted in its length.
    pub fn create_string(&mut self, s: &str) -> Result<Offset<str>, TableError> {
        self.ensure_idle()?;
        let bytes = s.as_bytes();
        self.arena.prep(SIZE_UOFFSET, bytes.len() + 1)?;
        self.arena.push(0u8)?;
        self.arena.push_bytes(bytes)?;
        let pos = self.arena.push(bytes.len() as u32)?;
        Ok(Offset::new(pos as u32))
    }

    /// Like [`create_string`](Builder::create_string), but identical strings
    /// written in the same session share one copy.
    pub fn create_shared_string(&mut self, s: &str) -> Result<Offset<str>, TableError> {
        self.ensure_writable()?;
        if let Some(&pos) = self.shared_strings.get(s) {
            return Ok(Offset::new(pos));
        }
        let off = self.create_string(s)?;
        self.shared_strings.insert(s.into(), off.value());
        Ok(off)
    }
}
