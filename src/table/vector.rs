use std::marker::PhantomData;

use crate::error::TableError;
use crate::table::record::read_scalar;
use crate::types::*;

/// Lazy view over a length-prefixed vector of `T`.
///
/// The full extent is checked once on construction, so element reads are
/// O(1) and never touch bytes outside the vector.
#[derive(Debug, Clone, Copy)]
pub struct Vector<'a, T: Scalar> {
    buf: &'a [u8],
    /// Absolute position of the first element.
    start: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Scalar> Vector<'a, T> {
    /// Open the vector whose count prefix sits at `loc`.
    pub fn new(buf: &'a [u8], loc: usize) -> Result<Self, TableError> {
        let len = read_scalar::<u32>(buf, loc)? as usize;
        let start = loc + SIZE_UOFFSET;
        let fits = len
            .checked_mul(T::WIDTH)
            .and_then(|body| start.checked_add(body))
            .is_some_and(|end| end <= buf.len());
        if !fits {
            return Err(TableError::TruncatedBuffer {
                offset: start.saturating_add(len.saturating_mul(T::WIDTH)),
                len: buf.len(),
            });
        }
        Ok(Self {
            buf,
            start,
            len,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element `index`; `IndexOutOfRange` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T, TableError> {
        if index >= self.len {
            return Err(TableError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let pos = self.start + index * T::WIDTH;
        Ok(T::read_le(&self.buf[pos..pos + T::WIDTH]))
    }

    /// The raw little-endian element bytes.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        &self.buf[self.start..self.start + self.len * T::WIDTH]
    }

    #[inline]
    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter {
            vector: *self,
            pos: 0,
        }
    }

    /// Copy the elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

// ─── Iterator ───────────────────────────────────────────────────────────────

pub struct VectorIter<'a, T: Scalar> {
    vector: Vector<'a, T>,
    pos: usize,
}

impl<'a, T: Scalar> Iterator for VectorIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.vector.get(self.pos).ok()?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a, T: Scalar> ExactSizeIterator for VectorIter<'a, T> {}

impl<'a, T: Scalar> IntoIterator for Vector<'a, T> {
    type Item = T;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
