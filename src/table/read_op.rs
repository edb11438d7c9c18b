use super::record::{FromTable, Table, follow_uoffset, read_scalar};
use super::vector::Vector;
use crate::error::TableError;
use crate::types::*;

impl<'a> Table<'a> {
    // ════════════════════════════════════════════════════════════════════════
    // Inline scalars
    // ════════════════════════════════════════════════════════════════════════

    /// Read an inline scalar. `Ok(None)` when the field is absent; the caller
    /// applies the schema default.
    #[inline]
    pub fn get<T: Scalar>(&self, slot: usize) -> Result<Option<T>, TableError> {
        match self.field_offset(slot) {
            0 => Ok(None),
            vo => read_scalar(self.buf, self.loc + vo as usize).map(Some),
        }
    }

    /// Read an inline scalar, substituting `default` when absent.
    #[inline]
    pub fn get_or<T: Scalar>(&self, slot: usize, default: T) -> Result<T, TableError> {
        Ok(self.get(slot)?.unwrap_or(default))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Offset fields
    // ════════════════════════════════════════════════════════════════════════

    /// Absolute position referenced by the offset in field `slot`.
    #[inline]
    pub fn indirect(&self, slot: usize) -> Result<Option<usize>, TableError> {
        match self.field_offset(slot) {
            0 => Ok(None),
            vo => follow_uoffset(self.buf, self.loc + vo as usize).map(Some),
        }
    }

    /// Lazy view over the vector in field `slot`.
    pub fn get_vector<T: Scalar>(&self, slot: usize) -> Result<Option<Vector<'a, T>>, TableError> {
        match self.indirect(slot)? {
            Some(loc) => Vector::new(self.buf, loc).map(Some),
            None => Ok(None),
        }
    }

    /// Nested table in field `slot`.
    pub fn get_table<T: FromTable<'a>>(&self, slot: usize) -> Result<Option<T>, TableError> {
        match self.indirect(slot)? {
            Some(loc) => Table::new(self.buf, loc).map(|t| Some(T::from_table(t))),
            None => Ok(None),
        }
    }

    /// String in field `slot`, borrowed from the buffer.
    pub fn get_str(&self, slot: usize) -> Result<Option<&'a str>, TableError> {
        let Some(loc) = self.indirect(slot)? else {
            return Ok(None);
        };
        let bytes = Vector::<u8>::new(self.buf, loc)?.bytes();
        std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|_| TableError::InvalidUtf8 { offset: loc })
    }
}
