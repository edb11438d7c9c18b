use crate::error::TableError;
use crate::types::*;
use crate::vtable::VTable;

// ─── Reader (zero-copy) ────────────────────────────────────────────────────

/// Zero-copy view of one table inside a finished buffer.
/// No parsing happens until you request a specific field.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    pub(crate) buf: &'a [u8],
    pub(crate) loc: usize,
    pub(crate) vtable: VTable<'a>,
}

/// Typed wrapper over a [`Table`], implemented by schema accessors.
pub trait FromTable<'a>: Sized {
    fn from_table(table: Table<'a>) -> Self;
}

impl<'a> FromTable<'a> for Table<'a> {
    #[inline]
    fn from_table(table: Table<'a>) -> Self {
        table
    }
}

/// Read a little-endian scalar at `pos`, bounds-checked.
#[inline]
pub(crate) fn read_scalar<T: Scalar>(buf: &[u8], pos: usize) -> Result<T, TableError> {
    pos.checked_add(T::WIDTH)
        .and_then(|end| buf.get(pos..end))
        .map(T::read_le)
        .ok_or(TableError::TruncatedBuffer {
            offset: pos,
            len: buf.len(),
        })
}

/// Follow the forward offset stored at `pos`.
#[inline]
pub(crate) fn follow_uoffset(buf: &[u8], pos: usize) -> Result<usize, TableError> {
    let rel = read_scalar::<u32>(buf, pos)? as usize;
    match pos.checked_add(rel) {
        Some(target) if target < buf.len() => Ok(target),
        _ => Err(TableError::TruncatedBuffer {
            offset: pos.saturating_add(rel),
            len: buf.len(),
        }),
    }
}

impl<'a> Table<'a> {
    /// Open the table at absolute position `loc`, resolving its vtable.
    pub fn new(buf: &'a [u8], loc: usize) -> Result<Self, TableError> {
        let delta = read_scalar::<i32>(buf, loc)? as i64;
        let vtable_loc = loc as i64 - delta;
        if vtable_loc < 0 || vtable_loc as usize >= buf.len() {
            return Err(TableError::TruncatedBuffer {
                offset: vtable_loc.max(0) as usize,
                len: buf.len(),
            });
        }
        let vtable = VTable::init(buf, vtable_loc as usize)?;
        Ok(Self { buf, loc, vtable })
    }

    /// Open the root table of a finished buffer.
    pub fn root(buf: &'a [u8]) -> Result<Self, TableError> {
        let loc = follow_uoffset(buf, 0)?;
        Self::new(buf, loc)
    }

    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    /// Absolute position of the table (its vtable delta).
    #[inline]
    pub fn loc(&self) -> usize {
        self.loc
    }

    #[inline]
    pub fn vtable(&self) -> VTable<'a> {
        self.vtable
    }

    /// Slot offset of field `slot` relative to the table start; `0` if absent.
    #[inline]
    pub fn field_offset(&self, slot: usize) -> u16 {
        self.vtable.get(slot)
    }

    #[inline]
    pub fn has_field(&self, slot: usize) -> bool {
        self.field_offset(slot) != 0
    }
}

/// Open the root of `buf` as `T`.
pub fn root<'a, T: FromTable<'a>>(buf: &'a [u8]) -> Result<T, TableError> {
    Table::root(buf).map(T::from_table)
}

/// Open the root of a buffer written by `finish_size_prefixed`.
pub fn size_prefixed_root<'a, T: FromTable<'a>>(buf: &'a [u8]) -> Result<T, TableError> {
    let size = read_scalar::<u32>(buf, 0)? as usize;
    let end = SIZE_PREFIX + size;
    let inner = buf.get(SIZE_PREFIX..end).ok_or(TableError::TruncatedBuffer {
        offset: end,
        len: buf.len(),
    })?;
    root(inner)
}
