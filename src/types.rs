use std::fmt;
use std::marker::PhantomData;

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ Root (4 bytes, position 0)                   │
//  │   root_offset: u32 (LE)  → absolute position │
//  ├──────────────────────────────────────────────┤
//  │ VTable (4 + 2 × field_count bytes)           │
//  │   vtable_size: u16 (LE)                      │
//  │   object_size: u16 (LE)                      │
//  │   slot_offset: u16 (LE) × field_count        │
//  │                ← 0 means "absent"            │
//  ├──────────────────────────────────────────────┤
//  │ Table                                        │
//  │   vtable_delta: i32 (LE)                     │
//  │                ← object_start − vtable_start │
//  │   slots: inline scalars or u32 offsets       │
//  │                ← target = slot_pos + value   │
//  ├──────────────────────────────────────────────┤
//  │ Vector                                       │
//  │   count:    u32 (LE)                         │
//  │   elements: width × count                    │
//  └──────────────────────────────────────────────┘
//
//  Buffers are written back to front, so children always sit at higher
//  addresses than the slots that reference them. Vtables may sit on either
//  side of their table once deduplicated.

pub const SIZE_UOFFSET: usize = 4;
pub const SIZE_SOFFSET: usize = 4;
pub const SIZE_VOFFSET: usize = 2;
pub const SIZE_PREFIX: usize = 4;
pub const VTABLE_HEADER_SIZE: usize = 4; // vtable_size + object_size

/// Upper bound on declared fields per object.
pub const MAX_FIELDS: usize = 64;
pub const MAX_VTABLE_SIZE: usize = VTABLE_HEADER_SIZE + MAX_FIELDS * SIZE_VOFFSET;

/// Offsets are 32-bit; a buffer may never grow past what an `i32` delta can span.
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Byte position of a field's entry inside its vtable.
#[inline]
pub const fn slot_to_voffset(slot: usize) -> usize {
    VTABLE_HEADER_SIZE + slot * SIZE_VOFFSET
}

// ─── Scalar Trait ───────────────────────────────────────────────────────────

/// Fixed-width little-endian value that can live inline in a table slot or as
/// a vector element.
pub trait Scalar: Copy + PartialEq + fmt::Debug {
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode into the first `WIDTH` bytes of `dst`.
    fn write_le(self, dst: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::WIDTH]);
                <$ty>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le(self, dst: &mut [u8]) {
                dst[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

impl_scalar!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl Scalar for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write_le(self, dst: &mut [u8]) {
        dst[0] = self as u8;
    }
}

// ─── Offset (typed, opaque) ─────────────────────────────────────────────────

/// Handle to a finished child structure inside a [`Builder`](crate::Builder).
///
/// The value is the child's distance from the end of the arena, which stays
/// valid while the arena grows downward. Handles are only minted by completed
/// builds (`end_object`, `end_vector`, `create_string`), so a parent can never
/// reference a child that has not been written yet.
pub struct Offset<T: ?Sized> {
    value: u32,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> Offset<T> {
    #[inline]
    pub(crate) fn new(value: u32) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Distance from the end of the arena to the start of the child.
    #[inline]
    pub fn value(self) -> u32 {
        self.value
    }

    /// Absolute position of the child inside a finished buffer of `buf_len`
    /// bytes (without size prefix).
    #[inline]
    pub fn position_in(self, buf_len: usize) -> usize {
        buf_len - self.value as usize
    }
}

/// Untyped finished-table marker returned by `Builder::end_object`.
#[derive(Debug)]
pub enum TableFinished {}

impl Offset<TableFinished> {
    /// Tag a finished table with its schema type.
    #[inline]
    pub fn cast<U: ?Sized>(self) -> Offset<U> {
        Offset::new(self.value)
    }
}

impl<T: ?Sized> Clone for Offset<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Offset<T> {}

impl<T: ?Sized> PartialEq for Offset<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized> Eq for Offset<T> {}

impl<T: ?Sized> fmt::Debug for Offset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({})", self.value)
    }
}

// ─── VTable Stats ───────────────────────────────────────────────────────────

/// Counters kept by the vtable registry for one build session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VTableStats {
    pub written: usize,
    pub reused: usize,
}
