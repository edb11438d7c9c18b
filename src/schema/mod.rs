//! Accessors for the replay tables built on the table format.
//!
//! Fields are addressed by index on the wire; the names here only exist in
//! Rust.

/// Accessor set for a vector-typed field: the lazy view, its length (0 when
/// absent), a bounds-checked element read and the raw element bytes.
macro_rules! vector_field {
    (
        $(#[$meta:meta])*
        $field:ident, $len:ident, $at:ident, $bytes:ident: [$ty:ty] = $slot:expr
    ) => {
        $(#[$meta])*
        #[inline]
        pub fn $field(&self) -> Result<Option<Vector<'a, $ty>>, TableError> {
            self.table.get_vector::<$ty>($slot)
        }

        #[inline]
        pub fn $len(&self) -> Result<usize, TableError> {
            Ok(self.$field()?.map_or(0, |v| v.len()))
        }

        #[inline]
        pub fn $at(&self, j: usize) -> Result<$ty, TableError> {
            match self.$field()? {
                Some(v) => v.get(j),
                None => Err(TableError::IndexOutOfRange { index: j, len: 0 }),
            }
        }

        #[inline]
        pub fn $bytes(&self) -> Result<Option<&'a [u8]>, TableError> {
            Ok(self.$field()?.map(|v| v.bytes()))
        }
    };
}

pub mod spawned_body;
pub mod vec_table;

pub use spawned_body::{
    SpawnedBodyTable, SpawnedBodyTableArgs, SpawnedBodyTableBuilder, SpawnedBodyTableT,
    root_as_spawned_body_table, size_prefixed_root_as_spawned_body_table,
};
pub use vec_table::{VecTable, VecTableArgs, VecTableBuilder, VecTableT};
