use serde::{Deserialize, Serialize};

use crate::builder::Builder;
use crate::error::TableError;
use crate::table::{FromTable, Table, Vector};
use crate::types::Offset;

/// A list of map locations, stored as parallel coordinate vectors.
#[derive(Debug, Clone, Copy)]
pub struct VecTable<'a> {
    table: Table<'a>,
}

impl<'a> FromTable<'a> for VecTable<'a> {
    #[inline]
    fn from_table(table: Table<'a>) -> Self {
        Self { table }
    }
}

impl<'a> VecTable<'a> {
    pub const FIELD_XS: usize = 0;
    pub const FIELD_YS: usize = 1;
    pub const FIELD_COUNT: usize = 2;

    #[inline]
    pub fn table(&self) -> Table<'a> {
        self.table
    }

    vector_field!(
        /// X coordinates.
        xs, xs_len, xs_at, xs_bytes: [i32] = Self::FIELD_XS
    );

    vector_field!(
        /// Y coordinates, parallel to `xs`.
        ys, ys_len, ys_at, ys_bytes: [i32] = Self::FIELD_YS
    );

    pub fn create_xs_vector(builder: &mut Builder, data: &[i32]) -> Result<Offset<[i32]>, TableError> {
        builder.create_vector(data)
    }

    pub fn create_ys_vector(builder: &mut Builder, data: &[i32]) -> Result<Offset<[i32]>, TableError> {
        builder.create_vector(data)
    }

    #[inline]
    pub fn start_xs_vector(builder: &mut Builder, len: usize) -> Result<(), TableError> {
        builder.start_vector::<i32>(len)
    }

    #[inline]
    pub fn start_ys_vector(builder: &mut Builder, len: usize) -> Result<(), TableError> {
        builder.start_vector::<i32>(len)
    }

    /// Build a table from already-written children.
    pub fn create(
        builder: &mut Builder,
        args: &VecTableArgs,
    ) -> Result<Offset<VecTable<'static>>, TableError> {
        let mut b = VecTableBuilder::start(builder)?;
        if let Some(ys) = args.ys {
            b.add_ys(ys)?;
        }
        if let Some(xs) = args.xs {
            b.add_xs(xs)?;
        }
        b.finish()
    }

    pub fn unpack(&self) -> Result<VecTableT, TableError> {
        Ok(VecTableT {
            xs: self.xs()?.map(|v| v.to_vec()),
            ys: self.ys()?.map(|v| v.to_vec()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VecTableArgs {
    pub xs: Option<Offset<[i32]>>,
    pub ys: Option<Offset<[i32]>>,
}

/// Field-by-field writer. Add fields in descending index order.
pub struct VecTableBuilder<'b> {
    builder: &'b mut Builder,
}

impl<'b> VecTableBuilder<'b> {
    pub fn start(builder: &'b mut Builder) -> Result<Self, TableError> {
        builder.start_object(VecTable::FIELD_COUNT)?;
        Ok(Self { builder })
    }

    #[inline]
    pub fn add_xs(&mut self, xs: Offset<[i32]>) -> Result<(), TableError> {
        self.builder.push_offset(VecTable::FIELD_XS, xs)
    }

    #[inline]
    pub fn add_ys(&mut self, ys: Offset<[i32]>) -> Result<(), TableError> {
        self.builder.push_offset(VecTable::FIELD_YS, ys)
    }

    pub fn finish(self) -> Result<Offset<VecTable<'static>>, TableError> {
        Ok(self.builder.end_object()?.cast())
    }
}

// ─── Owned form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VecTableT {
    pub xs: Option<Vec<i32>>,
    pub ys: Option<Vec<i32>>,
}

impl VecTableT {
    pub fn pack(&self, builder: &mut Builder) -> Result<Offset<VecTable<'static>>, TableError> {
        let xs = self.xs.as_deref().map(|v| builder.create_vector(v)).transpose()?;
        let ys = self.ys.as_deref().map(|v| builder.create_vector(v)).transpose()?;
        VecTable::create(builder, &VecTableArgs { xs, ys })
    }
}
