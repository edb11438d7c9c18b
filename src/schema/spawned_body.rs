use serde::{Deserialize, Serialize};

use super::vec_table::{VecTable, VecTableT};
use crate::builder::Builder;
use crate::error::TableError;
use crate::table::{self, FromTable, Table, Vector};
use crate::types::Offset;

/// A list of new bodies to be placed on the map.
///
/// All vectors are parallel: entry `i` of every field describes body `i`.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedBodyTable<'a> {
    table: Table<'a>,
}

impl<'a> FromTable<'a> for SpawnedBodyTable<'a> {
    #[inline]
    fn from_table(table: Table<'a>) -> Self {
        Self { table }
    }
}

impl<'a> SpawnedBodyTable<'a> {
    pub const FIELD_ROBOT_IDS: usize = 0;
    pub const FIELD_TEAM_IDS: usize = 1;
    pub const FIELD_TYPES: usize = 2;
    pub const FIELD_LOCS: usize = 3;
    pub const FIELD_COST: usize = 4;
    pub const FIELD_COUNT: usize = 5;

    #[inline]
    pub fn table(&self) -> Table<'a> {
        self.table
    }

    vector_field!(
        /// Numeric IDs of the new bodies. Never negative, and unique among
        /// live bodies at any moment.
        robot_ids, robot_ids_len, robot_ids_at, robot_ids_bytes: [i32] = Self::FIELD_ROBOT_IDS
    );

    vector_field!(
        /// Team of each new body.
        team_ids, team_ids_len, team_ids_at, team_ids_bytes: [i8] = Self::FIELD_TEAM_IDS
    );

    vector_field!(
        /// Body type tag of each new body.
        types, types_len, types_at, types_bytes: [i8] = Self::FIELD_TYPES
    );

    vector_field!(
        /// Influence paid to create each body.
        cost, cost_len, cost_at, cost_bytes: [i32] = Self::FIELD_COST
    );

    /// Locations of the new bodies.
    #[inline]
    pub fn locs(&self) -> Result<Option<VecTable<'a>>, TableError> {
        self.table.get_table(Self::FIELD_LOCS)
    }

    pub fn create_robot_ids_vector(
        builder: &mut Builder,
        data: &[i32],
    ) -> Result<Offset<[i32]>, TableError> {
        builder.create_vector(data)
    }

    pub fn create_team_ids_vector(
        builder: &mut Builder,
        data: &[i8],
    ) -> Result<Offset<[i8]>, TableError> {
        builder.create_vector(data)
    }

    pub fn create_types_vector(builder: &mut Builder, data: &[i8]) -> Result<Offset<[i8]>, TableError> {
        builder.create_vector(data)
    }

    pub fn create_cost_vector(builder: &mut Builder, data: &[i32]) -> Result<Offset<[i32]>, TableError> {
        builder.create_vector(data)
    }

    /// Open a `robot_ids` vector of `len` elements for
    /// [`push_element`](Builder::push_element), last element first.
    #[inline]
    pub fn start_robot_ids_vector(builder: &mut Builder, len: usize) -> Result<(), TableError> {
        builder.start_vector::<i32>(len)
    }

    #[inline]
    pub fn start_team_ids_vector(builder: &mut Builder, len: usize) -> Result<(), TableError> {
        builder.start_vector::<i8>(len)
    }

    #[inline]
    pub fn start_types_vector(builder: &mut Builder, len: usize) -> Result<(), TableError> {
        builder.start_vector::<i8>(len)
    }

    #[inline]
    pub fn start_cost_vector(builder: &mut Builder, len: usize) -> Result<(), TableError> {
        builder.start_vector::<i32>(len)
    }

    /// Build a table from already-written children, highest field first.
    pub fn create(
        builder: &mut Builder,
        args: &SpawnedBodyTableArgs,
    ) -> Result<Offset<SpawnedBodyTable<'static>>, TableError> {
        let mut b = SpawnedBodyTableBuilder::start(builder)?;
        if let Some(cost) = args.cost {
            b.add_cost(cost)?;
        }
        if let Some(locs) = args.locs {
            b.add_locs(locs)?;
        }
        if let Some(types) = args.types {
            b.add_types(types)?;
        }
        if let Some(team_ids) = args.team_ids {
            b.add_team_ids(team_ids)?;
        }
        if let Some(robot_ids) = args.robot_ids {
            b.add_robot_ids(robot_ids)?;
        }
        b.finish()
    }

    /// Copy every field into an owned [`SpawnedBodyTableT`].
    pub fn unpack(&self) -> Result<SpawnedBodyTableT, TableError> {
        Ok(SpawnedBodyTableT {
            robot_ids: self.robot_ids()?.map(|v| v.to_vec()),
            team_ids: self.team_ids()?.map(|v| v.to_vec()),
            types: self.types()?.map(|v| v.to_vec()),
            locs: self.locs()?.map(|l| l.unpack()).transpose()?.map(Box::new),
            cost: self.cost()?.map(|v| v.to_vec()),
        })
    }
}

pub fn root_as_spawned_body_table(buf: &[u8]) -> Result<SpawnedBodyTable<'_>, TableError> {
    table::root(buf)
}

pub fn size_prefixed_root_as_spawned_body_table(
    buf: &[u8],
) -> Result<SpawnedBodyTable<'_>, TableError> {
    table::size_prefixed_root(buf)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnedBodyTableArgs {
    pub robot_ids: Option<Offset<[i32]>>,
    pub team_ids: Option<Offset<[i8]>>,
    pub types: Option<Offset<[i8]>>,
    pub locs: Option<Offset<VecTable<'static>>>,
    pub cost: Option<Offset<[i32]>>,
}

/// Field-by-field writer. Add fields in descending index order.
pub struct SpawnedBodyTableBuilder<'b> {
    builder: &'b mut Builder,
}

impl<'b> SpawnedBodyTableBuilder<'b> {
    pub fn start(builder: &'b mut Builder) -> Result<Self, TableError> {
        builder.start_object(SpawnedBodyTable::FIELD_COUNT)?;
        Ok(Self { builder })
    }

    #[inline]
    pub fn add_robot_ids(&mut self, robot_ids: Offset<[i32]>) -> Result<(), TableError> {
        self.builder.push_offset(SpawnedBodyTable::FIELD_ROBOT_IDS, robot_ids)
    }

    #[inline]
    pub fn add_team_ids(&mut self, team_ids: Offset<[i8]>) -> Result<(), TableError> {
        self.builder.push_offset(SpawnedBodyTable::FIELD_TEAM_IDS, team_ids)
    }

    #[inline]
    pub fn add_types(&mut self, types: Offset<[i8]>) -> Result<(), TableError> {
        self.builder.push_offset(SpawnedBodyTable::FIELD_TYPES, types)
    }

    #[inline]
    pub fn add_locs(&mut self, locs: Offset<VecTable<'static>>) -> Result<(), TableError> {
        self.builder.push_offset(SpawnedBodyTable::FIELD_LOCS, locs)
    }

    #[inline]
    pub fn add_cost(&mut self, cost: Offset<[i32]>) -> Result<(), TableError> {
        self.builder.push_offset(SpawnedBodyTable::FIELD_COST, cost)
    }

    pub fn finish(self) -> Result<Offset<SpawnedBodyTable<'static>>, TableError> {
        Ok(self.builder.end_object()?.cast())
    }
}

// ─── Owned form ─────────────────────────────────────────────────────────────

/// Owned copy of a [`SpawnedBodyTable`], for tooling that inspects or dumps
/// replays (e.g. as JSON through serde).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnedBodyTableT {
    pub robot_ids: Option<Vec<i32>>,
    pub team_ids: Option<Vec<i8>>,
    pub types: Option<Vec<i8>>,
    pub locs: Option<Box<VecTableT>>,
    pub cost: Option<Vec<i32>>,
}

impl SpawnedBodyTableT {
    /// Write children first, then the table itself.
    pub fn pack(
        &self,
        builder: &mut Builder,
    ) -> Result<Offset<SpawnedBodyTable<'static>>, TableError> {
        let robot_ids = self.robot_ids.as_deref().map(|v| builder.create_vector(v)).transpose()?;
        let team_ids = self.team_ids.as_deref().map(|v| builder.create_vector(v)).transpose()?;
        let types = self.types.as_deref().map(|v| builder.create_vector(v)).transpose()?;
        let locs = self.locs.as_ref().map(|l| l.pack(builder)).transpose()?;
        let cost = self.cost.as_deref().map(|v| builder.create_vector(v)).transpose()?;
        SpawnedBodyTable::create(
            builder,
            &SpawnedBodyTableArgs {
                robot_ids,
                team_ids,
                types,
                locs,
                cost,
            },
        )
    }
}
