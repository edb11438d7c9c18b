//! Zero-copy, vtable-indexed binary tables.
//!
//! A [`Builder`] packs tables, vectors and strings into one little-endian
//! buffer, back to front, deduplicating identical vtables. A [`Table`] reads
//! fields straight out of the finished bytes: every field is reached through
//! its vtable entry, absent fields read as `None`, and vectors are lazy views.
//!
//! ```
//! use replay_table::schema::{SpawnedBodyTable, SpawnedBodyTableArgs, root_as_spawned_body_table};
//! use replay_table::Builder;
//!
//! let mut builder = Builder::new();
//! let ids = builder.create_vector(&[1i32, 2, 3])?;
//! let root = SpawnedBodyTable::create(
//!     &mut builder,
//!     &SpawnedBodyTableArgs { robot_ids: Some(ids), ..Default::default() },
//! )?;
//! builder.finish(root)?;
//!
//! let table = root_as_spawned_body_table(builder.finished_data()?)?;
//! assert_eq!(table.robot_ids_at(1)?, 2);
//! assert!(table.locs()?.is_none());
//! # Ok::<(), replay_table::TableError>(())
//! ```

pub mod arena;
pub mod builder;
pub mod config;
pub mod error;
pub mod schema;
pub mod table;
pub mod types;
pub mod vtable;

pub use builder::Builder;
pub use config::BuilderConfig;
pub use error::TableError;
pub use table::{FromTable, Table, Vector, root, size_prefixed_root};
pub use types::{Offset, Scalar, TableFinished, VTableStats};
