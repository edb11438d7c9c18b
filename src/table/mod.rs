mod read_op;
pub mod record;
pub mod vector;

pub use record::{FromTable, Table, root, size_prefixed_root};
pub use vector::{Vector, VectorIter};

#[cfg(test)]
mod tests;
