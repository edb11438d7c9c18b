mod session;
mod table_op;
mod vector_op;

pub use session::Builder;
