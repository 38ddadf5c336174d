//! Typed tabular results.
//!
//! Parsers produce rows of raw [`Cell`]s; [`assemble`] validates them against
//! a column signature and coerces every cell into a [`Value`].
mod assemble;
pub mod signature;
mod value;

pub use assemble::{Availability, assemble, coerce_cell};
pub use value::{Cell, ColumnType, Row, TypedTable, Value};
