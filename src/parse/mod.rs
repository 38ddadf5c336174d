//! Parsing of the ad hoc text encodings used by cgroup, procfs and
//! Downward API files.
pub mod coerce;
mod error;
pub mod format;
pub mod tokens;

pub use error::{Arity, CoerceError, EscapeError, ParseError};
pub use format::{FormatKind, KernelFile};
