//! Cgroup topology of the current process.
//!
//! Detects which cgroup layout is mounted, reads `/proc/self/cgroup` and maps
//! every controller to the absolute directory holding this process's cgroup
//! files. The result is resolved once and never changes afterwards.
//!
//! # Key Components
//!
//! - [`CgroupMode`] - Legacy, unified, hybrid or disabled.
//! - [`CgroupPathTable`] - Controller name to directory mapping.
//! - [`CgroupState`] - Mode, containerization and path table together.
mod error;
mod mode;
pub mod path;
mod resolver;

pub use error::{Error, Result};
pub use mode::{CgroupMode, detect_cgroup_mode};
pub use path::{CgroupPathTable, DEFAULT_CONTROLLER};
pub use resolver::CgroupState;
