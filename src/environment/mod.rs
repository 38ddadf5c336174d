//! Environment detection module.
//!
//! Determines whether the process runs containerized, which decides how
//! cgroup paths from `/proc/self/cgroup` map onto the cgroup root, and
//! whether pseudo filesystems are present at all.
mod checks;
mod detect;
mod error;

pub use checks::path_exists;
pub use detect::{RuntimeEnvironment, detect_runtime_environment};
pub use error::{Error, Result};
