//! Fixed-column `/proc` files.
//!
//! Each submodule exposes a pure `parse` over file content returning raw rows
//! shaped to the matching signature in [`crate::table::signature`].
pub mod diskstats;
pub mod loadavg;
pub mod meminfo;
pub mod mountinfo;
pub mod netdev;
pub mod pid;
pub mod stat;

pub const DISKSTATS: &str = "diskstats";
pub const SELF_MOUNTINFO: &str = "self/mountinfo";
pub const SELF_CGROUP: &str = "self/cgroup";
pub const MEMINFO: &str = "meminfo";
pub const NET_DEV: &str = "net/dev";
pub const STAT: &str = "stat";
pub const LOADAVG: &str = "loadavg";
