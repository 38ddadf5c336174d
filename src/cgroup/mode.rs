use std::fmt;
use std::io::BufRead;
use std::path::Path;

use crate::fsutil;
use crate::procfs::mountinfo::parse_mount_info_line;

use super::{Error, Result};

/// Layout of the cgroup hierarchy this process sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CgroupMode {
    /// cgroup v1, one mount per controller.
    Legacy,
    /// cgroup v2, one merged hierarchy.
    Unified,
    /// v1 controllers next to a v2 mount at `<root>/unified`.
    Hybrid,
    Disabled,
}

impl CgroupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CgroupMode::Legacy => "legacy",
            CgroupMode::Unified => "unified",
            CgroupMode::Hybrid => "hybrid",
            CgroupMode::Disabled => "disabled",
        }
    }
}

impl fmt::Display for CgroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const UNIFIED_SUBDIR: &str = "unified";

/// Detects the cgroup mode by scanning a `mountinfo` file for cgroup mounts
/// at or below `cgroup_root`.
///
/// # Errors
///
/// - [`Error::MissingRoot`] if `cgroup_root` does not exist.
/// - [`Error::Read`] / [`Error::ReadLine`] if the mountinfo file cannot be read.
/// - [`Error::Mountinfo`] if a line fails to parse.
/// - [`Error::NoCgroupMount`] if no cgroup filesystem is mounted under the root.
pub fn detect_cgroup_mode(mountinfo: &Path, cgroup_root: &Path) -> Result<CgroupMode> {
    let exists = cgroup_root
        .try_exists()
        .map_err(|source| Error::ExistenceCheck {
            path: cgroup_root.to_path_buf(),
            source,
        })?;
    if !exists {
        return Err(Error::MissingRoot {
            path: cgroup_root.to_path_buf(),
        });
    }

    let buf = fsutil::open_file_reader(mountinfo)?;
    detect_cgroup_mode_from_reader(buf, mountinfo, cgroup_root)
}

fn detect_cgroup_mode_from_reader<R: BufRead>(
    mut reader: R,
    origin: &Path,
    cgroup_root: &Path,
) -> Result<CgroupMode> {
    let unified_subdir = cgroup_root.join(UNIFIED_SUBDIR);
    let mut unified_at_root = false;
    let mut unified_below_root = false;
    let mut legacy = false;

    let mut line = String::with_capacity(256);
    while reader
        .read_line(&mut line)
        .map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })?
        != 0
    {
        if line.trim().is_empty() {
            line.clear();
            continue;
        }
        let mount_info =
            parse_mount_info_line(line.as_str()).map_err(|source| Error::Mountinfo {
                path: origin.to_path_buf(),
                source,
            })?;
        let mount_point = Path::new(mount_info.mount_point);
        match mount_info.fs_type {
            "cgroup2" if mount_point == cgroup_root => {
                log::debug!("Found `cgroup2` mount at cgroup root: {}", mount_point.display());
                unified_at_root = true;
            }
            "cgroup2" if mount_point == unified_subdir => {
                log::debug!("Found `cgroup2` mount below cgroup root: {}", mount_point.display());
                unified_below_root = true;
            }
            "cgroup" if mount_point.starts_with(cgroup_root) => {
                log::debug!("Found `cgroup` v1 mount: {}", mount_point.display());
                legacy = true;
            }
            _ => {}
        }

        line.clear();
    }

    match (unified_at_root, unified_below_root, legacy) {
        (true, _, false) => Ok(CgroupMode::Unified),
        (_, true, true) | (true, _, true) => Ok(CgroupMode::Hybrid),
        (false, _, true) => Ok(CgroupMode::Legacy),
        (false, _, false) => Err(Error::NoCgroupMount {
            root: cgroup_root.to_path_buf(),
            path: origin.to_path_buf(),
        }),
    }
}
