use std::path::{Path, PathBuf};

use crate::environment::detect_runtime_environment;
use crate::error::ResultOkLogExt;
use crate::parse::tokens::lines;
use crate::parse::{CoerceError, ParseError};
use crate::{fsutil, procfs};

use super::path::{CgroupPathTable, own_cgroup_dir, parse_proc_cgroup, unified_entry};
use super::{CgroupMode, Error, Result};

const PROCS_FILE: &str = "cgroup.procs";

/// Resolved cgroup topology of the current process.
///
/// Built once by [`CgroupState::resolve`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupState {
    mode: CgroupMode,
    containerized: bool,
    root: PathBuf,
    paths: CgroupPathTable,
}

impl CgroupState {
    pub fn disabled() -> Self {
        Self {
            mode: CgroupMode::Disabled,
            containerized: false,
            root: PathBuf::new(),
            paths: CgroupPathTable::default(),
        }
    }

    /// Resolves the topology, forcing [`CgroupMode::Disabled`] on any failure.
    ///
    /// Failures are logged and not retried; a fresh resolution needs a new call.
    pub fn resolve(
        enabled: bool,
        proc_root: &Path,
        cgroup_root: &Path,
        containerized_override: Option<bool>,
    ) -> Self {
        if !enabled {
            log::info!("cgroup support disabled by configuration");
            return Self::disabled();
        }

        let resolved = match Self::try_resolve(proc_root, cgroup_root, containerized_override) {
            Err(Error::Hybrid) => Err(crate::Error::UnsupportedMode),
            other => Ok(other),
        };
        resolved
            .ok_log()
            .and_then(|res| res.ok_log())
            .unwrap_or_else(|| {
                log::warn!(
                    "cgroup support forced to `disabled` for root `{}`",
                    cgroup_root.display()
                );
                Self::disabled()
            })
    }

    /// Resolves the topology, surfacing the first failure.
    ///
    /// # Errors
    ///
    /// - [`Error::Hybrid`] if a hybrid hierarchy is detected.
    /// - Any mode detection, `/proc/self/cgroup` or `cgroup.controllers` failure.
    pub fn try_resolve(
        proc_root: &Path,
        cgroup_root: &Path,
        containerized_override: Option<bool>,
    ) -> Result<Self> {
        let mode =
            super::detect_cgroup_mode(&proc_root.join(procfs::SELF_MOUNTINFO), cgroup_root)?;
        if mode == CgroupMode::Hybrid {
            return Err(Error::Hybrid);
        }

        let self_cgroup = proc_root.join(procfs::SELF_CGROUP);
        let content = fsutil::read_virtual_file(&self_cgroup)?;
        let entries = parse_proc_cgroup(&content, &self_cgroup)?;

        let own_dir = own_cgroup_dir(cgroup_root, mode, &entries);
        let containerized =
            detect_runtime_environment(containerized_override, own_dir.as_deref()).is_container();

        let paths = match mode {
            CgroupMode::Legacy => CgroupPathTable::build_legacy(cgroup_root, &entries, containerized),
            _ => {
                let entry = unified_entry(&entries).ok_or_else(|| Error::MissingUnifiedEntry {
                    path: self_cgroup.clone(),
                })?;
                CgroupPathTable::build_unified(cgroup_root, entry.path, containerized)?
            }
        };

        log::debug!(
            "Resolved cgroup mode `{}` (containerized: {}) with {} controller paths",
            mode,
            containerized,
            paths.len()
        );
        for (controller, path) in paths.iter() {
            log::debug!("cgroup path `{}`: {}", controller, path.display());
        }

        Ok(Self {
            mode,
            containerized,
            root: cgroup_root.to_path_buf(),
            paths,
        })
    }

    pub fn mode(&self) -> CgroupMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != CgroupMode::Disabled
    }

    pub fn is_containerized(&self) -> bool {
        self.containerized
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> &CgroupPathTable {
        &self.paths
    }

    /// Resolves a caller-supplied `<controller>.<file>` name to an absolute path.
    ///
    /// The name is validated before any file system access.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::AccessDenied`] for absolute, traversing or escaping names.
    /// - [`crate::Error::MissingControllerPrefix`] if the name has no `.`.
    /// - [`crate::Error::UnknownController`] if the controller has no path entry.
    pub fn file_path(&self, filename: &str) -> crate::Result<PathBuf> {
        fsutil::check_relative_filename(filename)?;
        let (controller, _) = filename
            .split_once('.')
            .ok_or_else(|| crate::Error::MissingControllerPrefix(filename.to_owned()))?;
        let dir = self
            .paths
            .get(controller)
            .ok_or_else(|| crate::Error::UnknownController(controller.to_owned()))?;
        Ok(fsutil::resolve_under(dir, filename)?)
    }

    /// Sorted, distinct pids listed in `cgroup.procs` of the default cgroup.
    pub fn member_pids(&self) -> crate::Result<Vec<u32>> {
        let path = self.file_path(PROCS_FILE)?;
        let content = fsutil::read_virtual_file(&path)?;

        let mut pids = lines(&content)
            .into_iter()
            .enumerate()
            .map(|(idx, line)| {
                line.trim().parse::<u32>().map_err(|_| ParseError::Value {
                    row: idx + 1,
                    column: 1,
                    source: CoerceError::Invalid {
                        value: line.to_owned(),
                        target: "pid",
                    },
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| crate::Error::Malformed {
                path: path.clone(),
                source,
            })?;
        pids.sort_unstable();
        pids.dedup();
        Ok(pids)
    }
}
