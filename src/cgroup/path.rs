//! Per-controller cgroup paths of the current process.
//!
//! `/proc/self/cgroup` lines look like `<hierarchy-id>:<controller-list>:<cgroup-path>`:
//!
//! - v1: arbitrary id, comma separated controllers (`cpu,cpuacct`, or
//!   `name=systemd` for named hierarchies), path relative to that controller's mount.
//! - v2: always `0::<path>`, path relative to the unified root.

use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::parse::tokens::{lines, single_line, tokens};
use crate::parse::ParseError;

use super::{CgroupMode, Error, Result};

/// Key of the entry used when a caller names no controller.
pub const DEFAULT_CONTROLLER: &str = "cgroup";
const LEGACY_DEFAULT_SOURCE: &str = "memory";
const CONTROLLERS_FILE: &str = "cgroup.controllers";

/// One line of `/proc/self/cgroup`.
#[derive(Debug, PartialEq, Eq)]
pub struct ProcCgroupEntry<'a> {
    pub hierarchy_id: &'a str,
    pub controllers: &'a str,
    pub path: &'a str,
}

impl<'a> ProcCgroupEntry<'a> {
    /// Controller list with a `name=` prefix stripped.
    pub fn controller_key(&self) -> &'a str {
        match self.controllers.split_once('=') {
            Some((_, name)) => name,
            None => self.controllers,
        }
    }
}

pub fn parse_proc_cgroup_line(
    line: &str,
    lineno: usize,
) -> std::result::Result<ProcCgroupEntry<'_>, ParseError> {
    let mut parts = line.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(hierarchy_id), Some(controllers), Some(path)) => Ok(ProcCgroupEntry {
            hierarchy_id,
            controllers,
            path,
        }),
        _ => Err(ParseError::MissingDelimiter {
            line: lineno,
            delimiter: ':',
        }),
    }
}

/// Parses the content of `/proc/self/cgroup` read from `origin`.
pub fn parse_proc_cgroup<'a>(content: &'a str, origin: &Path) -> Result<Vec<ProcCgroupEntry<'a>>> {
    lines(content)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            parse_proc_cgroup_line(line, idx + 1).map_err(|source| Error::Parse {
                path: origin.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Joins a `/proc/self/cgroup` path (which starts with `/`) under `base`.
pub fn join_cgroup_path(base: &Path, cgroup_path: &str) -> PathBuf {
    let relative = cgroup_path.trim_start_matches('/');
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// Mapping from controller name to the absolute path of this process's cgroup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgroupPathTable {
    entries: Vec<(String, PathBuf)>,
}

impl CgroupPathTable {
    fn insert(&mut self, controller: &str, path: PathBuf) {
        if self.get_exact(controller).is_none() {
            self.entries.push((controller.to_owned(), path));
        }
    }

    fn get_exact(&self, controller: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(key, _)| key == controller)
            .map(|(_, path)| path.as_path())
    }

    /// Looks up a controller. The empty name resolves to the default entry.
    pub fn get(&self, controller: &str) -> Option<&Path> {
        if controller.is_empty() {
            return self.get_exact(DEFAULT_CONTROLLER);
        }
        self.get_exact(controller)
    }

    /// Path of the default entry.
    pub fn default_path(&self) -> Option<&Path> {
        self.get_exact(DEFAULT_CONTROLLER)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(key, path)| (key.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the table for a legacy (v1) hierarchy.
    ///
    /// Each line maps its controller list to `<root>/<controllers>/<path>`, or to
    /// `<root>/<controllers>` when containerized. The combined list and every
    /// single controller in it are registered. The default entry follows the
    /// `memory` controller.
    pub fn build_legacy(
        cgroup_root: &Path,
        entries: &[ProcCgroupEntry<'_>],
        containerized: bool,
    ) -> Self {
        let mut table = Self::default();
        let mut default_path = None;

        for entry in entries {
            let key = entry.controller_key();
            if key.is_empty() {
                continue;
            }
            let mount = cgroup_root.join(key);
            let path = if containerized {
                mount
            } else {
                join_cgroup_path(&mount, entry.path)
            };

            let controllers: Vec<&str> = key.split(',').collect();
            if default_path.is_none() && controllers.contains(&LEGACY_DEFAULT_SOURCE) {
                default_path = Some(path.clone());
            }
            table.insert(key, path.clone());
            if controllers.len() > 1 {
                for controller in controllers {
                    table.insert(controller, path.clone());
                }
            }
        }

        let default_path = default_path.or_else(|| table.entries.first().map(|(_, p)| p.clone()));
        if let Some(path) = default_path {
            table.insert(DEFAULT_CONTROLLER, path);
        }
        table
    }

    /// Builds the table for a unified (v2) hierarchy.
    ///
    /// Every controller listed in `cgroup.controllers` of the process's cgroup
    /// maps to the same path, plus the default entry.
    pub fn build_unified(cgroup_root: &Path, unified_path: &str, containerized: bool) -> Result<Self> {
        let path = if containerized {
            cgroup_root.to_path_buf()
        } else {
            join_cgroup_path(cgroup_root, unified_path)
        };

        let controllers_file = path.join(CONTROLLERS_FILE);
        let content = fsutil::read_virtual_file(&controllers_file)?;
        let mut table = Self::default();
        if !content.trim().is_empty() {
            let line = single_line(&content).map_err(|source| Error::Parse {
                path: controllers_file.clone(),
                source,
            })?;
            for controller in tokens(line) {
                table.insert(controller, path.clone());
            }
        }
        table.insert(DEFAULT_CONTROLLER, path);
        Ok(table)
    }
}

/// Finds the `0::<path>` entry of the unified hierarchy.
pub fn unified_entry<'a, 'b>(entries: &'b [ProcCgroupEntry<'a>]) -> Option<&'b ProcCgroupEntry<'a>> {
    entries
        .iter()
        .find(|e| e.hierarchy_id == "0" && e.controllers.is_empty())
}

/// Finds the entry whose cgroup directory decides containerization in legacy mode.
pub fn legacy_own_entry<'a, 'b>(entries: &'b [ProcCgroupEntry<'a>]) -> Option<&'b ProcCgroupEntry<'a>> {
    entries
        .iter()
        .find(|e| e.controller_key().split(',').any(|c| c == LEGACY_DEFAULT_SOURCE))
}

/// Directory of this process's own cgroup as the host would see it.
pub fn own_cgroup_dir(
    cgroup_root: &Path,
    mode: CgroupMode,
    entries: &[ProcCgroupEntry<'_>],
) -> Option<PathBuf> {
    match mode {
        CgroupMode::Unified => unified_entry(entries).map(|e| join_cgroup_path(cgroup_root, e.path)),
        CgroupMode::Legacy => legacy_own_entry(entries)
            .map(|e| join_cgroup_path(&cgroup_root.join(e.controller_key()), e.path)),
        CgroupMode::Hybrid | CgroupMode::Disabled => None,
    }
}
