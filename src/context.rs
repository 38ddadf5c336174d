//! Process-wide configuration and the resolved, read-only query context.
use std::path::{Path, PathBuf};

use crate::cgroup::{CgroupMode, CgroupState};
use crate::environment;
use crate::error::ResultOkLogExt;

pub const ENV_CGROUP_ENABLED: &str = "NODEMX_CGROUP_ENABLED";
pub const ENV_CGROUP_ROOT: &str = "NODEMX_CGROUP_ROOT";
pub const ENV_CONTAINERIZED: &str = "NODEMX_CONTAINERIZED";
pub const ENV_KDAPI_ENABLED: &str = "NODEMX_KDAPI_ENABLED";
pub const ENV_KDAPI_PATH: &str = "NODEMX_KDAPI_PATH";
pub const ENV_PROC_ROOT: &str = "NODEMX_PROC_ROOT";

const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
const DEFAULT_KDAPI_PATH: &str = "/etc/podinfo";
const DEFAULT_PROC_ROOT: &str = "/proc";

/// Configuration consumed at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cgroup_enabled: bool,
    pub cgroup_root: PathBuf,
    /// Overrides the containerization heuristic when set.
    pub containerized: Option<bool>,
    pub kdapi_enabled: bool,
    pub kdapi_path: PathBuf,
    pub proc_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cgroup_enabled: true,
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            containerized: None,
            kdapi_enabled: true,
            kdapi_path: PathBuf::from(DEFAULT_KDAPI_PATH),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl Config {
    /// Reads the configuration from `NODEMX_*` environment variables.
    ///
    /// Unset variables keep their default. Unparsable booleans are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name).and_then(|v| v.into_string().ok()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let flag = |name: &str| {
            lookup(name).and_then(|raw| {
                parse_bool(&raw)
                    .ok_or_else(|| crate::Error::EnvVar {
                        name: name.to_owned(),
                        reason: "expected one of on/off/true/false/yes/no/1/0",
                    })
                    .ok_log()
            })
        };

        if let Some(enabled) = flag(ENV_CGROUP_ENABLED) {
            config.cgroup_enabled = enabled;
        }
        if let Some(root) = lookup(ENV_CGROUP_ROOT) {
            config.cgroup_root = PathBuf::from(root);
        }
        config.containerized = flag(ENV_CONTAINERIZED);
        if let Some(enabled) = flag(ENV_KDAPI_ENABLED) {
            config.kdapi_enabled = enabled;
        }
        if let Some(path) = lookup(ENV_KDAPI_PATH) {
            config.kdapi_path = PathBuf::from(path);
        }
        if let Some(root) = lookup(ENV_PROC_ROOT) {
            config.proc_root = PathBuf::from(root);
        }
        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Immutable state shared by every query.
///
/// Re-initialization means building a new context with [`Context::init`].
#[derive(Debug, Clone)]
pub struct Context {
    cgroup: CgroupState,
    kdapi_enabled: bool,
    kdapi_path: PathBuf,
    proc_enabled: bool,
    proc_root: PathBuf,
}

impl Context {
    /// Resolves cgroups, then checks the Downward API and `/proc` roots.
    ///
    /// Never fails: an unusable subsystem is logged and switched off.
    pub fn init(config: &Config) -> Self {
        let cgroup = CgroupState::resolve(
            config.cgroup_enabled,
            &config.proc_root,
            &config.cgroup_root,
            config.containerized,
        );

        let kdapi_enabled = config.kdapi_enabled && root_available("kdapi", &config.kdapi_path);
        let proc_enabled = root_available("procfs", &config.proc_root);

        log::info!(
            "Initialized context: cgroup mode `{}`, kdapi {}, procfs {}",
            cgroup.mode(),
            if kdapi_enabled { "enabled" } else { "disabled" },
            if proc_enabled { "enabled" } else { "disabled" },
        );

        Self {
            cgroup,
            kdapi_enabled,
            kdapi_path: config.kdapi_path.clone(),
            proc_enabled,
            proc_root: config.proc_root.clone(),
        }
    }

    pub fn cgroup(&self) -> &CgroupState {
        &self.cgroup
    }

    pub fn cgroup_mode(&self) -> CgroupMode {
        self.cgroup.mode()
    }

    pub fn kdapi_enabled(&self) -> bool {
        self.kdapi_enabled
    }

    pub fn kdapi_path(&self) -> &Path {
        &self.kdapi_path
    }

    pub fn proc_enabled(&self) -> bool {
        self.proc_enabled
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }
}

fn root_available(subsystem: &str, root: &Path) -> bool {
    match environment::path_exists(root).ok_log() {
        Some(true) => true,
        Some(false) => {
            log::warn!(
                "{} root `{}` does not exist, disabling {}",
                subsystem,
                root.display(),
                subsystem
            );
            false
        }
        None => false,
    }
}
