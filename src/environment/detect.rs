use std::path::Path;

use super::checks::is_own_cgroup_visible;

/// Available runtime environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Cgroup paths from `/proc/self/cgroup` are valid below the cgroup root.
    Host,
    /// Only this process's own cgroup is mounted at the cgroup root.
    Container,
}

impl RuntimeEnvironment {
    pub fn is_container(self) -> bool {
        matches!(self, RuntimeEnvironment::Container)
    }
}

/// Decides whether the process runs containerized.
///
/// An explicit `override_containerized` always wins. Otherwise the process is
/// considered containerized when its own cgroup directory, as reported by
/// `/proc/self/cgroup`, does not exist below the cgroup root. Without such a
/// directory (hybrid or disabled cgroups) the host is assumed.
///
/// Errors of the existence check are logged as warnings and treated as
/// containerized, since the root itself is then the only usable path.
///
/// # Arguments
///
/// * `override_containerized` - Configured override, if any.
/// * `own_cgroup_dir` - Host-side directory of this process's cgroup.
pub fn detect_runtime_environment(
    override_containerized: Option<bool>,
    own_cgroup_dir: Option<&Path>,
) -> RuntimeEnvironment {
    if let Some(containerized) = override_containerized {
        log::debug!("Containerized override set: {}", containerized);
        return if containerized {
            RuntimeEnvironment::Container
        } else {
            RuntimeEnvironment::Host
        };
    }

    let Some(dir) = own_cgroup_dir else {
        return RuntimeEnvironment::Host;
    };

    match is_own_cgroup_visible(dir) {
        Ok(true) => RuntimeEnvironment::Host,
        Ok(false) => RuntimeEnvironment::Container,
        Err(err) => {
            log::warn!("Cgroup visibility check failed during runtime detection: {}", err);
            RuntimeEnvironment::Container
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert_eq!(
            detect_runtime_environment(Some(true), Some(dir.path())),
            RuntimeEnvironment::Container
        );
        assert_eq!(
            detect_runtime_environment(Some(false), Some(missing.as_path())),
            RuntimeEnvironment::Host
        );
    }

    #[test]
    fn test_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let pod = dir.path().join("kubepods/pod1");
        assert_eq!(
            detect_runtime_environment(None, Some(dir.path())),
            RuntimeEnvironment::Host
        );
        assert_eq!(
            detect_runtime_environment(None, Some(pod.as_path())),
            RuntimeEnvironment::Container
        );
        assert_eq!(detect_runtime_environment(None, None), RuntimeEnvironment::Host);
    }
}
