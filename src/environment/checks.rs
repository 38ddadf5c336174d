use super::{Error, Result};
use std::path::Path;

/// Returns true if `path` exists.
///
/// # Errors
///
/// Returns [`Error::ExistenceCheck`] if the existence check itself fails,
/// e.g. because a parent directory is not searchable.
pub fn path_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    path.try_exists().map_err(|source| Error::ExistenceCheck {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns true if the cgroup directory the kernel reports for this process
/// is visible under the configured cgroup root.
///
/// A process in a container typically sees its host-side cgroup path in
/// `/proc/self/cgroup` while only its own subtree is mounted at the root.
pub fn is_own_cgroup_visible(own_cgroup_dir: impl AsRef<Path>) -> Result<bool> {
    let dir = own_cgroup_dir.as_ref();
    let visible = path_exists(dir)?;
    log::debug!(
        "Own cgroup directory `{}` visible: {}",
        dir.display(),
        visible
    );
    Ok(visible)
}
