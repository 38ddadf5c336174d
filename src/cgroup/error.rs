use std::path::PathBuf;

use crate::fsutil;
use crate::parse::ParseError;
use crate::procfs::mountinfo::MountInfoError;

/// Errors that may occur while resolving the cgroup topology.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] fsutil::FileReadError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse line in file `{path}`: {source}")]
    Mountinfo {
        path: PathBuf,
        #[source]
        source: MountInfoError,
    },
    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("failed to check if path `{path}` exists: {source}")]
    ExistenceCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cgroup root `{path}` does not exist")]
    MissingRoot { path: PathBuf },
    #[error("no cgroup mount under `{root}` in `{path}`")]
    NoCgroupMount { root: PathBuf, path: PathBuf },
    #[error("no unified hierarchy entry `0::<path>` in `{path}`")]
    MissingUnifiedEntry { path: PathBuf },
    #[error("cgroup hybrid mode is not supported")]
    Hybrid,
}

pub type Result<T> = std::result::Result<T, Error>;
