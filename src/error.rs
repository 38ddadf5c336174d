use std::path::PathBuf;

use crate::fsutil::{FileReadError, FilenameError};
use crate::host::HostError;
use crate::parse::ParseError;
use crate::table::ColumnType;

/// Errors surfaced by a single query.
///
/// Every variant is terminal for the query that produced it; no partial
/// results are returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("access denied: {0}")]
    AccessDenied(#[from] FilenameError),

    #[error(transparent)]
    Io(#[from] FileReadError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("malformed data in `{path}`: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("expected at least one line of data in `{path}` but found none")]
    NoData { path: PathBuf },

    #[error("declared schema {expected:?} does not match produced schema {actual:?}")]
    SchemaMismatch {
        expected: Vec<ColumnType>,
        actual: Vec<ColumnType>,
    },

    #[error("cgroup hybrid mode is not supported")]
    UnsupportedMode,

    #[error("missing controller prefix in cgroup filename `{0}`")]
    MissingControllerPrefix(String),

    #[error("no cgroup path known for controller `{0}`")]
    UnknownController(String),

    #[error("environment variable `{name}`: {reason}")]
    EnvVar { name: String, reason: &'static str },
}

impl Error {
    /// Returns true if the error was caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(err) => err.source.kind() == std::io::ErrorKind::NotFound,
            Error::Host(HostError::Stat { source, .. }) => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
