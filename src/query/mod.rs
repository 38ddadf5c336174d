//! Callable queries over cgroup, Downward API, environment and `/proc` data.
//!
//! Every query re-reads its source on each call. A switched-off subsystem
//! answers with `NULL` or an empty table instead of an error; only
//! [`Query::CgroupMode`] always reports real state.
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::fsutil;
use crate::parse::FormatKind;
use crate::table::{Availability, ColumnType, TypedTable, Value, assemble, signature};
use crate::{Error, Result};

pub mod cgroup;
pub mod env;
pub mod host;
pub mod kdapi;
pub mod proc;

/// Result of a single query.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Scalar(Value),
    Rows(TypedTable),
}

/// Every query the crate answers, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    CgroupMode,
    CgroupPath,
    CgroupProcessCount,
    CgroupScalarBigint(String),
    CgroupScalarFloat8(String),
    CgroupScalarText(String),
    CgroupSetofBigint(String),
    CgroupSetofText(String),
    CgroupArrayBigint(String),
    CgroupArrayText(String),
    CgroupSetofKv(String),
    CgroupSetofKsv(String),
    CgroupSetofNkv(String),
    KdapiSetofKv(String),
    KdapiScalarBigint(String),
    EnvvarText(String),
    EnvvarBigint(String),
    ProcDiskstats,
    ProcMountinfo,
    ProcMeminfo,
    ProcNetworkStats,
    ProcCputime,
    ProcLoadavg,
    /// Children of the given parent pid, or of this process's parent.
    ProcPidIo(Option<u32>),
    ProcPidCmdline(Option<u32>),
    ProcPidStat(Option<u32>),
    /// Filesystem holding the given path.
    Fsinfo(PathBuf),
    PagesToBytes(i64),
}

impl Query {
    /// Column signature of the query's result.
    pub fn signature(&self) -> &'static [ColumnType] {
        use crate::parse::KernelFile;

        match self {
            Query::CgroupMode | Query::CgroupScalarText(_) | Query::EnvvarText(_) => {
                signature::TEXT
            }
            Query::CgroupPath => signature::TEXT_TEXT,
            Query::CgroupProcessCount => &[ColumnType::Int4],
            Query::CgroupScalarBigint(_)
            | Query::KdapiScalarBigint(_)
            | Query::EnvvarBigint(_) => signature::INT8,
            Query::CgroupScalarFloat8(_) => &[ColumnType::Float8],
            Query::CgroupSetofBigint(_) => FormatKind::MultilineScalar(ColumnType::Int8).signature(),
            Query::CgroupSetofText(_) => FormatKind::MultilineScalar(ColumnType::Text).signature(),
            Query::CgroupArrayBigint(_) => {
                FormatKind::ArraySeparated(ColumnType::Int8Array).signature()
            }
            Query::CgroupArrayText(_) => FormatKind::ArraySeparated(ColumnType::TextArray).signature(),
            Query::CgroupSetofKv(_) => FormatKind::FlatKeyed.signature(),
            Query::CgroupSetofKsv(_) => FormatKind::KeySubkeyValue.signature(),
            Query::CgroupSetofNkv(_) => FormatKind::NestedKeyed.signature(),
            Query::KdapiSetofKv(_) => FormatKind::KeyEqualsQuoted.signature(),
            Query::ProcDiskstats => KernelFile::Diskstats.signature(),
            Query::ProcMountinfo => KernelFile::Mountinfo.signature(),
            Query::ProcMeminfo => KernelFile::Meminfo.signature(),
            Query::ProcNetworkStats => KernelFile::NetDev.signature(),
            Query::ProcCputime => KernelFile::CpuTime.signature(),
            Query::ProcLoadavg => KernelFile::LoadAvg.signature(),
            Query::ProcPidIo(_) => signature::PID_IO,
            Query::ProcPidCmdline(_) => signature::PID_CMDLINE,
            Query::ProcPidStat(_) => signature::PID_STAT,
            Query::Fsinfo(_) => signature::FSINFO,
            Query::PagesToBytes(_) => signature::NUMERIC,
        }
    }

    /// Runs the query against `ctx`.
    ///
    /// When `expected` is given it must equal [`Self::signature`]; this is
    /// checked before any file is read.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaMismatch`] if `expected` differs from the query's signature.
    /// - Any error of the underlying query.
    pub fn execute(&self, ctx: &Context, expected: Option<&[ColumnType]>) -> Result<QueryResult> {
        let actual = self.signature();
        if let Some(expected) = expected {
            if expected != actual {
                return Err(Error::SchemaMismatch {
                    expected: expected.to_vec(),
                    actual: actual.to_vec(),
                });
            }
        }

        log::debug!("Executing {:?}", self);
        let result = match self {
            Query::CgroupMode => QueryResult::Scalar(cgroup::mode(ctx)),
            Query::CgroupPath => QueryResult::Rows(cgroup::path(ctx)?),
            Query::CgroupProcessCount => QueryResult::Scalar(cgroup::process_count(ctx)?),
            Query::CgroupScalarBigint(name) => {
                QueryResult::Scalar(cgroup::scalar(ctx, name, ColumnType::Int8)?)
            }
            Query::CgroupScalarFloat8(name) => {
                QueryResult::Scalar(cgroup::scalar(ctx, name, ColumnType::Float8)?)
            }
            Query::CgroupScalarText(name) => {
                QueryResult::Scalar(cgroup::scalar(ctx, name, ColumnType::Text)?)
            }
            Query::CgroupSetofBigint(name) => QueryResult::Rows(cgroup::table(
                ctx,
                name,
                FormatKind::MultilineScalar(ColumnType::Int8),
            )?),
            Query::CgroupSetofText(name) => QueryResult::Rows(cgroup::table(
                ctx,
                name,
                FormatKind::MultilineScalar(ColumnType::Text),
            )?),
            Query::CgroupArrayBigint(name) => {
                QueryResult::Scalar(cgroup::array(ctx, name, ColumnType::Int8Array)?)
            }
            Query::CgroupArrayText(name) => {
                QueryResult::Scalar(cgroup::array(ctx, name, ColumnType::TextArray)?)
            }
            Query::CgroupSetofKv(name) => {
                QueryResult::Rows(cgroup::table(ctx, name, FormatKind::FlatKeyed)?)
            }
            Query::CgroupSetofKsv(name) => {
                QueryResult::Rows(cgroup::table(ctx, name, FormatKind::KeySubkeyValue)?)
            }
            Query::CgroupSetofNkv(name) => {
                QueryResult::Rows(cgroup::table(ctx, name, FormatKind::NestedKeyed)?)
            }
            Query::KdapiSetofKv(name) => QueryResult::Rows(kdapi::setof_kv(ctx, name)?),
            Query::KdapiScalarBigint(name) => QueryResult::Scalar(kdapi::scalar_bigint(ctx, name)?),
            Query::EnvvarText(name) => QueryResult::Scalar(env::text(name)?),
            Query::EnvvarBigint(name) => QueryResult::Scalar(env::bigint(name)?),
            Query::ProcDiskstats => QueryResult::Rows(proc::diskstats(ctx)?),
            Query::ProcMountinfo => QueryResult::Rows(proc::mountinfo(ctx)?),
            Query::ProcMeminfo => QueryResult::Rows(proc::meminfo(ctx)?),
            Query::ProcNetworkStats => QueryResult::Rows(proc::network_stats(ctx)?),
            Query::ProcCputime => QueryResult::Rows(proc::cputime(ctx)?),
            Query::ProcLoadavg => QueryResult::Rows(proc::loadavg(ctx)?),
            Query::ProcPidIo(ppid) => QueryResult::Rows(proc::pid_io(ctx, *ppid)?),
            Query::ProcPidCmdline(ppid) => QueryResult::Rows(proc::pid_cmdline(ctx, *ppid)?),
            Query::ProcPidStat(ppid) => QueryResult::Rows(proc::pid_stat(ctx, *ppid)?),
            Query::Fsinfo(path) => QueryResult::Rows(host::fsinfo(ctx, path)?),
            Query::PagesToBytes(pages) => QueryResult::Scalar(host::pages_to_bytes(*pages)?),
        };
        Ok(result)
    }
}

/// Reads `path` and assembles it with the given format.
pub(crate) fn read_table(path: &Path, format: FormatKind) -> Result<TypedTable> {
    let content = fsutil::read_virtual_file(path)?;
    let rows = format.parse(&content).map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    assemble(rows, format.signature(), Availability::Enabled(path))
}

/// First cell of the first row, `NULL` for an empty table.
pub(crate) fn first_value(table: TypedTable) -> Value {
    table
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Config;

    fn disabled_context() -> (tempfile::TempDir, Context) {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            cgroup_enabled: false,
            cgroup_root: tmp.path().join("cgroup"),
            containerized: None,
            kdapi_enabled: false,
            kdapi_path: tmp.path().join("podinfo"),
            proc_root: tmp.path().join("proc"),
        };
        let ctx = Context::init(&config);
        (tmp, ctx)
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let (_tmp, ctx) = disabled_context();
        let err = Query::CgroupSetofKv("memory.stat".into())
            .execute(&ctx, Some(&[ColumnType::Text, ColumnType::Text]))
            .unwrap_err();
        match err {
            Error::SchemaMismatch { expected, actual } => {
                assert_eq!(expected, vec![ColumnType::Text, ColumnType::Text]);
                assert_eq!(actual, vec![ColumnType::Text, ColumnType::Int8]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_matching_schema_is_accepted() {
        let (_tmp, ctx) = disabled_context();
        let res = Query::CgroupSetofKv("memory.stat".into())
            .execute(&ctx, Some(signature::TEXT_INT8))
            .unwrap();
        assert_eq!(res, QueryResult::Rows(TypedTable::empty(signature::TEXT_INT8)));
    }

    #[test]
    fn test_disabled_subsystems_degrade() {
        let (_tmp, ctx) = disabled_context();
        assert_eq!(
            Query::CgroupMode.execute(&ctx, None).unwrap(),
            QueryResult::Scalar(Value::Text("disabled".into()))
        );
        assert_eq!(
            Query::CgroupScalarBigint("memory.max".into())
                .execute(&ctx, None)
                .unwrap(),
            QueryResult::Scalar(Value::Null)
        );
        assert_eq!(
            Query::KdapiSetofKv("labels".into())
                .execute(&ctx, None)
                .unwrap(),
            QueryResult::Rows(TypedTable::empty(signature::TEXT_TEXT))
        );
        assert_eq!(
            Query::ProcLoadavg.execute(&ctx, None).unwrap(),
            QueryResult::Rows(TypedTable::empty(signature::LOADAVG))
        );
        assert_eq!(
            Query::Fsinfo(PathBuf::from("/"))
                .execute(&ctx, None)
                .unwrap(),
            QueryResult::Rows(TypedTable::empty(signature::FSINFO))
        );
    }

    #[test]
    fn test_traversal_rejected_even_when_disabled() {
        let (_tmp, ctx) = disabled_context();
        for name in ["../../etc/passwd", "/etc/passwd"] {
            let err = Query::CgroupScalarText(name.into())
                .execute(&ctx, None)
                .unwrap_err();
            assert!(matches!(err, Error::AccessDenied(_)), "{name}");
            let err = Query::KdapiSetofKv(name.into())
                .execute(&ctx, None)
                .unwrap_err();
            assert!(matches!(err, Error::AccessDenied(_)), "{name}");
        }
    }

    #[test]
    fn test_every_signature_is_non_empty() {
        let queries = [
            Query::CgroupMode,
            Query::CgroupPath,
            Query::CgroupProcessCount,
            Query::CgroupArrayBigint(String::new()),
            Query::KdapiScalarBigint(String::new()),
            Query::ProcDiskstats,
            Query::ProcPidStat(None),
        ];
        for query in queries {
            assert!(!query.signature().is_empty(), "{query:?}");
        }
        assert_eq!(Query::ProcDiskstats.signature().len(), 20);
        assert_eq!(Query::ProcPidStat(None).signature().len(), 52);
        assert_eq!(Query::PagesToBytes(1).signature(), &[ColumnType::Numeric]);
    }
}
