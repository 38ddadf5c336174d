//! Queries over `/proc`.
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::unistd::{Uid, User, getppid};

use crate::context::Context;
use crate::error::ResultOkLogExt;
use crate::fsutil::{self, FileReadError};
use crate::parse::{FormatKind, KernelFile};
use crate::procfs::{self, pid};
use crate::table::{Availability, Cell, ColumnType, Row, TypedTable, assemble, signature};
use crate::{Error, Result};

use super::read_table;

fn kernel_table(ctx: &Context, relative: &str, kind: KernelFile) -> Result<TypedTable> {
    if !ctx.proc_enabled() {
        return assemble(Vec::new(), kind.signature(), Availability::Disabled);
    }
    read_table(&ctx.proc_root().join(relative), FormatKind::Kernel(kind))
}

pub fn diskstats(ctx: &Context) -> Result<TypedTable> {
    kernel_table(ctx, procfs::DISKSTATS, KernelFile::Diskstats)
}

/// Mounts visible to this process.
pub fn mountinfo(ctx: &Context) -> Result<TypedTable> {
    kernel_table(ctx, procfs::SELF_MOUNTINFO, KernelFile::Mountinfo)
}

/// `/proc/meminfo` with sizes converted to bytes.
pub fn meminfo(ctx: &Context) -> Result<TypedTable> {
    kernel_table(ctx, procfs::MEMINFO, KernelFile::Meminfo)
}

pub fn network_stats(ctx: &Context) -> Result<TypedTable> {
    kernel_table(ctx, procfs::NET_DEV, KernelFile::NetDev)
}

/// Aggregate CPU times from the first line of `/proc/stat`.
pub fn cputime(ctx: &Context) -> Result<TypedTable> {
    kernel_table(ctx, procfs::STAT, KernelFile::CpuTime)
}

pub fn loadavg(ctx: &Context) -> Result<TypedTable> {
    kernel_table(ctx, procfs::LOADAVG, KernelFile::LoadAvg)
}

fn parent_pid() -> u32 {
    getppid().as_raw().unsigned_abs()
}

/// Path of the `children` file and the child pids it lists.
fn children(ctx: &Context, ppid: Option<u32>) -> Result<(PathBuf, Vec<String>)> {
    let ppid = ppid.unwrap_or_else(parent_pid);
    let path = pid::children_path(ctx.proc_root(), ppid);
    let content = fsutil::read_virtual_file(&path)?;
    let pids = pid::parse_children(&content);
    log::trace!("Found {} children of pid {}", pids.len(), ppid);
    Ok((path, pids))
}

/// Builds one row per child of `ppid`; no children is an error.
fn per_child(
    ctx: &Context,
    ppid: Option<u32>,
    signature: &[ColumnType],
    row: impl Fn(&Path, &str) -> Result<Row>,
) -> Result<TypedTable> {
    if !ctx.proc_enabled() {
        return assemble(Vec::new(), signature, Availability::Disabled);
    }
    let (children_path, pids) = children(ctx, ppid)?;
    let rows = pids
        .iter()
        .map(|pid| row(ctx.proc_root(), pid))
        .collect::<Result<Vec<_>>>()?;
    assemble(rows, signature, Availability::Enabled(&children_path))
}

/// I/O counters of every child of `ppid`.
pub fn pid_io(ctx: &Context, ppid: Option<u32>) -> Result<TypedTable> {
    per_child(ctx, ppid, signature::PID_IO, |proc_root, child| {
        let path = pid::io_path(proc_root, child);
        let content = fsutil::read_virtual_file(&path)?;
        pid::parse_io(child, &content).map_err(|source| Error::Malformed { path, source })
    })
}

/// Command line and owner of every child of `ppid`.
pub fn pid_cmdline(ctx: &Context, ppid: Option<u32>) -> Result<TypedTable> {
    per_child(ctx, ppid, signature::PID_CMDLINE, |proc_root, child| {
        let cmdline = fsutil::read_virtual_file(pid::cmdline_path(proc_root, child))?;

        let dir = proc_root.join(child);
        let uid = std::fs::metadata(&dir)
            .map_err(|source| FileReadError { path: dir, source })?
            .uid();
        let username = User::from_uid(Uid::from_raw(uid))
            .ok_log()
            .flatten()
            .map_or(Cell::Null, |user| Cell::from(user.name));

        Ok(vec![
            Cell::from(child),
            Cell::from(pid::render_cmdline(&cmdline)),
            Cell::from(uid.to_string()),
            username,
        ])
    })
}

/// `/proc/<pid>/stat` of every child of `ppid`.
pub fn pid_stat(ctx: &Context, ppid: Option<u32>) -> Result<TypedTable> {
    per_child(ctx, ppid, signature::PID_STAT, |proc_root, child| {
        let path = pid::stat_path(proc_root, child);
        let content = fsutil::read_virtual_file(&path)?;
        pid::parse_stat(&content).map_err(|source| Error::Malformed { path, source })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Config;
    use crate::table::Value;
    use std::fs;

    const STAT_TAIL: &str = "S 1 100 100 0 -1 4194560 1553 0 0 0 2 1 0 0 20 0 1 0 \
        123456 229376000 4107 18446744073709551615 1 1 0 0 0 0 0 4096 536873472 0 0 0 \
        17 3 0 0 0 0 0 0 0 0 0 0 0 0 0";

    const IO: &str = "rchar: 4096\nwchar: 1024\nsyscr: 12\nsyscw: 3\n\
        read_bytes: 8192\nwrite_bytes: 0\ncancelled_write_bytes: 0\n";

    /// Fake `/proc` with a parent pid 100 and children 200 and 201.
    fn proc_context() -> (tempfile::TempDir, Context) {
        let tmp = tempfile::tempdir().unwrap();
        let proc_root = tmp.path().join("proc");
        fs::create_dir_all(proc_root.join("100/task/100")).unwrap();
        fs::write(proc_root.join("100/task/100/children"), "200 201 ").unwrap();
        for (child, comm) in [("200", "postgres: checkpointer"), ("201", "postgres: (walwriter)")] {
            let dir = proc_root.join(child);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("io"), IO).unwrap();
            fs::write(dir.join("stat"), format!("{child} ({comm}) {STAT_TAIL}\n")).unwrap();
            fs::write(dir.join("cmdline"), "postgres\0-D\0/pgdata\0").unwrap();
        }
        fs::write(
            proc_root.join("loadavg"),
            "0.52 0.58 0.59 2/1189 41345\n",
        )
        .unwrap();
        fs::write(
            proc_root.join("meminfo"),
            "MemTotal:       16318712 kB\nHugePages_Total:       0\n",
        )
        .unwrap();
        fs::write(
            proc_root.join("stat"),
            "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 0 0\ncpu0 1 2 3 4 5 6 7 8 9 10\n",
        )
        .unwrap();

        let config = Config {
            cgroup_enabled: false,
            kdapi_enabled: false,
            proc_root,
            ..Config::default()
        };
        let ctx = Context::init(&config);
        (tmp, ctx)
    }

    #[test]
    fn test_loadavg() {
        let (_tmp, ctx) = proc_context();
        let table = loadavg(&ctx).unwrap();
        assert_eq!(
            table.rows,
            vec![vec![
                Value::Float8(0.52),
                Value::Float8(0.58),
                Value::Float8(0.59),
                Value::Int4(41345),
            ]]
        );
    }

    #[test]
    fn test_meminfo_in_bytes() {
        let (_tmp, ctx) = proc_context();
        let table = meminfo(&ctx).unwrap();
        assert_eq!(
            table.rows,
            vec![
                vec![Value::Text("MemTotal".into()), Value::Int8(16_318_712 * 1024)],
                vec![Value::Text("HugePages_Total".into()), Value::Int8(0)],
            ]
        );
    }

    #[test]
    fn test_cputime_first_line() {
        let (_tmp, ctx) = proc_context();
        let table = cputime(&ctx).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].len(), 5);
        assert_eq!(table.rows[0][0], Value::Int8(10_132_153));
    }

    #[test]
    fn test_missing_kernel_file_is_not_found() {
        let (_tmp, ctx) = proc_context();
        assert!(diskstats(&ctx).unwrap_err().is_not_found());
        assert!(network_stats(&ctx).unwrap_err().is_not_found());
        assert!(mountinfo(&ctx).unwrap_err().is_not_found());
    }

    #[test]
    fn test_pid_io() {
        let (_tmp, ctx) = proc_context();
        let table = pid_io(&ctx, Some(100)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Value::Int4(200));
        assert_eq!(table.rows[1][0], Value::Int4(201));
        assert_eq!(table.rows[0][1], Value::Numeric(4096));
        assert_eq!(table.rows[0][5], Value::Numeric(8192));
    }

    #[test]
    fn test_pid_stat_command_names() {
        let (_tmp, ctx) = proc_context();
        let table = pid_stat(&ctx, Some(100)).unwrap();
        assert_eq!(table.columns.len(), 52);
        assert_eq!(table.rows[0][1], Value::Text("postgres: checkpointer".into()));
        assert_eq!(table.rows[1][1], Value::Text("postgres: (walwriter)".into()));
        assert_eq!(
            table.rows[0][24],
            Value::Numeric(18_446_744_073_709_551_615)
        );
    }

    #[test]
    fn test_pid_cmdline() {
        let (tmp, ctx) = proc_context();
        let table = pid_cmdline(&ctx, Some(100)).unwrap();
        let uid = fs::metadata(tmp.path().join("proc/200")).unwrap().uid();

        assert_eq!(table.rows[0][0], Value::Int4(200));
        assert_eq!(table.rows[0][1], Value::Text("postgres -D /pgdata".into()));
        assert_eq!(table.rows[0][2], Value::Int4(uid as i32));
        assert!(matches!(table.rows[0][3], Value::Text(_) | Value::Null));
    }

    #[test]
    fn test_pid_cmdline_with_invalid_utf8() {
        let (tmp, ctx) = proc_context();
        fs::write(tmp.path().join("proc/201/cmdline"), b"postgres\0\xff\xfe\0").unwrap();
        let table = pid_cmdline(&ctx, Some(100)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[1][1],
            Value::Text("postgres \u{FFFD}\u{FFFD}".into())
        );
    }

    #[test]
    fn test_no_children_is_no_data() {
        let (tmp, ctx) = proc_context();
        fs::create_dir_all(tmp.path().join("proc/300/task/300")).unwrap();
        fs::write(tmp.path().join("proc/300/task/300/children"), "").unwrap();
        assert!(matches!(
            pid_io(&ctx, Some(300)).unwrap_err(),
            Error::NoData { .. }
        ));
    }

    #[test]
    fn test_disabled_proc_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            cgroup_enabled: false,
            kdapi_enabled: false,
            proc_root: tmp.path().join("absent"),
            ..Config::default()
        };
        let ctx = Context::init(&config);
        assert!(loadavg(&ctx).unwrap().is_empty());
        assert!(pid_stat(&ctx, Some(1)).unwrap().is_empty());
        assert_eq!(diskstats(&ctx).unwrap().columns.len(), 20);
    }
}
