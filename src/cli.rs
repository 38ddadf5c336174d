//! CLI arguments and subcommands for nodemx.
//!
//! Every subcommand maps onto exactly one [`Query`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::context::Config;
use crate::query::Query;
use crate::table::ColumnType;

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "nodemx",
    about = "Typed tables from cgroup, /proc and Kubernetes Downward API files",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Expected result columns, e.g. `text,int8`; checked before reading
    #[arg(long, value_delimiter = ',')]
    pub expect: Option<Vec<ColumnType>>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,

    /// Override the cgroup root (default from NODEMX_CGROUP_ROOT)
    #[arg(long)]
    pub cgroup_root: Option<PathBuf>,

    /// Override the Downward API root (default from NODEMX_KDAPI_PATH)
    #[arg(long)]
    pub kdapi_path: Option<PathBuf>,

    /// Override the /proc root (default from NODEMX_PROC_ROOT)
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Force the containerized path mapping on or off
    #[arg(long)]
    pub containerized: Option<bool>,
}

impl Args {
    /// Applies command line overrides on top of `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(root) = &self.cgroup_root {
            config.cgroup_root = root.clone();
        }
        if let Some(path) = &self.kdapi_path {
            config.kdapi_path = path.clone();
        }
        if let Some(root) = &self.proc_root {
            config.proc_root = root.clone();
        }
        if self.containerized.is_some() {
            config.containerized = self.containerized;
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Detected cgroup mode: legacy, unified or disabled
    CgroupMode,
    /// Controller to cgroup directory mapping
    CgroupPath,
    /// Number of distinct processes in this cgroup
    CgroupProcessCount,
    /// One-line cgroup file as bigint ("max" maps to the largest value)
    CgroupScalarBigint { filename: String },
    /// One-line cgroup file as double precision
    CgroupScalarFloat8 { filename: String },
    /// One-line cgroup file as text
    CgroupScalarText { filename: String },
    /// One bigint per line, or per value of a one-line file
    CgroupSetofBigint { filename: String },
    /// One text value per line, or per value of a one-line file
    CgroupSetofText { filename: String },
    /// Space separated values of a one-line file as bigint[]
    CgroupArrayBigint { filename: String },
    /// Space separated values of a one-line file as text[]
    CgroupArrayText { filename: String },
    /// Flat keyed file: `<key> <value>`
    CgroupSetofKv { filename: String },
    /// Key/subkey/value file; two-token lines get the key "all"
    CgroupSetofKsv { filename: String },
    /// Nested keyed file: `<key> <subkey>=<value> ...`
    CgroupSetofNkv { filename: String },
    /// Downward API `key="value"` file
    KdapiSetofKv { filename: String },
    /// One-line Downward API file as bigint
    KdapiScalarBigint { filename: String },
    /// Environment variable as text
    EnvvarText { name: String },
    /// Environment variable as bigint
    EnvvarBigint { name: String },
    /// /proc/diskstats
    ProcDiskstats,
    /// /proc/self/mountinfo
    ProcMountinfo,
    /// /proc/meminfo in bytes
    ProcMeminfo,
    /// /proc/net/dev
    ProcNetworkStats,
    /// CPU times from /proc/stat
    ProcCputime,
    /// /proc/loadavg
    ProcLoadavg,
    /// /proc/<pid>/io for every child of a parent pid
    ProcPidIo {
        /// Parent pid (default: parent of this process)
        #[arg(long)]
        ppid: Option<u32>,
    },
    /// Command line and owner of every child of a parent pid
    ProcPidCmdline {
        #[arg(long)]
        ppid: Option<u32>,
    },
    /// /proc/<pid>/stat for every child of a parent pid
    ProcPidStat {
        #[arg(long)]
        ppid: Option<u32>,
    },
    /// Device, capacity and mount flags of the filesystem holding a path
    Fsinfo { path: PathBuf },
    /// Converts a number of kernel pages to bytes
    PagesToBytes {
        #[arg(allow_negative_numbers = true)]
        pages: i64,
    },
}

impl From<Commands> for Query {
    fn from(command: Commands) -> Self {
        match command {
            Commands::CgroupMode => Query::CgroupMode,
            Commands::CgroupPath => Query::CgroupPath,
            Commands::CgroupProcessCount => Query::CgroupProcessCount,
            Commands::CgroupScalarBigint { filename } => Query::CgroupScalarBigint(filename),
            Commands::CgroupScalarFloat8 { filename } => Query::CgroupScalarFloat8(filename),
            Commands::CgroupScalarText { filename } => Query::CgroupScalarText(filename),
            Commands::CgroupSetofBigint { filename } => Query::CgroupSetofBigint(filename),
            Commands::CgroupSetofText { filename } => Query::CgroupSetofText(filename),
            Commands::CgroupArrayBigint { filename } => Query::CgroupArrayBigint(filename),
            Commands::CgroupArrayText { filename } => Query::CgroupArrayText(filename),
            Commands::CgroupSetofKv { filename } => Query::CgroupSetofKv(filename),
            Commands::CgroupSetofKsv { filename } => Query::CgroupSetofKsv(filename),
            Commands::CgroupSetofNkv { filename } => Query::CgroupSetofNkv(filename),
            Commands::KdapiSetofKv { filename } => Query::KdapiSetofKv(filename),
            Commands::KdapiScalarBigint { filename } => Query::KdapiScalarBigint(filename),
            Commands::EnvvarText { name } => Query::EnvvarText(name),
            Commands::EnvvarBigint { name } => Query::EnvvarBigint(name),
            Commands::ProcDiskstats => Query::ProcDiskstats,
            Commands::ProcMountinfo => Query::ProcMountinfo,
            Commands::ProcMeminfo => Query::ProcMeminfo,
            Commands::ProcNetworkStats => Query::ProcNetworkStats,
            Commands::ProcCputime => Query::ProcCputime,
            Commands::ProcLoadavg => Query::ProcLoadavg,
            Commands::ProcPidIo { ppid } => Query::ProcPidIo(ppid),
            Commands::ProcPidCmdline { ppid } => Query::ProcPidCmdline(ppid),
            Commands::ProcPidStat { ppid } => Query::ProcPidStat(ppid),
            Commands::Fsinfo { path } => Query::Fsinfo(path),
            Commands::PagesToBytes { pages } => Query::PagesToBytes(pages),
        }
    }
}
