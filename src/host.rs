//! Host facts read through system calls rather than virtual files.
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::stat::{major, minor};
use nix::sys::statfs::statfs;
use nix::sys::statvfs::{FsFlags, statvfs};
use nix::unistd::{SysconfVar, sysconf};

use crate::table::{Cell, Row};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("stat error on path `{path}`: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{call} error on path `{path}`: {source}")]
    Statfs {
        call: &'static str,
        path: PathBuf,
        #[source]
        source: Errno,
    },

    #[error("sysconf(PAGE_SIZE) failed: {0}")]
    Sysconf(#[source] Errno),

    #[error("page size is not reported by this system")]
    PageSizeUnknown,
}

/// Filesystem magic numbers from `linux/magic.h`. Magics shared by several
/// filesystems report the first name.
const MAGIC_NAMES: &[(u32, &str)] = &[
    (0xadf5, "adfs"),
    (0xadff, "affs"),
    (0x5346_414f, "afs"),
    (0x0904_1934, "anon_inode_fs"),
    (0x0187, "autofs"),
    (0x6264_6576, "bdevfs"),
    (0x4249_4e4d, "binfmtfs"),
    (0xcafe_4a11, "bpf_fs"),
    (0x9123_683e, "btrfs"),
    (0x7372_7279, "btrfs_test"),
    (0x0027_e0eb, "cgroup"),
    (0x6367_7270, "cgroup2"),
    (0x7375_7245, "coda"),
    (0x28cd_3d45, "cramfs"),
    (0x6462_6720, "debugfs"),
    (0x1cd1, "devpts"),
    (0xf15f, "ecryptfs"),
    (0xde5e_81e4, "efivarfs"),
    (0x0041_4a53, "efs"),
    (0xef53, "ext2"),
    (0xf2f5_2010, "f2fs"),
    (0x0bad_1dea, "futexfs"),
    (0x00c0_ffee, "hostfs"),
    (0xf995_e849, "hpfs"),
    (0x9584_58f6, "hugetlbfs"),
    (0x9660, "isofs"),
    (0x72b6, "jffs2"),
    (0x137f, "minix"),
    (0x138f, "minix12"),
    (0x2468, "minix2"),
    (0x2478, "minix22"),
    (0x4d5a, "minix3"),
    (0x4d44, "msdos"),
    (0x1130_7854, "mtd_inode_fs"),
    (0x564c, "ncp"),
    (0x6969, "nfs"),
    (0x3434, "nilfs"),
    (0x9fa1, "openprom"),
    (0x794c_7630, "overlayfs"),
    (0x5049_5045, "pipefs"),
    (0x9fa0, "proc"),
    (0x6165_676c, "pstorefs"),
    (0x002f, "qnx4"),
    (0x6819_1122, "qnx6"),
    (0x8584_58f6, "ramfs"),
    (0x5265_4973, "reiserfs"),
    (0x7363_6673, "securityfs"),
    (0xf97c_ff8c, "selinux"),
    (0x4341_5d53, "smack"),
    (0x517b, "smb"),
    (0x534f_434b, "sockfs"),
    (0x7371_7368, "squashfs"),
    (0x6265_6572, "sysfs"),
    (0x0102_1994, "tmpfs"),
    (0x9fa2, "usbdevice"),
    (0x0102_1997, "v9fs"),
    (0xabba_1974, "xenfs"),
    (0x5846_5342, "xfs"),
];

/// Mount flags in the order they are rendered.
const MOUNT_FLAGS: &[(FsFlags, &str)] = &[
    (FsFlags::ST_MANDLOCK, "mandlock"),
    (FsFlags::ST_NOATIME, "noatime"),
    (FsFlags::ST_NODEV, "nodev"),
    (FsFlags::ST_NODIRATIME, "nodiratime"),
    (FsFlags::ST_NOEXEC, "noexec"),
    (FsFlags::ST_NOSUID, "nosuid"),
    (FsFlags::ST_RDONLY, "rdonly"),
    (FsFlags::ST_RELATIME, "relatime"),
    (FsFlags::ST_SYNCHRONOUS, "synchronous"),
];

/// Device, capacity and mount flags of the filesystem holding a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsInfo {
    pub major: u64,
    pub minor: u64,
    pub fs_type: &'static str,
    pub block_size: u64,
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_available: u64,
    pub files: u64,
    pub files_free: u64,
    pub flags: FsFlags,
}

impl FsInfo {
    /// Thirteen columns: major, minor, type, block size, then total, free
    /// and available space each as blocks and bytes, inodes, free inodes
    /// and mount flags.
    pub fn to_row(&self) -> Row {
        let bytes = |blocks: u64| blocks.saturating_mul(self.block_size).to_string();
        vec![
            Cell::from(self.major.to_string()),
            Cell::from(self.minor.to_string()),
            Cell::from(self.fs_type),
            Cell::from(self.block_size.to_string()),
            Cell::from(self.blocks.to_string()),
            Cell::from(bytes(self.blocks)),
            Cell::from(self.blocks_free.to_string()),
            Cell::from(bytes(self.blocks_free)),
            Cell::from(self.blocks_available.to_string()),
            Cell::from(bytes(self.blocks_available)),
            Cell::from(self.files.to_string()),
            Cell::from(self.files_free.to_string()),
            Cell::from(mount_flags(self.flags)),
        ]
    }
}

/// Name of a filesystem magic number, `"unknown"` if not listed.
pub fn magic_name(magic: u32) -> &'static str {
    MAGIC_NAMES
        .iter()
        .find(|(id, _)| *id == magic)
        .map_or("unknown", |(_, name)| name)
}

/// Comma separated names of the set flags, `"none"` if no listed flag is set.
pub fn mount_flags(flags: FsFlags) -> String {
    let names: Vec<&str> = MOUNT_FLAGS
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        "none".to_owned()
    } else {
        names.join(",")
    }
}

/// Stats `path` and the filesystem it lives on.
///
/// # Errors
///
/// Returns a [`HostError`] if `stat`, `statfs` or `statvfs` fails.
pub fn fs_info(path: &Path) -> Result<FsInfo, HostError> {
    let dev = std::fs::metadata(path)
        .map_err(|source| HostError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .dev();
    let syscall_err = |call: &'static str| {
        move |source: Errno| HostError::Statfs {
            call,
            path: path.to_path_buf(),
            source,
        }
    };
    let fs = statfs(path).map_err(syscall_err("statfs"))?;
    let vfs = statvfs(path).map_err(syscall_err("statvfs"))?;

    // The magic is a 32-bit value stored in a platform-sized word.
    let magic = fs.filesystem_type().0 as u32;

    Ok(FsInfo {
        major: major(dev),
        minor: minor(dev),
        fs_type: magic_name(magic),
        block_size: u64::from(vfs.block_size()),
        blocks: u64::from(vfs.blocks()),
        blocks_free: u64::from(vfs.blocks_free()),
        blocks_available: u64::from(vfs.blocks_available()),
        files: u64::from(vfs.files()),
        files_free: u64::from(vfs.files_free()),
        flags: vfs.flags(),
    })
}

/// Size of a kernel memory page in bytes.
///
/// # Errors
///
/// Returns a [`HostError`] if `sysconf` fails or reports no value.
pub fn page_size() -> Result<u64, HostError> {
    let size = sysconf(SysconfVar::PAGE_SIZE)
        .map_err(HostError::Sysconf)?
        .ok_or(HostError::PageSizeUnknown)?;
    u64::try_from(size).map_err(|_| HostError::PageSizeUnknown)
}

/// Converts a count of kernel pages into bytes.
///
/// # Errors
///
/// Returns a [`HostError`] if the page size cannot be determined.
pub fn pages_to_bytes(pages: i64) -> Result<i128, HostError> {
    Ok(i128::from(pages) * i128::from(page_size()?))
}
