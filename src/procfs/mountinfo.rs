//! Mountinfo line parser for Linux systems.
//!
//! Parses lines in `/proc/[pid]/mountinfo` format. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html)
//! for details on the structure.

use crate::parse::tokens::{lines, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

/// Represents a parsed mountinfo line.
#[derive(Debug, PartialEq, Eq)]
pub struct MountInfo<'a> {
    /// Mount ID field.
    pub mount_id: &'a str,
    /// Parent mount ID field.
    pub parent_id: &'a str,
    /// Major:Minor device identifier.
    pub major_minor: &'a str,
    /// Root of the mount within the filesystem.
    pub root: &'a str,
    /// Mount point relative to the process's root.
    pub mount_point: &'a str,
    /// Per mount options.
    pub mount_options: &'a str,
    /// Optional `tag[:value]` fields (can be empty).
    pub optional_fields: Vec<&'a str>,
    /// Filesystem type (e.g., `ext4`, `cgroup2`).
    pub fs_type: &'a str,
    /// Source of the mount (e.g., device).
    pub source: &'a str,
    /// Superblock options.
    pub super_options: &'a str,
}

/// Named fields in a mountinfo line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountInfoField {
    MountId,
    ParentId,
    MajorMinor,
    Root,
    MountPoint,
    MountOptions,
    FsType,
    Source,
    SuperOptions,
}

impl std::fmt::Display for MountInfoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MountInfoField::MountId => "mount_id",
            MountInfoField::ParentId => "parent_id",
            MountInfoField::MajorMinor => "major:minor",
            MountInfoField::Root => "root",
            MountInfoField::MountPoint => "mount_point",
            MountInfoField::MountOptions => "mount_options",
            MountInfoField::FsType => "fs_type",
            MountInfoField::Source => "source",
            MountInfoField::SuperOptions => "super_options",
        };
        write!(f, "{name}")
    }
}

/// Errors that may occur when parsing a mountinfo line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum MountInfoError {
    #[error("missing separator ` - ` in line: `{0}`")]
    MissingSeparator(String),

    #[error("missing `{field}` in pre-separator section of line: `{line}`")]
    MissingPreSeparatorField { field: MountInfoField, line: String },

    #[error("missing `{field}` in post-separator section of line: `{line}`")]
    MissingPostSeparatorField { field: MountInfoField, line: String },
}

/// Parses a single line of mountinfo data.
///
/// This function performs zero-allocation parsing except for collecting optional fields.
///
/// # Errors
///
/// Returns [`MountInfoError`] variants for missing separator or required fields.
pub fn parse_mount_info_line(line: &str) -> Result<MountInfo<'_>, MountInfoError> {
    let line = line.trim_end_matches('\n');
    let (pre, post) = line
        .split_once(" - ")
        .ok_or_else(|| MountInfoError::MissingSeparator(line.to_owned()))?;

    let mut pre_fields = pre.split_whitespace();
    let mut next_pre = |field| {
        pre_fields
            .next()
            .ok_or_else(|| MountInfoError::MissingPreSeparatorField {
                field,
                line: line.to_owned(),
            })
    };
    let mount_id = next_pre(MountInfoField::MountId)?;
    let parent_id = next_pre(MountInfoField::ParentId)?;
    let major_minor = next_pre(MountInfoField::MajorMinor)?;
    let root = next_pre(MountInfoField::Root)?;
    let mount_point = next_pre(MountInfoField::MountPoint)?;
    let mount_options = next_pre(MountInfoField::MountOptions)?;
    let optional_fields: Vec<&str> = pre_fields.collect();

    let mut post_fields = post.split_whitespace();
    let mut next_post = |field| {
        post_fields
            .next()
            .ok_or_else(|| MountInfoError::MissingPostSeparatorField {
                field,
                line: line.to_owned(),
            })
    };
    let fs_type = next_post(MountInfoField::FsType)?;
    let source = next_post(MountInfoField::Source)?;
    let super_options = next_post(MountInfoField::SuperOptions)?;

    Ok(MountInfo {
        mount_id,
        parent_id,
        major_minor,
        root,
        mount_point,
        mount_options,
        optional_fields,
        fs_type,
        source,
        super_options,
    })
}

const MIN_TOKENS: usize = 10;

/// Shapes `/proc/self/mountinfo` into ten columns: mount id, parent id,
/// major, minor, root, mount point, mount options, fs type, source and
/// super options. Optional fields are dropped.
pub fn parse(content: &str) -> Result<Vec<Row>, ParseError> {
    lines(content)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let lineno = idx + 1;
            let ntok = tokens(line).len();
            if ntok < MIN_TOKENS {
                return Err(ParseError::TokenCount {
                    line: lineno,
                    expected: Arity::AtLeast(MIN_TOKENS),
                    actual: ntok,
                });
            }

            let mi = parse_mount_info_line(line).map_err(|source| ParseError::Mountinfo {
                line: lineno,
                source,
            })?;
            let (major, minor) =
                mi.major_minor
                    .split_once(':')
                    .ok_or(ParseError::MissingDelimiter {
                        line: lineno,
                        delimiter: ':',
                    })?;

            Ok(vec![
                Cell::from(mi.mount_id),
                Cell::from(mi.parent_id),
                Cell::from(major),
                Cell::from(minor),
                Cell::from(mi.root),
                Cell::from(mi.mount_point),
                Cell::from(mi.mount_options),
                Cell::from(mi.fs_type),
                Cell::from(mi.source),
                Cell::from(mi.super_options),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CGROUP2: &str = "35 24 0:30 / /sys/fs/cgroup rw,nosuid,nodev,noexec,relatime shared:9 - cgroup2 cgroup2 rw,nsdelegate,memory_recursiveprot";

    fn texts(row: &Row) -> Vec<&str> {
        row.iter()
            .map(|cell| match cell {
                Cell::Token(t) => t.as_str(),
                other => panic!("unexpected cell: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_line_fields() {
        assert_eq!(
            parse_mount_info_line(CGROUP2).unwrap(),
            MountInfo {
                mount_id: "35",
                parent_id: "24",
                major_minor: "0:30",
                root: "/",
                mount_point: "/sys/fs/cgroup",
                mount_options: "rw,nosuid,nodev,noexec,relatime",
                optional_fields: vec!["shared:9"],
                fs_type: "cgroup2",
                source: "cgroup2",
                super_options: "rw,nsdelegate,memory_recursiveprot",
            }
        );
    }

    #[test]
    fn test_line_without_optional_fields() {
        let mi = parse_mount_info_line("1018 1017 0:94 / / ro,relatime - overlay overlay rw\n")
            .unwrap();
        assert_eq!(mi.mount_options, "ro,relatime");
        assert!(mi.optional_fields.is_empty());
        assert_eq!(mi.super_options, "rw");
    }

    #[test]
    fn test_rows_drop_every_optional_field() {
        let content = "\
36 35 98:0 /mnt1 /mnt2 rw,noatime master:1 - ext3 /dev/root rw,errors=continue
71 36 0:50 / /data rw,relatime shared:7 master:1 propagate_from:2 unbindable - xfs /dev/vdb rw,attr2
";
        let rows = parse(content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            texts(&rows[0]),
            vec![
                "36",
                "35",
                "98",
                "0",
                "/mnt1",
                "/mnt2",
                "rw,noatime",
                "ext3",
                "/dev/root",
                "rw,errors=continue",
            ]
        );
        assert_eq!(
            texts(&rows[1]),
            vec![
                "71",
                "36",
                "0",
                "50",
                "/",
                "/data",
                "rw,relatime",
                "xfs",
                "/dev/vdb",
                "rw,attr2",
            ]
        );
    }

    #[test]
    fn test_rows_keep_escaped_mount_points() {
        let rows = parse("90 35 0:60 / /mnt/my\\040disk rw - tmpfs tmpfs rw,size=1024k\n").unwrap();
        assert_eq!(texts(&rows[0])[5], "/mnt/my\\040disk");
        assert_eq!(texts(&rows[0])[6], "rw");
    }

    #[test]
    fn test_line_missing_mount_options() {
        let line = "36 35 98:0 /mnt1 /mnt2 - ext3 /dev/root rw";
        assert_eq!(
            parse_mount_info_line(line).unwrap_err(),
            MountInfoError::MissingPreSeparatorField {
                field: MountInfoField::MountOptions,
                line: line.to_owned(),
            }
        );
    }

    #[test]
    fn test_line_missing_super_options() {
        let line = "36 35 98:0 /mnt1 /mnt2 rw,noatime - ext3 /dev/root";
        let err = parse_mount_info_line(line).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("missing `super_options` in post-separator section of line: `{line}`")
        );
    }

    #[test]
    fn test_rows_report_line_without_separator() {
        let content = format!("{CGROUP2}\n36 35 98:0 /mnt1 /mnt2 rw,noatime master:1 ext3 /dev/root rw\n");
        match parse(&content).unwrap_err() {
            ParseError::Mountinfo { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(source, MountInfoError::MissingSeparator(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rows_reject_short_lines() {
        assert_eq!(
            parse("25 1 0:24 / /proc - proc proc\n").unwrap_err(),
            ParseError::TokenCount {
                line: 1,
                expected: Arity::AtLeast(MIN_TOKENS),
                actual: 8
            }
        );
    }

    #[test]
    fn test_rows_reject_device_without_colon() {
        assert_eq!(
            parse("25 1 024 / /proc rw - proc proc rw\n").unwrap_err(),
            ParseError::MissingDelimiter {
                line: 1,
                delimiter: ':'
            }
        );
    }
}
