//! Column signatures of every query result.
use super::ColumnType::{self, Float8, Int4, Int8, Numeric, Text};

pub const TEXT: &[ColumnType] = &[Text];
pub const INT8: &[ColumnType] = &[Int8];
pub const NUMERIC: &[ColumnType] = &[Numeric];
pub const TEXT_TEXT: &[ColumnType] = &[Text, Text];
pub const TEXT_INT8: &[ColumnType] = &[Text, Int8];
pub const TEXT_TEXT_INT8: &[ColumnType] = &[Text, Text, Int8];
pub const TEXT_TEXT_FLOAT8: &[ColumnType] = &[Text, Text, Float8];

pub const DISKSTATS: &[ColumnType] = &[
    Int8, Int8, Text, //
    Numeric, Numeric, Numeric, Int8, //
    Numeric, Numeric, Numeric, Int8, //
    Int8, Int8, Int8, //
    Numeric, Numeric, Numeric, Int8, //
    Numeric, Int8,
];

pub const MOUNTINFO: &[ColumnType] = &[Int8, Int8, Int8, Int8, Text, Text, Text, Text, Text, Text];

pub const NET_DEV: &[ColumnType] = &[
    Text, //
    Int8, Int8, Int8, Int8, Int8, Int8, Int8, Int8, //
    Int8, Int8, Int8, Int8, Int8, Int8, Int8, Int8,
];

pub const CPUTIME: &[ColumnType] = &[Int8, Int8, Int8, Int8, Int8];

pub const LOADAVG: &[ColumnType] = &[Float8, Float8, Float8, Int4];

pub const PID_IO: &[ColumnType] = &[
    Int4, Numeric, Numeric, Numeric, Numeric, Numeric, Numeric, Numeric,
];

pub const PID_CMDLINE: &[ColumnType] = &[Int4, Text, Int4, Text];

pub const FSINFO: &[ColumnType] = &[
    Numeric, Numeric, Text, //
    Numeric, Numeric, Numeric, Numeric, Numeric, Numeric, Numeric, //
    Numeric, Numeric, Text,
];

pub const PID_STAT: &[ColumnType] = &[
    Int4, Text, Text, //
    Int4, Int4, Int4, Int4, //
    Int4, Int8, Numeric, Numeric, //
    Numeric, Numeric, Numeric, Numeric, //
    Int8, Int8, Int8, Int8, //
    Int8, Int8, Numeric, Numeric, //
    Int8, Numeric, Numeric, Numeric, //
    Numeric, Numeric, Numeric, Numeric, //
    Numeric, Numeric, Numeric, Numeric, //
    Numeric, Numeric, Int4, Int4, //
    Int8, Int8, Numeric, Numeric, //
    Int8, Numeric, Numeric, Numeric, //
    Numeric, Numeric, Numeric, Numeric, //
    Int4,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_signature_widths() {
        assert_eq!(DISKSTATS.len(), 20);
        assert_eq!(MOUNTINFO.len(), 10);
        assert_eq!(NET_DEV.len(), 17);
        assert_eq!(PID_IO.len(), 8);
        assert_eq!(PID_STAT.len(), 52);
        assert_eq!(FSINFO.len(), 13);
    }
}
