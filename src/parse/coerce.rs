//! Token to typed value conversion.
//!
//! Integer and float conversions accept the cgroup `max` sentinel, which
//! stands in for an unbounded limit.

use super::CoerceError;

const MAX_SENTINEL: &str = "max";

fn invalid(value: &str, target: &'static str) -> CoerceError {
    CoerceError::Invalid {
        value: value.to_owned(),
        target,
    }
}

/// Parses a base-10 64-bit integer. `max` (any case) maps to [`i64::MAX`].
pub fn to_int64(token: &str) -> Result<i64, CoerceError> {
    if token.eq_ignore_ascii_case(MAX_SENTINEL) {
        return Ok(i64::MAX);
    }
    token.parse().map_err(|_| invalid(token, "bigint"))
}

/// Parses a double. `max` (any case) maps to [`f64::MAX`].
pub fn to_float64(token: &str) -> Result<f64, CoerceError> {
    if token.eq_ignore_ascii_case(MAX_SENTINEL) {
        return Ok(f64::MAX);
    }
    token.parse().map_err(|_| invalid(token, "double precision"))
}

pub fn to_int32(token: &str) -> Result<i32, CoerceError> {
    token.parse().map_err(|_| invalid(token, "integer"))
}

/// Parses an integer counter that may exceed the signed 64-bit range.
pub fn to_numeric(token: &str) -> Result<i128, CoerceError> {
    token.parse().map_err(|_| invalid(token, "numeric"))
}

// Fraction digits beyond this do not change the rounded byte count.
const MAX_FRACTION_DIGITS: usize = 18;

/// Converts a human readable size such as `"1024", "kB"` into bytes.
///
/// Units are matched case-insensitively and are powers of 1024. The value
/// may carry a sign and a fractional part; the product is rounded half away
/// from zero. An empty unit means the value is already in bytes.
pub fn human_size_to_bytes(value: &str, unit: &str) -> Result<i64, CoerceError> {
    let multiplier: i128 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "bytes" => 1,
        "kb" => 1 << 10,
        "mb" => 1 << 20,
        "gb" => 1 << 30,
        "tb" => 1 << 40,
        "pb" => 1 << 50,
        _ => return Err(CoerceError::UnknownUnit(unit.trim().to_owned())),
    };

    let size_err = || CoerceError::InvalidSize(format!("{value} {unit}").trim().to_owned());

    let value = value.trim();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(size_err());
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(size_err());
    }

    let out_of_range = || CoerceError::OutOfRange(format!("{value} {unit}").trim().to_owned());

    let whole: i128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| out_of_range())?
    };
    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let fraction_bytes = if fraction.is_empty() {
        0
    } else {
        let scale = 10i128.pow(fraction.len() as u32);
        let numerator: i128 = fraction.parse().map_err(|_| size_err())?;
        (numerator * multiplier + scale / 2) / scale
    };

    let magnitude = whole
        .checked_mul(multiplier)
        .and_then(|b| b.checked_add(fraction_bytes))
        .ok_or_else(out_of_range)?;
    let bytes = if negative { -magnitude } else { magnitude };

    i64::try_from(bytes).map_err(|_| out_of_range())
}
