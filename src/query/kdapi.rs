//! Queries over Kubernetes Downward API files.
use std::path::PathBuf;

use crate::context::Context;
use crate::fsutil;
use crate::parse::FormatKind;
use crate::table::{Availability, ColumnType, TypedTable, Value, assemble};
use crate::Result;

use super::{first_value, read_table};

fn resolve(ctx: &Context, filename: &str) -> Result<Option<PathBuf>> {
    fsutil::check_relative_filename(filename)?;
    if !ctx.kdapi_enabled() {
        return Ok(None);
    }
    Ok(Some(fsutil::resolve_under(ctx.kdapi_path(), filename)?))
}

/// `key="value"` lines such as `labels` or `annotations`, values unquoted.
pub fn setof_kv(ctx: &Context, filename: &str) -> Result<TypedTable> {
    match resolve(ctx, filename)? {
        Some(path) => read_table(&path, FormatKind::KeyEqualsQuoted),
        None => assemble(
            Vec::new(),
            FormatKind::KeyEqualsQuoted.signature(),
            Availability::Disabled,
        ),
    }
}

/// Single integer of a one-line file such as `cpu_limit`.
pub fn scalar_bigint(ctx: &Context, filename: &str) -> Result<Value> {
    let Some(path) = resolve(ctx, filename)? else {
        return Ok(Value::Null);
    };
    read_table(&path, FormatKind::Scalar(ColumnType::Int8)).map(first_value)
}
