//! Queries over the current process's cgroup files.
use std::path::PathBuf;

use crate::context::Context;
use crate::fsutil;
use crate::parse::FormatKind;
use crate::table::{Availability, Cell, ColumnType, TypedTable, Value, assemble, signature};
use crate::Result;

use super::{first_value, read_table};

/// Validates `filename` and resolves it, or `None` while cgroups are disabled.
fn resolve(ctx: &Context, filename: &str) -> Result<Option<PathBuf>> {
    fsutil::check_relative_filename(filename)?;
    let state = ctx.cgroup();
    if !state.is_enabled() {
        return Ok(None);
    }
    state.file_path(filename).map(Some)
}

/// Current cgroup mode. Never fails.
pub fn mode(ctx: &Context) -> Value {
    Value::Text(ctx.cgroup_mode().as_str().to_owned())
}

/// One `(controller, path)` row per path table entry.
pub fn path(ctx: &Context) -> Result<TypedTable> {
    let state = ctx.cgroup();
    if !state.is_enabled() {
        return assemble(Vec::new(), signature::TEXT_TEXT, Availability::Disabled);
    }

    let rows = state
        .paths()
        .iter()
        .map(|(controller, path)| {
            vec![
                Cell::from(controller),
                Cell::from(path.to_string_lossy().into_owned()),
            ]
        })
        .collect();
    assemble(rows, signature::TEXT_TEXT, Availability::Enabled(state.root()))
}

/// Number of distinct processes in the default cgroup.
pub fn process_count(ctx: &Context) -> Result<Value> {
    let state = ctx.cgroup();
    if !state.is_enabled() {
        return Ok(Value::Null);
    }
    let count = state.member_pids()?.len();
    Ok(Value::Int4(i32::try_from(count).unwrap_or(i32::MAX)))
}

/// Single value of a one-line file.
pub fn scalar(ctx: &Context, filename: &str, ty: ColumnType) -> Result<Value> {
    let Some(path) = resolve(ctx, filename)? else {
        return Ok(Value::Null);
    };
    read_table(&path, FormatKind::Scalar(ty)).map(first_value)
}

/// Space separated values of a one-line file as one array. An empty line is `NULL`.
pub fn array(ctx: &Context, filename: &str, ty: ColumnType) -> Result<Value> {
    let Some(path) = resolve(ctx, filename)? else {
        return Ok(Value::Null);
    };
    let value = match read_table(&path, FormatKind::ArraySeparated(ty)).map(first_value)? {
        Value::TextArray(items) if items.is_empty() => Value::Null,
        Value::Int8Array(items) if items.is_empty() => Value::Null,
        other => other,
    };
    Ok(value)
}

/// Multi-row file in the given format.
pub fn table(ctx: &Context, filename: &str, format: FormatKind) -> Result<TypedTable> {
    match resolve(ctx, filename)? {
        Some(path) => read_table(&path, format),
        None => assemble(Vec::new(), format.signature(), Availability::Disabled),
    }
}
