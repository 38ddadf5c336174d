//! Queries answered by system calls.
use std::path::Path;

use crate::context::Context;
use crate::host;
use crate::table::{Availability, TypedTable, Value, assemble, signature};
use crate::Result;

/// Device, capacity and mount flags of the filesystem holding `path`.
///
/// Shares the `/proc` switch: disabled means an empty table.
pub fn fsinfo(ctx: &Context, path: &Path) -> Result<TypedTable> {
    if !ctx.proc_enabled() {
        return assemble(Vec::new(), signature::FSINFO, Availability::Disabled);
    }
    let info = host::fs_info(path)?;
    log::trace!("Filesystem of {}: {:?}", path.display(), info);
    assemble(vec![info.to_row()], signature::FSINFO, Availability::Enabled(path))
}

pub fn pages_to_bytes(pages: i64) -> Result<Value> {
    Ok(Value::Numeric(host::pages_to_bytes(pages)?))
}
