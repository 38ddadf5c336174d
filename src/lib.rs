/// nodemx: typed tables from kernel virtual files.
///
/// Reads cgroup (v1 and v2), `/proc` and Kubernetes Downward API files,
/// parses their line formats and returns rows whose column types match a
/// fixed signature per query. A few host facts (filesystem capacity, page
/// size) come from system calls instead.
pub mod cgroup;
pub mod cli;
pub mod context;
pub mod environment;
pub mod error;
pub mod fsutil;
pub mod host;
pub mod parse;
pub mod procfs;
pub mod query;
pub mod table;

pub use context::{Config, Context};
pub use error::{Error, Result};
pub use query::{Query, QueryResult};

/// Runs one query from the command line and prints the result as JSON.
///
/// # Errors
///
/// Returns an error if the query fails or the result cannot be serialized.
pub fn run(args: cli::Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = args.apply(Config::from_env());
    log::debug!("Effective config: {:?}", config);
    let ctx = Context::init(&config);

    let query = Query::from(args.command);
    let result = query.execute(&ctx, args.expect.as_deref())?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{out}");
    Ok(())
}
