use clap::Parser;

/// Entry point for the nodemx command line tool.
///
/// Builds the context from `NODEMX_*` environment variables and command line
/// overrides, runs one query and prints it as JSON.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug nodemx --expect text,int8 cgroup-setof-kv memory.stat
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = nodemx::cli::Args::parse();
    nodemx::run(args)
}
