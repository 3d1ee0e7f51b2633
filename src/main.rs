//! lintpipe CLI: analyze a directory (or a cloned repository), optionally fix and push.

use anyhow::Result;
use clap::Parser;
use lintpipe::engine::arg_parser::Cli;
use lintpipe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
