use anyhow::Result;
use clap::Parser;

mod cli;
mod delivery;
mod gitio;
mod jira;
mod logging;
mod model;
mod pipeline;
mod release;
mod render;
mod slack;
mod tickets;
mod transform;
mod util;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  logging::init_tracing(cli.log_json);

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: run the pipeline; nothing is delivered unless every stage succeeds
  let delivered = pipeline::generate(&cfg)?;
  print!("{}", delivered.to_stdout()?);
  Ok(())
}
