use clap::Parser;
use divvy_processor::cli::{run, Cli};
use divvy_processor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
