use anyhow::Result;
use clap::Parser;

use vault2org_cli::{cli::Cli, convert, logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level());

    convert::execute(&cli)
}
