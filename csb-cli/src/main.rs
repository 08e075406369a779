//! CSB CLI - Command line tool for California superbloom NDVI and climate data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "csb-cli",
    version,
    about = "California superbloom NDVI toolkit"
)]
struct Cli {
    #[command(flatten)]
    options: csb_cmd::Options,

    #[command(subcommand)]
    command: csb_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("{:?}", cli.options);
    csb_cmd::run(cli.options, cli.command).await
}
