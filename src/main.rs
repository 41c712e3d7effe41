use anyhow::Result;
use clap::Parser;

mod account;
mod cli;
mod codec;
mod config;
mod native;
mod rpc;
mod scenario;
mod storage;
mod transaction;
mod wallet;

use cli::args::Cli;
use cli::context::{init_tracing, load_configuration};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.clone())?;
    init_tracing(&config.logging)?;
    cli::run(cli, config).await
}
