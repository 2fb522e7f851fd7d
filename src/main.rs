mod cli;
mod config;
mod error;
mod grouping;
mod output;
mod report;
mod sonar;
mod status;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting gatelens - Quality Gate Report Generator");
    cli.execute().await?;

    Ok(())
}
