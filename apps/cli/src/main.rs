//! faqpilot CLI — course FAQ retrieval assistant.
//!
//! Pulls FAQ documents out of Google Docs, indexes them in Elasticsearch,
//! and answers questions grounded in the retrieved records.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
