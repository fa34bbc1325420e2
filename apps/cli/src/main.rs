//! Poetry Hub CLI: bulk-import a poetry archive and browse the catalog.
//!
//! Imports the Poetry Foundation ZIP/CSV export into a local libSQL
//! database, then offers browsing, favorites, reading history, comments,
//! and model-assisted search and analysis.

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
