//! docsnap CLI: snapshot hosted rich documents as standalone HTML.
//!
//! Retrieves a document from the document service, decodes its content
//! tree, and writes an HTML page with locally cached images.

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
