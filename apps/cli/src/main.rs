//! DocAuditor CLI — client for the documentation-audit backend.
//!
//! Loads demo scenarios of conflicting docs/changelogs, runs the audit
//! agent, renders the detected contradictions, and answers free-form
//! questions against the same knowledge base.

mod commands;
mod render;

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
