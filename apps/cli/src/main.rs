//! MeetingPrep CLI — executive briefings from a company name and a meeting plan.
//!
//! Searches recent company news, then runs four chained generation steps
//! (context, industry, strategy, brief) and prints the resulting markdown.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // A missing .env is fine; keys may come from the shell or flags.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
