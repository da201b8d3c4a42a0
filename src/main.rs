use anyhow::Result;
use clap::Parser;
use cyberfinance::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.run().await
}
