pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "anch-api")]
#[command(about = "Bill and diary tracking API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Hash a password read from stdin for seeding accounts")]
    HashPassword(commands::hash_password::HashPasswordArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::HashPassword(args) => commands::hash_password::handle(args),
    }
}
