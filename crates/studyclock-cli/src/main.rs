//! studyclock CLI
//!
//! Console front end for the study group command core

use clap::{Parser, Subcommand};

mod commands;
mod settings;
mod stdio_session;

#[derive(Debug, Parser)]
#[command(name = "studyclock")]
#[command(about = "studyclock - study group and timer administration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run commands typed on stdin against a tenant
    Console(commands::console::ConsoleArgs),
    /// Create or upgrade the database schema
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Console(args) => commands::console::execute(args).await,
        Commands::Migrate(args) => commands::migrate::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
