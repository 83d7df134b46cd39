use clap::Parser;

mod cli;
mod render;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize core (tracing)
    if let Err(e) = nimbus_core::init() {
        eprintln!("Failed to initialize: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();
    if let Err(e) = cli.execute().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
