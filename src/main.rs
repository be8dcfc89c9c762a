//! Main entry point for scorediff CLI

use clap::Parser;
use scorediff::cli::Cli;
use scorediff::commands::execute_command;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level())
        .init();

    // Execute the command
    if let Err(e) = execute_command(cli.command, cli.config.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
