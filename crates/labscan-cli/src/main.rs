//! LabScan CLI - Command-line interface for lab report extraction.

use labscan_cli::commands;
use labscan_cli::{logging, Cli, Command, Config, Formatter};
use clap::Parser;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> labscan_cli::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter)?,
        Command::Scan(args) => commands::execute_scan(args, &config, &formatter).await?,
        Command::Catalog => commands::execute_catalog(&config, &formatter)?,
    }

    Ok(())
}
