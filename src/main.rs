//! Docent CLI entry point.

use clap::Parser;

use docent::cli::{commands, Cli, Commands};
use docent::infrastructure::config::ConfigLoader;
use docent::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    // Provider keys are commonly kept in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => docent::cli::handle_error(err, cli.json),
    };

    let log_config = match LogConfig::from_settings(&config.logging) {
        Ok(log_config) if cli.verbose => log_config.verbose(),
        Ok(log_config) => log_config,
        Err(err) => docent::cli::handle_error(err, cli.json),
    };
    // Held until exit so buffered file output is flushed
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => docent::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &config, cli.json).await,
        Commands::Ask(args) => commands::ask::execute(args, &config, cli.json).await,
        Commands::Chat(args) => commands::chat::execute(args, &config, cli.json).await,
        Commands::Status(args) => commands::status::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        docent::cli::handle_error(err, cli.json);
    }
}
