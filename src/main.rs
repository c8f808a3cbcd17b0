//! Folio CLI entry point.

use clap::Parser;

use folio::cli::{Cli, Commands};
use folio::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match folio::cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => folio::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => folio::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Correct(args) => {
            folio::cli::commands::correct::execute(args, &config, cli.json).await
        }
        Commands::Batch(args) => folio::cli::commands::batch::execute(args, &config, cli.json).await,
        Commands::Status(args) => {
            folio::cli::commands::status::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        folio::cli::handle_error(err, cli.json);
    }
}
