use anyhow::Result;
use clap::Parser;
use tracing::debug;

use sieve_cli::{
    cli::{Cli, Commands},
    commands, config, logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref(), cli.adapter)?;
    logging::init(cli.log_level, cli.verbose, &config.logging.level);
    debug!(config = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Compile {
            entity,
            filter,
            order,
        } => commands::compile::execute(config, entity, filter, order)?,

        Commands::Discover { roots } => commands::discover::execute(config, roots)?,

        Commands::Operators { kind } => commands::operators::execute(config, kind)?,

        Commands::Inputs { roots } => commands::inputs::execute(config, roots)?,
    }

    Ok(())
}
