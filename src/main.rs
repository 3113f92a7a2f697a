use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use covline::{
    argument_aggregator::ArgumentAggregator,
    cli::{Cli, Commands},
    commands::{execinfo::ExecInfoCommand, list::ListCommand, project::ProjectCommand, Command},
};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli_args = Cli::parse();
    init_logging(cli_args.verbose);

    let mut arg_aggregator = ArgumentAggregator::new();

    // Load config based on command
    match &cli_args.cmd {
        Commands::Project(args) => arg_aggregator.load(args.tools.config.as_ref()),
        Commands::List(args) => arg_aggregator.load(args.tools.config.as_ref()),
        Commands::Execinfo(_) => Ok(()),
    }?;

    // Execute command
    match &cli_args.cmd {
        Commands::Project(args) => ProjectCommand::new(args, &arg_aggregator).execute(),
        Commands::List(args) => ListCommand::new(args, &arg_aggregator).execute(),
        Commands::Execinfo(args) => ExecInfoCommand::new(args).execute(),
    }
}
