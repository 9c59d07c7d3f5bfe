mod cli;
mod commands;
mod config;
mod declared;
mod paths;
mod provider;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "gauge", &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(&cli.backend);

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
    };

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Diff(args) => commands::diff::run(&ctx, &args),
        Command::Show(args) => commands::show::run(&ctx, &args),
        Command::List(args) => commands::list::run(&ctx, &args),
        Command::Get { kind, uid } => commands::get::run(&ctx, &kind, &uid),
        Command::Export { select, output } => commands::export::run(&ctx, &select, &output),
        Command::Preview(args) => commands::preview::run(&ctx, &args),
        Command::Providers => commands::providers::run(&ctx),
        Command::Completions { .. } => Ok(()),
    }
}
