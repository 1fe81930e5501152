mod archive;
mod cli;
mod commands;
mod config;
mod helm;
mod paths;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::AppConfig;
use helm::HelmBackend;
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config: AppConfig,
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
        generate(shell, &mut cmd, "helm-bulk", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        quiet: cli.quiet,
        config: AppConfig::resolve(&cli.file_prefix, &cli.order_pref_config_dir),
    };

    match cli.command {
        Command::Save => commands::save::run(&ctx, &HelmBackend::new()),
        Command::Load(args) => {
            commands::load::run(&ctx, &HelmBackend::new(), args.mode(), args.dry_run).map(drop)
        }
        Command::Show => commands::show::run(&ctx),
        Command::Completions { .. } => Ok(()),
    }
}
