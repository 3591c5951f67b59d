//! magwash command-line runner
//!
//! Loads a run file, validates it, and runs the recipe on the simulated
//! deck with the operator at the console.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use magwash_drivers::sim::{SimConfig, SimDeck};
use tracing::{debug, error, info};

mod cli;
mod config;
mod controller;
mod logging;
mod operator;

use crate::cli::{Cli, Command, LogFormatArg, RunArgs};
use crate::config::{load, log_config_summary, RunSetup};
use crate::controller::Controller;
use crate::logging::{init_logging, LogConfig, LogFormat};
use crate::operator::{Bench, Console};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Build logging configuration from CLI flags
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
        },
        with_timestamps: cli.timestamps,
        ..LogConfig::default()
    }
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Check { path } => {
            let setup = load_setup(&path)?;
            let controller = Controller::new(&setup).context("compiling recipe")?;
            debug!(state = ?controller.state(), "Recipe compiled");
            info!("{}: {} steps OK", path.display(), setup.recipe.len());
            Ok(())
        }
        Command::Run(args) => run(&args),
    }
}

fn load_setup(path: &std::path::Path) -> Result<RunSetup> {
    let setup = load(path).with_context(|| format!("loading {}", path.display()))?;
    log_config_summary(&setup);
    Ok(setup)
}

fn run(args: &RunArgs) -> Result<()> {
    let setup = load_setup(&args.path)?;
    let mut controller = Controller::new(&setup).context("compiling recipe")?;

    let console = if args.yes {
        Console::unattended()
    } else {
        Console::interactive(io::stdin().lock())
    }
    .real_time(args.real_time);
    let mut bench = Bench::new(SimDeck::new(SimConfig::for_run(&setup.config)), console);
    if let Some(pipette) = &setup.config.secondary {
        bench = bench.with_secondary(SimDeck::new(SimConfig::for_pipette(pipette)));
    }

    let summary = controller.run(&mut bench)?;

    info!(
        tips_used = summary.tips_used,
        tips_remaining = controller.ledger().tips.remaining(),
        tips_in_trash = summary.tips_in_trash,
        "Tips"
    );
    if let Some(tips) = &controller.ledger().secondary_tips {
        info!(
            tips_used = tips.count(),
            tips_remaining = tips.remaining(),
            "Secondary pipette tips"
        );
    }
    info!(waste_ul = summary.waste_ul, "Liquid waste");
    info!(
        prompts = summary.prompts,
        acknowledged = bench.console.acknowledged(),
        "Operator"
    );
    info!(
        elapsed_s = bench.deck.elapsed().as_secs(),
        operations = bench.deck.journal().len(),
        "Deck"
    );
    Ok(())
}
