//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser)]
#[command(
    name = "magwash",
    version,
    about = "Run magnetic bead-wash recipes against a simulated liquid handler",
    long_about = "Run magnetic bead-wash recipes against a simulated liquid handler.\n\n\
                  A run file declares the pipette, the deck layout, reagent columns\n\
                  and the recipe steps. Tips, trash and liquid waste are tracked\n\
                  across the run and the operator is prompted when any runs out."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Prefix log lines with timestamps.
    #[arg(long = "timestamps", global = true)]
    pub timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a run file and execute its recipe.
    Run(RunArgs),

    /// Validate a run file and compile every step without running it.
    Check {
        /// Path to the run file.
        #[arg(value_name = "RUN_FILE")]
        path: PathBuf,
    },
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the run file.
    #[arg(value_name = "RUN_FILE")]
    pub path: PathBuf,

    /// Acknowledge every operator pause automatically.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Sleep through delays instead of only logging them.
    #[arg(long = "real-time")]
    pub real_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from(["magwash", "run", "run.toml", "--yes", "-v"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.path, PathBuf::from("run.toml"));
                assert!(args.yes);
                assert!(!args.real_time);
            }
            Command::Check { .. } => panic!("expected run"),
        }
        assert!(cli.verbosity.is_present());
    }
}
