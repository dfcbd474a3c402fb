pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "fareseer",
    about = "Fareseer operator CLI",
    long_about = "Inspect configuration, check artifact readiness, and run one-off booking predictions.",
    after_help = "Examples:\n  fareseer doctor --json\n  fareseer config\n  fareseer predict --input booking.json\n  cat booking.json | fareseer predict --input -"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config and check that the classifier and popularity artifacts load")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run one booking request JSON through the prediction pipeline")]
    Predict {
        #[arg(long, value_name = "PATH", help = "Booking request JSON file, or `-` for stdin")]
        input: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Predict { input } => commands::predict::run(&input),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
