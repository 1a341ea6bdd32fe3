use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use unitgen::command::Command;
use unitgen::logging::init_logger;

/// Generates systemd unit files and prints a shell script that installs them.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger();

    match cli.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(?err, "generation failed");
            eprintln!("error: {:#}", anyhow::Error::from(err));
            ExitCode::FAILURE
        }
    }
}

