//! urlregen CLI entry point.

use std::process::ExitCode;

use colored::Colorize;
use urlregen_cli::error::exit_code_from_error;

fn main() -> ExitCode {
    match urlregen_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
