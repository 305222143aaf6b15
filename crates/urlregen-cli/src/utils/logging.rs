//! Logging initialization and color control.

use anyhow::Result;
use colored::control as color_control;
use is_terminal::IsTerminal;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;

/// Pick the log level for the given flags.
///
/// Progress lines are INFO so they show by default. JSON output keeps stderr
/// to errors unless `--verbose` was given.
#[must_use]
pub fn log_level(cli: &Cli) -> Level {
    if cli.verbose {
        Level::DEBUG
    } else if cli.quiet || cli.format().is_machine_readable() {
        Level::ERROR
    } else {
        Level::INFO
    }
}

/// Install the global tracing subscriber on stderr and settle color output.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(std::io::stderr().is_terminal() && !cli.no_color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color
        || env_no_color
        || cli.format().is_machine_readable()
        || !std::io::stdout().is_terminal()
    {
        color_control::set_override(false);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn info_by_default() {
        assert_eq!(log_level(&parse(&["urlregen", "regenerate", "-f", "text"])), Level::INFO);
    }

    #[test]
    fn verbose_and_quiet_adjust_level() {
        assert_eq!(log_level(&parse(&["urlregen", "-v", "stores", "-f", "text"])), Level::DEBUG);
        assert_eq!(log_level(&parse(&["urlregen", "-q", "stores", "-f", "text"])), Level::ERROR);
    }

    #[test]
    fn json_output_silences_progress() {
        assert_eq!(log_level(&parse(&["urlregen", "regen", "--json"])), Level::ERROR);
        assert_eq!(log_level(&parse(&["urlregen", "-v", "regen", "--json"])), Level::DEBUG);
    }
}
