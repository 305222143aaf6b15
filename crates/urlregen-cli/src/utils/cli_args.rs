use clap::Args;

use crate::output::OutputFormat;

/// Shared clap argument for commands that accept an output format.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatArg {
    /// Output format
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        env = "URLREGEN_OUTPUT_FORMAT"
    )]
    pub format: Option<OutputFormat>,

    /// Shorthand for `--format json`
    #[arg(long, conflicts_with = "format")]
    pub json: bool,
}

impl FormatArg {
    /// Effective output format. Text unless JSON was asked for.
    #[must_use]
    pub fn resolve(&self) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        self.format.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shorthand_wins() {
        let arg = FormatArg {
            format: None,
            json: true,
        };
        assert_eq!(arg.resolve(), OutputFormat::Json);
    }

    #[test]
    fn defaults_to_text() {
        assert_eq!(FormatArg::default().resolve(), OutputFormat::Text);
        let explicit = FormatArg {
            format: Some(OutputFormat::Json),
            json: false,
        };
        assert_eq!(explicit.resolve(), OutputFormat::Json);
    }
}
