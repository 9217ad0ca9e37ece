//! Command line interface.

use clap::Parser;

use crate::config::Config;
use crate::protocol::events::DEFAULT_EVENT_FORMAT;

/// Drive an interactive menu from an external command over line-delimited JSON.
#[derive(Debug, Parser)]
#[command(name = "pipemenu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pipe-driven interactive menu engine", long_about = None)]
pub struct Args {
    /// Command to spawn as the menu driver (its stdio becomes the protocol)
    #[arg(long, value_name = "COMMAND")]
    pub wrap: Option<String>,

    /// Initial prompt label, shown until the driver overrides it
    #[arg(long)]
    pub prompt: Option<String>,

    /// Treat row text as markup unless a line opts out
    #[arg(long)]
    pub markup_rows: bool,

    /// Template for outbound event lines
    #[arg(long, value_name = "TEMPLATE")]
    pub event_format: Option<String>,
}

/// Startup settings after layering the command line over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wrap: Option<String>,
    pub prompt: Option<String>,
    pub markup_rows: bool,
    pub event_format: String,
}

impl Settings {
    pub fn merge(args: Args, config: &Config) -> Self {
        Settings {
            wrap: args.wrap,
            prompt: args.prompt.or_else(|| config.defaults.prompt.clone()),
            markup_rows: args.markup_rows || config.defaults.markup_rows,
            event_format: args
                .event_format
                .or_else(|| config.defaults.event_format.clone())
                .unwrap_or_else(|| DEFAULT_EVENT_FORMAT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn defaults_without_flags_or_config() {
        let settings = Settings::merge(parse(&["pipemenu"]), &Config::default());
        assert_eq!(settings.wrap, None);
        assert_eq!(settings.prompt, None);
        assert!(!settings.markup_rows);
        assert_eq!(settings.event_format, DEFAULT_EVENT_FORMAT);
    }

    #[test]
    fn flags_parse_into_settings() {
        let args = parse(&[
            "pipemenu",
            "--wrap",
            "python menu.py",
            "--prompt",
            "run",
            "--markup-rows",
            "--event-format",
            "{{event}}",
        ]);
        let settings = Settings::merge(args, &Config::default());
        assert_eq!(settings.wrap.as_deref(), Some("python menu.py"));
        assert_eq!(settings.prompt.as_deref(), Some("run"));
        assert!(settings.markup_rows);
        assert_eq!(settings.event_format, "{{event}}");
    }

    #[test]
    fn command_line_wins_over_config() {
        let config = Config {
            defaults: Defaults {
                prompt: Some("from-config".to_string()),
                markup_rows: false,
                event_format: Some("config-template".to_string()),
            },
        };
        let args = parse(&["pipemenu", "--prompt", "from-cli"]);
        let settings = Settings::merge(args, &config);
        assert_eq!(settings.prompt.as_deref(), Some("from-cli"));
        assert_eq!(settings.event_format, "config-template");
    }

    #[test]
    fn config_fills_gaps_the_command_line_leaves() {
        let config = Config {
            defaults: Defaults {
                prompt: Some("menu".to_string()),
                markup_rows: true,
                event_format: None,
            },
        };
        let settings = Settings::merge(parse(&["pipemenu"]), &config);
        assert_eq!(settings.prompt.as_deref(), Some("menu"));
        assert!(settings.markup_rows);
        assert_eq!(settings.event_format, DEFAULT_EVENT_FORMAT);
    }
}
