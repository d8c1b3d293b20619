// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_CONFIG_PATH;

/// Command-line arguments for `layerbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "layerbuild",
    version,
    about = "Validate, compile, lint, watch and clean a multi-layer project.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run, in order, sharing one layer selection.
    ///
    /// Example: `layerbuild setLayerToContent validateCss`
    #[arg(value_name = "TASK", required = true)]
    pub tasks: Vec<String>,

    /// Path to the configuration file (JSON, or TOML when the extension is `.toml`).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LAYERBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the execution plan and resolved paths without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_are_positional_and_ordered() {
        let args = CliArgs::try_parse_from([
            "layerbuild",
            "--config",
            "build/config.toml",
            "setLayerToSettings",
            "validateHtml",
        ])
        .unwrap();

        assert_eq!(args.config, "build/config.toml");
        assert_eq!(args.tasks, vec!["setLayerToSettings", "validateHtml"]);
        assert!(!args.dry_run);
    }

    #[test]
    fn at_least_one_task_is_required() {
        assert!(CliArgs::try_parse_from(["layerbuild"]).is_err());
    }
}
