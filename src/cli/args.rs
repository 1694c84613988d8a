//! Command line argument parsing for the dynamic-synonym CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// dynamic-synonym - try out and watch live-reloadable synonym rules
#[derive(Parser, Debug, Clone)]
#[command(name = "dynamic-synonym")]
#[command(about = "Analyze text with live-reloadable synonym rules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SynonymArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SynonymArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze text with the configured synonym filter
    Analyze(AnalyzeArgs),

    /// Load and compile the rules once
    Check(CheckArgs),

    /// Re-analyze text on every reload interval
    Watch(WatchArgs),
}

/// Arguments for analyzing text
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Filter settings file (JSON)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Arguments for checking rules
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Filter settings file (JSON)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for watching rules
#[derive(Parser, Debug, Clone)]
pub struct WatchArgs {
    /// Filter settings file (JSON)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Stop after this many intervals (default: run until interrupted)
    #[arg(long, value_name = "N")]
    pub ticks: Option<u64>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_command() {
        let args = SynonymArgs::try_parse_from([
            "dynamic-synonym",
            "analyze",
            "synonyms.json",
            "machine learning",
        ])
        .unwrap();

        if let Command::Analyze(analyze_args) = args.command {
            assert_eq!(analyze_args.config, PathBuf::from("synonyms.json"));
            assert_eq!(analyze_args.text, "machine learning");
        } else {
            panic!("Expected Analyze command");
        }
    }

    #[test]
    fn test_watch_command() {
        let args = SynonymArgs::try_parse_from([
            "dynamic-synonym",
            "watch",
            "synonyms.json",
            "ml",
            "--ticks",
            "3",
        ])
        .unwrap();

        if let Command::Watch(watch_args) = args.command {
            assert_eq!(watch_args.ticks, Some(3));
        } else {
            panic!("Expected Watch command");
        }
    }

    #[test]
    fn test_output_format() {
        let args =
            SynonymArgs::try_parse_from(["dynamic-synonym", "-f", "json", "check", "s.json"])
                .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(matches!(args.command, Command::Check(_)));
    }

    #[test]
    fn test_verbosity() {
        let args = SynonymArgs::try_parse_from(["dynamic-synonym", "check", "s.json"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args =
            SynonymArgs::try_parse_from(["dynamic-synonym", "-vvv", "check", "s.json"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args =
            SynonymArgs::try_parse_from(["dynamic-synonym", "-q", "-v", "check", "s.json"])
                .unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
