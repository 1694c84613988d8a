//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::cli::args::{OutputFormat, SynonymArgs};
use crate::error::Result;

/// Result structure for text analysis.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub tokens: Vec<Token>,
}

/// Result structure for a rule check.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResult {
    pub location: String,
    pub rules: usize,
    pub entries: usize,
    pub max_input_len: usize,
    pub duration_ms: u64,
}

/// Output a result in the configured format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &SynonymArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SynonymArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &SynonymArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value.get("tokens").and_then(|t| t.as_array()) {
        Some(tokens) => {
            for token in tokens {
                println!("{}", format_token(token));
            }
        }
        None => output_generic_human(&value),
    }
    Ok(())
}

/// One token per line: text, increment, length and offsets.
fn format_token(token: &serde_json::Value) -> String {
    let field = |name: &str| token.get(name).and_then(|v| v.as_u64()).unwrap_or(0);
    format!(
        "{:<24} +{} len={} [{}..{}] {}",
        token.get("text").and_then(|v| v.as_str()).unwrap_or(""),
        field("position_increment"),
        field("position_length"),
        field("start_offset"),
        field("end_offset"),
        token
            .get("token_type")
            .and_then(|v| v.as_str())
            .unwrap_or(""),
    )
}

/// Generic output for other types.
fn output_generic_human(value: &serde_json::Value) {
    if let Some(obj) = value.as_object() {
        for (key, val) in obj {
            match val {
                serde_json::Value::String(s) => println!("{key}: {s}"),
                other => println!("{key}: {other}"),
            }
        }
    } else {
        println!("{value}");
    }
}
