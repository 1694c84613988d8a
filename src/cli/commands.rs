//! Command implementations for the dynamic-synonym CLI.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::info;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::Token;
use crate::analysis::tokenizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SynonymFilterConfig;
use crate::error::Result;
use crate::factory::DynamicSynonymFilterFactory;
use crate::source;
use crate::synonym::map::SynonymMapBuilder;
use crate::synonym::parser::parse_rules;

/// Execute a CLI command.
pub fn execute_command(args: SynonymArgs) -> Result<()> {
    match &args.command {
        Command::Analyze(analyze_args) => analyze_text(analyze_args.clone(), &args),
        Command::Check(check_args) => check_rules(check_args.clone(), &args),
        Command::Watch(watch_args) => watch_rules(watch_args.clone(), &args),
    }
}

/// Tokenizer of the settings followed by the synonym filter.
fn build_analyzer(config: &SynonymFilterConfig) -> Result<PipelineAnalyzer> {
    let factory = DynamicSynonymFilterFactory::with_global_scheduler(config.clone())?;
    Ok(
        PipelineAnalyzer::new(tokenizer::by_name(&config.tokenizer)?)
            .add_filter(Arc::new(factory))
            .with_name("dynamic_synonym"),
    )
}

fn analyze(analyzer: &PipelineAnalyzer, text: &str) -> Result<Vec<Token>> {
    Ok(analyzer.analyze(text)?.collect())
}

/// Analyze text once.
fn analyze_text(args: AnalyzeArgs, cli_args: &SynonymArgs) -> Result<()> {
    let config = SynonymFilterConfig::from_file(&args.config)?;
    let analyzer = build_analyzer(&config)?;

    output_result(
        &format!("Analysis of \"{}\"", args.text),
        &AnalysisResult {
            tokens: analyze(&analyzer, &args.text)?,
            text: args.text,
        },
        cli_args,
    )
}

/// Fetch, parse and compile the rules once.
fn check_rules(args: CheckArgs, cli_args: &SynonymArgs) -> Result<()> {
    let start = Instant::now();
    let config = SynonymFilterConfig::from_file(&args.config)?;

    let source = source::from_config(&config)?;
    let text = source.fetch()?;
    let analyzer = PipelineAnalyzer::for_rules(&config.tokenizer, config.ignore_case)?;
    let rules = parse_rules(&text, config.synonym_format()?, config.expand, &analyzer)?;

    let mut builder = SynonymMapBuilder::new(config.ignore_case);
    builder.add_rules(&rules);
    let map = builder.build()?;

    output_result(
        "Synonym rules compiled successfully",
        &CheckResult {
            location: source.location().to_string(),
            rules: rules.len(),
            entries: map.len(),
            max_input_len: map.max_input_len(),
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Re-analyze text every interval and print changes.
fn watch_rules(args: WatchArgs, cli_args: &SynonymArgs) -> Result<()> {
    let config = SynonymFilterConfig::from_file(&args.config)?;
    let analyzer = build_analyzer(&config)?;

    let mut last: Option<Vec<Token>> = None;
    let mut tick = 0;
    loop {
        let tokens = analyze(&analyzer, &args.text)?;
        if last.as_ref() != Some(&tokens) {
            output_result(
                &format!("Analysis of \"{}\" (tick {tick})", args.text),
                &AnalysisResult {
                    text: args.text.clone(),
                    tokens: tokens.clone(),
                },
                cli_args,
            )?;
            last = Some(tokens);
        }

        tick += 1;
        if args.ticks.is_some_and(|ticks| tick > ticks) {
            break;
        }
        info!("waiting {}s for the next check", config.interval);
        thread::sleep(config.interval());
    }
    Ok(())
}
