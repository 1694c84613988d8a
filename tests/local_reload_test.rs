//! Integration tests for reloading synonyms from a local file

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dynamic_synonym::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
use dynamic_synonym::factory::ReloadState;
use dynamic_synonym::monitor::Monitor;
use dynamic_synonym::prelude::*;
use dynamic_synonym::source::LocalSynonymSource;
use tempfile::TempDir;

fn factory(
    path: &Path,
    interval: u64,
    scheduler: &ReloadScheduler,
) -> DynamicSynonymFilterFactory {
    let mut config = SynonymFilterConfig::new(path.to_string_lossy());
    config.interval = interval;
    DynamicSynonymFilterFactory::new(config, scheduler).unwrap()
}

fn stream(factory: &DynamicSynonymFilterFactory, text: &str) -> TokenStream {
    factory.create(WhitespaceTokenizer::new().tokenize(text).unwrap())
}

fn texts(stream: TokenStream) -> Vec<String> {
    stream.map(|t| t.text).collect()
}

#[test]
fn test_reload_reaches_live_filters() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.txt");
    fs::write(&path, "big, large")?;

    let scheduler = ReloadScheduler::new("local-reload-test")?;
    let factory = factory(&path, 3600, &scheduler);
    let mut live = stream(&factory, "small big");

    assert_eq!(live.next().unwrap().text, "small");

    fs::write(&path, "big, large, enormous")?;
    assert_eq!(
        factory.reload_if_changed()?,
        ReloadOutcome::Reloaded { filters_updated: 1 }
    );

    let rest: Vec<String> = live.map(|t| t.text).collect();
    assert_eq!(rest, vec!["big", "large", "enormous"]);
    assert_eq!(factory.reload_if_changed()?, ReloadOutcome::Unchanged);

    Ok(())
}

#[test]
fn test_malformed_file_keeps_previous_map() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.txt");
    fs::write(&path, "big, large")?;

    let scheduler = ReloadScheduler::new("local-reload-test")?;
    let factory = factory(&path, 3600, &scheduler);
    let before = factory.current();

    fs::write(&path, "big => large => huge")?;
    let err = factory.reload_if_changed().unwrap_err();
    assert!(matches!(err, SynonymError::RuleSyntax { line: 1, .. }));

    assert!(Arc::ptr_eq(&before, &factory.current()));
    assert_eq!(texts(stream(&factory, "big")), vec!["big", "large"]);

    Ok(())
}

#[test]
fn test_monitor_run_swallows_errors() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.txt");
    fs::write(&path, "big, large")?;

    let config = SynonymFilterConfig::new(path.to_string_lossy());
    let state = Arc::new(ReloadState::new(
        Box::new(LocalSynonymSource::new(&path, None)),
        &config,
    )?);
    let monitor = Monitor::new(Arc::clone(&state));

    monitor.run();
    assert_eq!(state.current().len(), 2);

    fs::write(&path, "a =>")?;
    monitor.run();
    assert_eq!(state.current().len(), 2);

    fs::remove_file(&path)?;
    monitor.run();
    assert_eq!(state.current().len(), 2);

    Ok(())
}

#[test]
fn test_dropped_filters_leave_the_sweep() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.txt");
    fs::write(&path, "big, large")?;

    let scheduler = ReloadScheduler::new("local-reload-test")?;
    let factory = factory(&path, 3600, &scheduler);

    let kept = stream(&factory, "big");
    let dropped = stream(&factory, "big");
    assert_eq!(factory.live_filters(), 2);
    drop(dropped);
    assert_eq!(factory.live_filters(), 1);

    fs::write(&path, "big, large, huge")?;
    assert_eq!(
        factory.reload_if_changed()?,
        ReloadOutcome::Reloaded { filters_updated: 1 }
    );
    assert_eq!(texts(kept), vec!["big", "large", "huge"]);

    Ok(())
}

#[test]
fn test_scheduled_reload() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synonyms.txt");
    fs::write(&path, "big, large")?;

    let scheduler = ReloadScheduler::new("local-reload-test")?;
    let factory = factory(&path, 1, &scheduler);
    let before = factory.current();

    // a broken file is skipped by the scheduled job
    fs::write(&path, "big => large => huge")?;
    thread::sleep(Duration::from_millis(2500));
    assert!(Arc::ptr_eq(&before, &factory.current()));

    fs::write(&path, "big, large, huge, enormous")?;
    let deadline = Instant::now() + Duration::from_secs(10);
    while factory.current().lookup(&["huge"]).is_none() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
    }
    assert!(factory.current().lookup(&["huge"]).is_some());

    factory.close();
    Ok(())
}
