//! Factory for live-reloadable synonym filters.
//!
//! One factory owns one rule source and the synonym map compiled from it.
//! Every token stream passed through [`DynamicSynonymFilterFactory::create`]
//! gets its own [`DynamicSynonymFilter`], registered so that reloads reach it
//! while it is alive.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dynamic_synonym::analysis::analyzer::{Analyzer, PipelineAnalyzer};
//! use dynamic_synonym::analysis::tokenizer::WhitespaceTokenizer;
//! use dynamic_synonym::config::SynonymFilterConfig;
//! use dynamic_synonym::factory::DynamicSynonymFilterFactory;
//! use dynamic_synonym::monitor::ReloadScheduler;
//!
//! let config = SynonymFilterConfig::new("/etc/search/synonyms.txt");
//! let factory =
//!     DynamicSynonymFilterFactory::new(config, ReloadScheduler::global().unwrap()).unwrap();
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
//!     .add_filter(Arc::new(factory));
//! let tokens: Vec<_> = analyzer.analyze("machine learning").unwrap().collect();
//! ```

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{info, warn};
use parking_lot::Mutex;

use crate::analysis::analyzer::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{DynamicSynonymFilter, Filter};
use crate::config::SynonymFilterConfig;
use crate::error::Result;
use crate::monitor::{Monitor, ReloadScheduler, ScheduledJob};
use crate::registry::FilterRegistry;
use crate::source::{self, SynonymSource};
use crate::synonym::map::{SynonymMap, SynonymMapBuilder};
use crate::synonym::parser::{SynonymFormat, parse_rules};

/// Result of one reload cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The source reported no change.
    Unchanged,
    /// A new map was installed.
    Reloaded {
        /// Live filters that received the new map.
        filters_updated: usize,
    },
}

/// Everything a reload cycle touches.
pub struct ReloadState {
    source: Mutex<Box<dyn SynonymSource>>,
    location: String,
    analyzer: PipelineAnalyzer,
    format: SynonymFormat,
    expand: bool,
    ignore_case: bool,
    current: ArcSwap<SynonymMap>,
    registry: FilterRegistry,
}

impl ReloadState {
    /// Create the reload state for `source`, starting from an empty map.
    pub fn new(source: Box<dyn SynonymSource>, config: &SynonymFilterConfig) -> Result<Self> {
        Ok(ReloadState {
            location: source.location().to_string(),
            source: Mutex::new(source),
            analyzer: PipelineAnalyzer::for_rules(&config.tokenizer, config.ignore_case)?,
            format: config.synonym_format()?,
            expand: config.expand,
            ignore_case: config.ignore_case,
            current: ArcSwap::from_pointee(SynonymMap::empty()),
            registry: FilterRegistry::new(),
        })
    }

    fn build(&self, source: &dyn SynonymSource) -> Result<SynonymMap> {
        let text = source.fetch()?;
        let rules = parse_rules(&text, self.format, self.expand, &self.analyzer)?;

        let mut builder = SynonymMapBuilder::new(self.ignore_case);
        builder.add_rules(&rules);
        builder.build()
    }

    fn install(&self, map: SynonymMap) -> (Arc<SynonymMap>, usize) {
        let map = Arc::new(map);
        self.current.store(Arc::clone(&map));
        let filters_updated = self.registry.sweep(&map);
        (map, filters_updated)
    }

    /// Prime the source's change detection without acting on the answer.
    pub fn prime(&self) {
        if let Err(e) = self.source.lock().detect_change() {
            warn!("failed to read change validators of {}: {e}", self.location);
        }
    }

    /// Fetch, parse and install the rules unconditionally.
    pub fn reload(&self) -> Result<Arc<SynonymMap>> {
        let map = {
            let source = self.source.lock();
            self.build(&**source)?
        };
        Ok(self.install(map).0)
    }

    /// Fetch, parse and install the rules if the source changed.
    ///
    /// On error the current map is left in place. Validators the source
    /// recorded while detecting the change are kept.
    pub fn reload_if_changed(&self) -> Result<ReloadOutcome> {
        let map = {
            let mut source = self.source.lock();
            if !source.detect_change()? {
                return Ok(ReloadOutcome::Unchanged);
            }
            self.build(&**source)?
        };

        let (map, filters_updated) = self.install(map);
        info!(
            "installed {} synonym entries from {}",
            map.len(),
            self.location
        );
        Ok(ReloadOutcome::Reloaded { filters_updated })
    }

    /// The active map.
    pub fn current(&self) -> Arc<SynonymMap> {
        self.current.load_full()
    }

    /// Live filters of this factory.
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Where the rules come from.
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Creates synonym filters backed by a periodically reloaded map.
pub struct DynamicSynonymFilterFactory {
    config: SynonymFilterConfig,
    state: Arc<ReloadState>,
    job: Mutex<Option<ScheduledJob>>,
}

impl DynamicSynonymFilterFactory {
    /// Build the factory: load the rules once and schedule the reload job.
    ///
    /// Invalid settings and a failing initial load are returned as errors;
    /// later reload failures are only logged.
    pub fn new(config: SynonymFilterConfig, scheduler: &ReloadScheduler) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(ReloadState::new(source::from_config(&config)?, &config)?);
        state.prime();
        let map = state.reload()?;
        info!(
            "loaded {} synonym entries from {}",
            map.len(),
            state.location()
        );

        let monitor = Monitor::new(Arc::clone(&state));
        let job = scheduler.schedule(state.location(), config.interval(), move || monitor.run())?;

        Ok(DynamicSynonymFilterFactory {
            config,
            state,
            job: Mutex::new(Some(job)),
        })
    }

    /// Build the factory on the process-wide scheduler.
    pub fn with_global_scheduler(config: SynonymFilterConfig) -> Result<Self> {
        Self::new(config, ReloadScheduler::global()?)
    }

    /// Wrap a token stream with a synonym filter.
    ///
    /// While no synonyms are active the stream is returned unchanged.
    pub fn create(&self, stream: TokenStream) -> TokenStream {
        let map = self.state.current();
        if map.is_empty() {
            return stream;
        }

        let filter = DynamicSynonymFilter::new(stream, map);
        let cell = filter.handle();
        self.state.registry().register(&cell);

        // A reload may have swept the registry before this cell joined it.
        loop {
            let latest = self.state.current();
            cell.store(Arc::clone(&latest));
            if Arc::ptr_eq(&latest, &self.state.current()) {
                break;
            }
        }
        Box::new(filter)
    }

    /// The active map.
    pub fn current(&self) -> Arc<SynonymMap> {
        self.state.current()
    }

    /// Run one reload cycle now, outside the schedule.
    pub fn reload_if_changed(&self) -> Result<ReloadOutcome> {
        self.state.reload_if_changed()
    }

    /// Number of filters created by this factory that are still alive.
    pub fn live_filters(&self) -> usize {
        self.state.registry().live_count()
    }

    /// The settings this factory was built from.
    pub fn config(&self) -> &SynonymFilterConfig {
        &self.config
    }

    /// Stop reloading. Filters already created keep their current map.
    pub fn close(&self) {
        if let Some(job) = self.job.lock().take() {
            job.cancel();
            info!("stopped reloading synonyms from {}", self.state.location());
        }
    }
}

impl Drop for DynamicSynonymFilterFactory {
    fn drop(&mut self) {
        self.close();
    }
}

impl Filter for DynamicSynonymFilterFactory {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(self.create(tokens))
    }

    fn name(&self) -> &'static str {
        "dynamic_synonym"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::thread;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::analysis::token::Token;
    use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
    use crate::error::SynonymError;

    fn rules_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();
        file
    }

    fn factory(file: &NamedTempFile) -> Result<DynamicSynonymFilterFactory> {
        let mut config = SynonymFilterConfig::new(file.path().to_string_lossy());
        config.interval = 3600;
        let scheduler = ReloadScheduler::new("factory-test").unwrap();
        DynamicSynonymFilterFactory::new(config, &scheduler)
    }

    fn run(factory: &DynamicSynonymFilterFactory, text: &str) -> Vec<String> {
        let tokens = WhitespaceTokenizer::new().tokenize(text).unwrap();
        factory.create(tokens).map(|t: Token| t.text).collect()
    }

    #[test]
    fn test_initial_load() {
        let file = rules_file("big, large");
        let factory = factory(&file).unwrap();

        assert_eq!(factory.current().len(), 2);
        assert_eq!(run(&factory, "big dog"), vec!["big", "large", "dog"]);
        assert_eq!(factory.name(), "dynamic_synonym");
    }

    #[test]
    fn test_initial_load_failure_is_fatal() {
        let file = rules_file("a => b => c");
        assert!(matches!(
            factory(&file),
            Err(SynonymError::RuleSyntax { .. })
        ));

        let config = SynonymFilterConfig::new("/nonexistent/synonyms.txt");
        let scheduler = ReloadScheduler::new("factory-test").unwrap();
        assert!(DynamicSynonymFilterFactory::new(config, &scheduler).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = SynonymFilterConfig::new("synonyms.txt");
        config.interval = 0;
        let scheduler = ReloadScheduler::new("factory-test").unwrap();

        assert!(matches!(
            DynamicSynonymFilterFactory::new(config, &scheduler),
            Err(SynonymError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_rules_pass_through() {
        let file = rules_file("# nothing yet\n");
        let factory = factory(&file).unwrap();

        assert!(factory.current().is_empty());
        assert_eq!(run(&factory, "big dog"), vec!["big", "dog"]);
        assert_eq!(factory.live_filters(), 0);
    }

    #[test]
    fn test_reload_if_changed_unchanged() {
        let file = rules_file("big, large");
        let factory = factory(&file).unwrap();

        assert_eq!(factory.reload_if_changed().unwrap(), ReloadOutcome::Unchanged);
    }

    #[test]
    fn test_close_is_idempotent() {
        let file = rules_file("big, large");
        let factory = factory(&file).unwrap();

        factory.close();
        factory.close();
        assert_eq!(run(&factory, "big"), vec!["big", "large"]);
    }

    fn compile(rules: &str) -> SynonymMap {
        let analyzer = PipelineAnalyzer::for_rules("whitespace", false).unwrap();
        let rules = parse_rules(rules, SynonymFormat::Solr, true, &analyzer).unwrap();
        let mut builder = SynonymMapBuilder::new(false);
        builder.add_rules(&rules);
        builder.build().unwrap()
    }

    #[test]
    fn test_create_during_reload_sees_latest_map() {
        let file = rules_file("big => large");
        let factory = factory(&file).unwrap();

        let streams = thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..200 {
                    factory.state.install(compile("big => large"));
                }
                factory.state.install(compile("big => huge"));
            });

            let mut streams = Vec::new();
            for _ in 0..200 {
                streams.push(factory.create(WhitespaceTokenizer::new().tokenize("big").unwrap()));
            }
            streams
        });

        for stream in streams {
            assert_eq!(stream.map(|t| t.text).collect::<Vec<_>>(), vec!["huge"]);
        }
    }
}
