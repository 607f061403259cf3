//! Configuration-driven runs: load rules, scan the configured resources,
//! then analyze the resulting graph.

use archgraph_core::config::ArchgraphConfig;
use archgraph_core::errors::{AnalysisError, StorageError};
use archgraph_core::traits::GraphStore;
use archgraph_storage::StoreProvider;
use serde::Serialize;

use crate::executor::{AnalysisResults, Analyzer};
use crate::plugins::default_registry;
use crate::rules::{RuleParser, RuleSelection, RuleSet};
use crate::scanner::{PluginRegistry, ScanSummary, ScanTask};

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineOutcome {
    pub scan: ScanSummary,
    pub analysis: AnalysisResults,
}

/// Load rules from the configured directories and resolve the configured
/// selection. Rule errors surface here, before anything is scanned.
pub fn load_rules(config: &ArchgraphConfig) -> Result<(RuleSet, RuleSelection), AnalysisError> {
    let rule_set = RuleParser::new().parse_directories(&config.rule)?;
    let selection = RuleSelection::from_config(&config.analyze, &rule_set);
    selection.resolve(&rule_set)?;
    Ok((rule_set, selection))
}

/// Scan and analyze with the built-in plugins.
pub fn run(config: &ArchgraphConfig, provider: &StoreProvider) -> Result<PipelineOutcome, AnalysisError> {
    let registry = default_registry(&config.scan.properties)?;
    run_with_registry(config, provider, &registry)
}

pub fn run_with_registry(
    config: &ArchgraphConfig,
    provider: &StoreProvider,
    registry: &PluginRegistry,
) -> Result<PipelineOutcome, AnalysisError> {
    let (rule_set, selection) = load_rules(config)?;

    let shared = provider.open(&config.store)?;
    let outcome = {
        match shared.lock() {
            Ok(mut store) => scan_and_analyze(&mut *store, config, registry, &rule_set, &selection),
            Err(_) => Err(StorageError::LockPoisoned.into()),
        }
    };
    if let Err(release_err) = provider.release(&config.store) {
        if outcome.is_ok() {
            return Err(release_err.into());
        }
        tracing::warn!(error = %release_err, "cannot release store after failed run");
    }
    outcome
}

fn scan_and_analyze(
    store: &mut dyn GraphStore,
    config: &ArchgraphConfig,
    registry: &PluginRegistry,
    rule_set: &RuleSet,
    selection: &RuleSelection,
) -> Result<PipelineOutcome, AnalysisError> {
    let scan = ScanTask::new(registry, &config.scan).run(store)?;
    let analysis = Analyzer::new(store, &config.analyze).execute(rule_set, selection)?;
    Ok(PipelineOutcome { scan, analysis })
}
