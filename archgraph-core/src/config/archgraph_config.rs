//! Top-level archgraph configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AnalyzeConfig, RuleConfig, ScanConfig, StoreConfig, StoreLifecycle};
use crate::constants::{PROJECT_CONFIG_FILE, USER_CONFIG_DIR};
use crate::errors::ConfigError;
use crate::types::Severity;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`ARCHGRAPH_*`)
/// 3. Project config (`archgraph.toml` in project root)
/// 4. User config (`~/.archgraph/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArchgraphConfig {
    pub scan: ScanConfig,
    pub analyze: AnalyzeConfig,
    pub rule: RuleConfig,
    pub store: StoreConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub continue_on_error: Option<bool>,
    pub reset: Option<bool>,
    pub fail_on_severity: Option<Severity>,
    pub warn_on_severity: Option<Severity>,
    pub store_uri: Option<String>,
    pub concepts: Vec<String>,
    pub constraints: Vec<String>,
    pub groups: Vec<String>,
    pub rule_directories: Vec<PathBuf>,
}

impl ArchgraphConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(config: &ArchgraphConfig) -> Result<(), ConfigError> {
        let warn_on = config.analyze.effective_warn_on_severity();
        let fail_on = config.analyze.effective_fail_on_severity();
        if warn_on > fail_on {
            return Err(ConfigError::ValidationFailed {
                field: "analyze.warn_on_severity".to_string(),
                message: format!("'{warn_on}' must not be above fail_on_severity '{fail_on}'"),
            });
        }
        for pattern in &config.scan.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.exclude".to_string(),
                    message: format!("invalid glob '{pattern}': {e}"),
                });
            }
        }
        if let Some(uri) = config.store.uri.as_deref() {
            if uri.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "store.uri".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.archgraph/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(USER_CONFIG_DIR).join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut ArchgraphConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: ArchgraphConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `Some` and non-empty values win.
    pub fn merge(base: &mut ArchgraphConfig, other: &ArchgraphConfig) {
        // Scan
        if other.scan.continue_on_error.is_some() {
            base.scan.continue_on_error = other.scan.continue_on_error;
        }
        if other.scan.reset.is_some() {
            base.scan.reset = other.scan.reset;
        }
        if !other.scan.include_files.is_empty() {
            base.scan.include_files = other.scan.include_files.clone();
        }
        if !other.scan.include_urls.is_empty() {
            base.scan.include_urls = other.scan.include_urls.clone();
        }
        if !other.scan.exclude.is_empty() {
            base.scan.exclude = other.scan.exclude.clone();
        }
        for (k, v) in &other.scan.properties {
            base.scan.properties.insert(k.clone(), v.clone());
        }

        // Analyze
        if other.analyze.fail_on_severity.is_some() {
            base.analyze.fail_on_severity = other.analyze.fail_on_severity;
        }
        if other.analyze.warn_on_severity.is_some() {
            base.analyze.warn_on_severity = other.analyze.warn_on_severity;
        }
        if !other.analyze.concepts.is_empty() {
            base.analyze.concepts = other.analyze.concepts.clone();
        }
        if !other.analyze.constraints.is_empty() {
            base.analyze.constraints = other.analyze.constraints.clone();
        }
        if !other.analyze.groups.is_empty() {
            base.analyze.groups = other.analyze.groups.clone();
        }
        if other.analyze.execute_applied_concepts.is_some() {
            base.analyze.execute_applied_concepts = other.analyze.execute_applied_concepts;
        }
        for (k, v) in &other.analyze.rule_parameters {
            base.analyze.rule_parameters.insert(k.clone(), v.clone());
        }

        // Rule
        if !other.rule.directories.is_empty() {
            base.rule.directories = other.rule.directories.clone();
        }
        if other.rule.default_concept_severity.is_some() {
            base.rule.default_concept_severity = other.rule.default_concept_severity;
        }
        if other.rule.default_constraint_severity.is_some() {
            base.rule.default_constraint_severity = other.rule.default_constraint_severity;
        }

        // Store
        if other.store.uri.is_some() {
            base.store.uri = other.store.uri.clone();
        }
        if other.store.lifecycle.is_some() {
            base.store.lifecycle = other.store.lifecycle;
        }
        if other.store.reset_on_start.is_some() {
            base.store.reset_on_start = other.store.reset_on_start;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `ARCHGRAPH_SCAN_CONTINUE_ON_ERROR`, `ARCHGRAPH_STORE_URI`, etc.
    fn apply_env_overrides(config: &mut ArchgraphConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("ARCHGRAPH_SCAN_CONTINUE_ON_ERROR") {
            if let Ok(v) = val.parse::<bool>() {
                config.scan.continue_on_error = Some(v);
            }
        }
        if let Ok(val) = std::env::var("ARCHGRAPH_ANALYZE_FAIL_ON_SEVERITY") {
            config.analyze.fail_on_severity = Some(parse_severity_env(
                "ARCHGRAPH_ANALYZE_FAIL_ON_SEVERITY",
                &val,
            )?);
        }
        if let Ok(val) = std::env::var("ARCHGRAPH_ANALYZE_WARN_ON_SEVERITY") {
            config.analyze.warn_on_severity = Some(parse_severity_env(
                "ARCHGRAPH_ANALYZE_WARN_ON_SEVERITY",
                &val,
            )?);
        }
        if let Ok(val) = std::env::var("ARCHGRAPH_STORE_URI") {
            config.store.uri = Some(val);
        }
        if let Ok(val) = std::env::var("ARCHGRAPH_STORE_LIFECYCLE") {
            config.store.lifecycle = Some(val.parse::<StoreLifecycle>()?);
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(config: &mut ArchgraphConfig, cli: &CliOverrides) {
        if let Some(v) = cli.continue_on_error {
            config.scan.continue_on_error = Some(v);
        }
        if let Some(v) = cli.reset {
            config.scan.reset = Some(v);
        }
        if let Some(v) = cli.fail_on_severity {
            config.analyze.fail_on_severity = Some(v);
        }
        if let Some(v) = cli.warn_on_severity {
            config.analyze.warn_on_severity = Some(v);
        }
        if let Some(ref v) = cli.store_uri {
            config.store.uri = Some(v.clone());
        }
        if !cli.concepts.is_empty() {
            config.analyze.concepts = cli.concepts.clone();
        }
        if !cli.constraints.is_empty() {
            config.analyze.constraints = cli.constraints.clone();
        }
        if !cli.groups.is_empty() {
            config.analyze.groups = cli.groups.clone();
        }
        if !cli.rule_directories.is_empty() {
            config.rule.directories = cli.rule_directories.clone();
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_severity_env(field: &str, value: &str) -> Result<Severity, ConfigError> {
    value
        .parse::<Severity>()
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        })
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
