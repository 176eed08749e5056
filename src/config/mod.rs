//! Engine configuration: validation policies, classifier strategy and taxonomy.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::errors::{LedgerError, Result};
use crate::core::services::{
    BalanceScope, BudgetGuard, CeilingWindow, Classifier, FuzzyClassifier, KeywordClassifier,
    KeywordMatching,
};
use crate::domain::{Taxonomy, TaxonomyDefinition, TaxonomyError};
use crate::utils::{app_data_dir, ensure_dir, write_atomic};

const CONFIG_FILE: &str = "config.json";

/// What the store does with a classifier mismatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MismatchPolicy {
    /// Reject the append and name the offending term.
    #[default]
    Block,
    /// Log a warning and commit anyway.
    WarnOnly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierStrategy {
    #[default]
    Keyword,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
    pub keyword_matching: KeywordMatching,
    pub fuzzy_threshold: u8,
    pub min_fuzzy_token_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::Keyword,
            keyword_matching: KeywordMatching::Token,
            fuzzy_threshold: FuzzyClassifier::DEFAULT_THRESHOLD,
            min_fuzzy_token_len: FuzzyClassifier::DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

impl ClassifierConfig {
    pub fn build(&self, taxonomy: Taxonomy) -> Box<dyn Classifier> {
        match self.strategy {
            ClassifierStrategy::Keyword => {
                Box::new(KeywordClassifier::new(taxonomy, self.keyword_matching))
            }
            ClassifierStrategy::Fuzzy => Box::new(FuzzyClassifier::new(
                taxonomy,
                self.fuzzy_threshold,
                self.min_fuzzy_token_len,
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mismatch_policy: MismatchPolicy,
    pub balance_scope: BalanceScope,
    pub budget_window: CeilingWindow,
    pub classifier: ClassifierConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<TaxonomyDefinition>,
}

impl EngineConfig {
    /// Validated taxonomy; the built-in one when none is configured.
    pub fn taxonomy(&self) -> std::result::Result<Taxonomy, TaxonomyError> {
        match &self.taxonomy {
            Some(definition) => Taxonomy::from_definition(definition.clone()),
            None => Ok(Taxonomy::standard()),
        }
    }

    pub fn guard(&self) -> BudgetGuard {
        BudgetGuard::new(self.balance_scope, self.budget_window)
    }

    pub fn classifier(&self) -> std::result::Result<Box<dyn Classifier>, TaxonomyError> {
        Ok(self.classifier.build(self.taxonomy()?))
    }
}

/// Loads and saves [`EngineConfig`] as JSON beneath a base directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Reads the configuration, falling back to defaults when no file exists.
    pub fn load(&self) -> Result<EngineConfig> {
        if !self.path.exists() {
            return Ok(EngineConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &EngineConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{standard_definition, MismatchRule, TransactionKind};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.mismatch_policy, MismatchPolicy::Block);
        assert_eq!(config.balance_scope, BalanceScope::AllTime);
        assert_eq!(config.budget_window, CeilingWindow::CandidateMonth);
        assert_eq!(config.classifier.fuzzy_threshold, 70);
    }

    #[test]
    fn save_then_load_preserves_policies() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = EngineConfig::default();
        config.mismatch_policy = MismatchPolicy::WarnOnly;
        config.classifier.strategy = ClassifierStrategy::Fuzzy;
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "mismatch_policy": "WarnOnly" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.mismatch_policy, MismatchPolicy::WarnOnly);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "not json").unwrap();
        assert!(matches!(manager.load(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn invalid_custom_taxonomy_fails_at_startup() {
        let mut definition = standard_definition();
        definition
            .rules
            .push(MismatchRule::for_kind(TransactionKind::Income, &["missing"]));
        let config = EngineConfig {
            taxonomy: Some(definition),
            ..EngineConfig::default()
        };
        assert!(config.classifier().is_err());
    }

    #[test]
    fn strategy_selects_classifier() {
        let mut config = EngineConfig::default();
        assert_eq!(config.classifier().unwrap().name(), "keyword");
        config.classifier.strategy = ClassifierStrategy::Fuzzy;
        assert_eq!(config.classifier().unwrap().name(), "fuzzy");
    }
}
