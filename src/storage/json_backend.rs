use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::core::errors::{LedgerError, Result};
use crate::utils::{app_data_dir, write_atomic};

use super::{LedgerDocument, StorageBackend};

const LEDGER_DIR: &str = "ledgers";

/// Stores a ledger document as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<app data dir>/ledgers/<name>.json`.
    pub fn named(name: &str) -> Self {
        Self::new(
            app_data_dir()
                .join(LEDGER_DIR)
                .join(format!("{}.json", canonical_name(name))),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, document: &LedgerDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), rows = document.transactions.len(), "ledger saved");
        Ok(())
    }

    fn load(&self) -> Result<LedgerDocument> {
        if !self.exists() {
            return Err(LedgerError::Storage(format!(
                "ledger file `{}` not found",
                self.path.display()
            )));
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

fn canonical_name(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "ledger".to_string()
    } else {
        slug.to_string()
    }
}
