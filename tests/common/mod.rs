#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use ledger_core::{
    config::ConfigManager, AppendOptions, EngineConfig, LedgerStore, NewTransaction,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Config manager rooted in an isolated directory.
pub fn setup_test_env() -> (ConfigManager, PathBuf) {
    let base = temp_base();
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (config_manager, base)
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub fn empty_store() -> LedgerStore {
    LedgerStore::new(&EngineConfig::default()).expect("default config is valid")
}

pub fn store_with(config: &EngineConfig) -> LedgerStore {
    LedgerStore::new(config).expect("config is valid")
}

/// Appends without a ceiling and panics on rejection.
pub fn seed(store: &mut LedgerStore, candidate: NewTransaction) {
    store
        .append(candidate, AppendOptions::default())
        .expect("seed transaction accepted");
}

/// Salary of 5000 on March 1st, then 1800 of March spending.
pub fn march_with_spending() -> LedgerStore {
    let mut store = empty_store();
    seed(&mut store, NewTransaction::income("Salary", dec(5000), day(2024, 3, 1)));
    seed(
        &mut store,
        NewTransaction::expense("Rent", dec(1200), day(2024, 3, 2)).with_description("March rent"),
    );
    seed(
        &mut store,
        NewTransaction::expense("Food", dec(600), day(2024, 3, 9)).with_description("weekly shop"),
    );
    store
}
