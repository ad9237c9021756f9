//! Per-account usage counters persisted to a flat JSON file.
//!
//! The whole map is loaded once and rewritten in full after every mutation.
//! Writes are neither atomic nor locked across processes: a crash between the
//! in-memory change and the write loses that change.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    #[serde(default)]
    pub inputs: u64,
    #[serde(default)]
    pub tokens: u64,
}

/// Selects which counter `StatsStore::increment` touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatField {
    Inputs,
    Tokens,
}

pub type StatsMap = BTreeMap<String, AccountStats>;

/// Persistence behind the store.
pub trait StatsBackend: Send {
    fn load(&self) -> Result<StatsMap>;
    fn save(&self, stats: &StatsMap) -> Result<()>;
}

/// Pretty-printed JSON file, `{ "<account>": { "inputs": n, "tokens": n } }`.
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsBackend for JsonFileBackend {
    fn load(&self) -> Result<StatsMap> {
        if !self.path.exists() {
            return Ok(StatsMap::new());
        }
        let txt = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&txt)?)
    }

    fn save(&self, stats: &StatsMap) -> Result<()> {
        let txt = serde_json::to_string_pretty(stats)?;
        std::fs::write(&self.path, txt)?;
        Ok(())
    }
}

/// In-memory mirror of the stats file.
pub struct StatsStore {
    stats: StatsMap,
    backend: Box<dyn StatsBackend>,
}

impl StatsStore {
    /// Load the current map from `backend`. An absent file is an empty store;
    /// a malformed one is an error.
    pub fn open(backend: impl StatsBackend + 'static) -> Result<Self> {
        let stats = backend.load()?;
        Ok(Self {
            stats,
            backend: Box::new(backend),
        })
    }

    /// Counters for `account`, zero if it was never recorded. Never persists.
    pub fn get(&self, account: &str) -> AccountStats {
        self.stats.get(account).copied().unwrap_or_default()
    }

    /// Add `amount` to one counter and persist. Returns the updated counters.
    pub fn increment(
        &mut self,
        account: &str,
        field: StatField,
        amount: u64,
    ) -> Result<AccountStats> {
        let entry = self.stats.entry(account.to_string()).or_default();
        match field {
            StatField::Inputs => entry.inputs = entry.inputs.saturating_add(amount),
            StatField::Tokens => entry.tokens = entry.tokens.saturating_add(amount),
        }
        let updated = *entry;
        self.backend.save(&self.stats)?;
        Ok(updated)
    }

    /// Zero both counters for `account` and persist.
    pub fn reset(&mut self, account: &str) -> Result<()> {
        self.stats.insert(account.to_string(), AccountStats::default());
        self.backend.save(&self.stats)
    }

    pub fn snapshot(&self) -> StatsMap {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    fn store_at(path: &Path) -> StatsStore {
        StatsStore::open(JsonFileBackend::new(path)).unwrap()
    }

    #[test]
    fn absent_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_at(&dir.path().join("stats.json"));
        assert!(store.snapshot().is_empty());
        assert_eq!(store.get("alpha"), AccountStats::default());
    }

    #[test]
    fn malformed_file_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = StatsStore::open(JsonFileBackend::new(&path)).err().unwrap();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn increment_persists_pretty_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut store = store_at(&path);

        store.increment("alpha", StatField::Inputs, 1).unwrap();
        let updated = store.increment("alpha", StatField::Tokens, 42).unwrap();
        assert_eq!(updated, AccountStats { inputs: 1, tokens: 42 });

        let txt = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            txt,
            "{\n  \"alpha\": {\n    \"inputs\": 1,\n    \"tokens\": 42\n  }\n}"
        );

        let reopened = store_at(&path);
        assert_eq!(reopened.get("alpha"), AccountStats { inputs: 1, tokens: 42 });
    }

    #[test]
    fn get_does_not_touch_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, r#"{"alpha":{"inputs":5,"tokens":100}}"#).unwrap();
        let store = store_at(&path);

        let a = store.get("alpha");
        let b = store.get("alpha");
        assert_eq!(a, b);
        assert_eq!(store.get("nobody"), AccountStats::default());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"alpha":{"inputs":5,"tokens":100}}"#
        );
        assert!(!store.snapshot().contains_key("nobody"));
    }

    #[test]
    fn reset_only_zeroes_the_named_account() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(
            &path,
            r#"{"alpha":{"inputs":5,"tokens":100},"beta":{"inputs":2,"tokens":9}}"#,
        )
        .unwrap();
        let mut store = store_at(&path);

        store.reset("alpha").unwrap();

        let reopened = store_at(&path);
        assert_eq!(reopened.get("alpha"), AccountStats::default());
        assert_eq!(reopened.get("beta"), AccountStats { inputs: 2, tokens: 9 });
    }

    #[test]
    fn missing_counter_fields_default_to_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, r#"{"alpha":{"inputs":3}}"#).unwrap();
        let store = store_at(&path);
        assert_eq!(store.get("alpha"), AccountStats { inputs: 3, tokens: 0 });
    }
}
