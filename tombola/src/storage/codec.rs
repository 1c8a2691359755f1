//! Validated (de)serialization of the persisted draw snapshot.

use super::Storage;
use crate::game::HistoryRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashSet, sync::Arc};

/// The slice of game state that survives restarts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub drawn_numbers: Vec<u32>,
    /// Newest first
    pub history: Vec<HistoryRecord>,
}

/// Result of reading a persisted snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Decoded and validated snapshot, if one was stored
    pub state: Option<PersistedSnapshot>,

    /// A value was stored but could not be trusted
    pub invalid: bool,
}

impl ParseOutcome {
    fn absent() -> Self {
        Self::default()
    }

    fn invalid() -> Self {
        Self {
            state: None,
            invalid: true,
        }
    }

    fn valid(state: PersistedSnapshot) -> Self {
        Self {
            state: Some(state),
            invalid: false,
        }
    }
}

/// Reads and writes [`PersistedSnapshot`]s through a [`Storage`] port
///
/// Nothing here returns an error: corrupt values come back flagged as
/// invalid, and failed writes are logged and dropped.
#[derive(Clone)]
pub struct PersistenceCodec {
    storage: Arc<dyn Storage>,
    max_number: u32,
}

impl PersistenceCodec {
    /// Create a codec validating numbers against `1..=max_number`
    pub fn new(storage: Arc<dyn Storage>, max_number: u32) -> Self {
        Self {
            storage,
            max_number,
        }
    }

    /// Underlying storage port
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Read and validate the snapshot stored under `key`
    pub fn parse(&self, key: &str) -> ParseOutcome {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ParseOutcome::absent(),
            Err(e) => {
                log::warn!("Failed to read persisted state '{}': {}", key, e);
                return ParseOutcome::absent();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Persisted state '{}' is not valid JSON: {}", key, e);
                return ParseOutcome::invalid();
            }
        };

        if let Err(reason) = self.validate_shape(&value) {
            log::warn!("Persisted state '{}' failed validation: {}", key, reason);
            return ParseOutcome::invalid();
        }

        match serde_json::from_value::<PersistedSnapshot>(value) {
            Ok(snapshot) => ParseOutcome::valid(snapshot),
            Err(e) => {
                log::warn!("Persisted state '{}' could not be decoded: {}", key, e);
                ParseOutcome::invalid()
            }
        }
    }

    /// Encode and store `snapshot` under `key`, best effort
    pub fn persist(&self, key: &str, snapshot: &PersistedSnapshot) {
        let encoded = match serde_json::to_string(snapshot) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("Failed to encode state for '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.storage.set(key, &encoded) {
            log::warn!("Failed to persist state '{}': {}", key, e);
        }
    }

    /// Remove the snapshot stored under `key`, best effort
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            log::warn!("Failed to clear persisted state '{}': {}", key, e);
        }
    }

    fn validate_shape(&self, value: &Value) -> Result<(), String> {
        let drawn = value
            .get("drawnNumbers")
            .and_then(Value::as_array)
            .ok_or("`drawnNumbers` must be a list")?;

        let mut seen = HashSet::with_capacity(drawn.len());
        for number in drawn {
            let number = number
                .as_u64()
                .ok_or_else(|| format!("drawn number {number} is not an integer"))?;

            if number < 1 || number > u64::from(self.max_number) {
                return Err(format!(
                    "drawn number {number} outside 1..={}",
                    self.max_number
                ));
            }

            if !seen.insert(number) {
                return Err(format!("drawn number {number} appears twice"));
            }
        }

        let history = value
            .get("history")
            .and_then(Value::as_array)
            .ok_or("`history` must be a list")?;

        if history
            .iter()
            .any(|record| record.get("number").and_then(Value::as_u64).is_none())
        {
            return Err("history record without an integer `number`".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::Sponsor,
        storage::{MemoryStorage, StorageError, StorageResult},
    };

    const KEY: &str = "state";

    fn codec_with(raw: Option<&str>) -> PersistenceCodec {
        let storage = MemoryStorage::new();
        if let Some(raw) = raw {
            storage.set(KEY, raw).unwrap();
        }
        PersistenceCodec::new(Arc::new(storage), 90)
    }

    #[test]
    fn test_absent_key() {
        assert_eq!(codec_with(None).parse(KEY), ParseOutcome::absent());
    }

    #[test]
    fn test_round_trip_single_number() {
        let codec = codec_with(None);
        codec.persist(
            KEY,
            &PersistedSnapshot {
                drawn_numbers: vec![42],
                history: vec![],
            },
        );

        let outcome = codec.parse(KEY);
        assert!(!outcome.invalid);
        assert_eq!(outcome.state.unwrap().drawn_numbers, vec![42]);
    }

    #[test]
    fn test_history_with_sponsor_decodes() {
        let codec = codec_with(None);
        let snapshot = PersistedSnapshot {
            drawn_numbers: vec![1, 2],
            history: vec![
                HistoryRecord::now(2, Some(Sponsor::new("a.png", "https://a.example"))),
                HistoryRecord::now(1, None),
            ],
        };
        codec.persist(KEY, &snapshot);

        assert_eq!(codec.parse(KEY).state, Some(snapshot));
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            "not-json",
            "[]",
            r#"{"drawnNumbers": [1], "history": {}}"#,
            r#"{"history": []}"#,
            r#"{"drawnNumbers": [0], "history": []}"#,
            r#"{"drawnNumbers": [91], "history": []}"#,
            r#"{"drawnNumbers": ["7"], "history": []}"#,
            r#"{"drawnNumbers": [7.5], "history": []}"#,
            r#"{"drawnNumbers": [7, 7], "history": []}"#,
            r#"{"drawnNumbers": [7], "history": [{"number": "7"}]}"#,
            r#"{"drawnNumbers": [7], "history": [{"timestamp": "2024-05-01T18:30:00Z"}]}"#,
        ];

        for raw in cases {
            let outcome = codec_with(Some(raw)).parse(KEY);
            assert!(outcome.invalid, "{raw} should be rejected");
            assert!(outcome.state.is_none());
        }
    }

    #[test]
    fn test_sparse_history_records_are_kept() {
        let cases = [
            r#"{"drawnNumbers": [7], "history": [{"number": 7}]}"#,
            r#"{"drawnNumbers": [7], "history": [{"number": 7, "timestamp": "2024-05-01T18:30:00"}]}"#,
            r#"{"drawnNumbers": [7], "history": [{"number": 7, "timestamp": "yesterday"}]}"#,
            r#"{"drawnNumbers": [7], "history": [{"number": 7, "sponsor": "acme"}]}"#,
        ];

        for raw in cases {
            let outcome = codec_with(Some(raw)).parse(KEY);
            assert!(!outcome.invalid, "{raw} should be accepted");

            let state = outcome.state.unwrap();
            assert_eq!(state.drawn_numbers, vec![7]);
            assert_eq!(state.history.len(), 1);
            assert_eq!(state.history[0].number, 7);
            assert_eq!(state.history[0].sponsor, None);
        }
    }

    #[test]
    fn test_bound_follows_configuration() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(KEY, r#"{"drawnNumbers": [75], "history": []}"#)
            .unwrap();

        assert!(PersistenceCodec::new(storage.clone(), 75).parse(KEY).state.is_some());
        assert!(PersistenceCodec::new(storage, 74).parse(KEY).invalid);
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("denied".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("denied".to_string()))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("denied".to_string()))
        }
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let codec = PersistenceCodec::new(Arc::new(BrokenStorage), 90);

        codec.persist(KEY, &PersistedSnapshot::default());
        codec.clear(KEY);
        assert_eq!(codec.parse(KEY), ParseOutcome::absent());
    }
}
