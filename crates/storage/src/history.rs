//! Bounded, most-recent-first log of scored quiz sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use mpt_core::model::{QuestionId, SessionResult, SessionResultError};
use mpt_core::scoring::{Score, ScoreTotals};
use serde::{Deserialize, Serialize};

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the JSON-encoded session log.
pub const HISTORY_KEY: &str = "quiz-sessions";

/// Maximum number of sessions kept; older entries are evicted on append.
pub const HISTORY_CAP: usize = 20;

/// Persisted shape of a session result.
///
/// Mirrors `SessionResult` so the JSON layout stays independent of the domain type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResultRecord {
    pub right: Vec<QuestionId>,
    pub wrong: Vec<QuestionId>,
    pub empty: Vec<QuestionId>,
    pub totals: TotalsRecord,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRecord {
    pub right: u32,
    pub wrong: u32,
    pub empty: u32,
}

impl SessionResultRecord {
    #[must_use]
    pub fn from_result(result: &SessionResult) -> Self {
        let totals = result.totals();
        Self {
            right: result.right().to_vec(),
            wrong: result.wrong().to_vec(),
            empty: result.empty().to_vec(),
            totals: TotalsRecord {
                right: totals.right,
                wrong: totals.wrong,
                empty: totals.empty,
            },
            timestamp: result.timestamp(),
            subject: result.subject().to_owned(),
            group: result.group().map(str::to_owned),
        }
    }

    /// Convert the record back into a domain `SessionResult`.
    ///
    /// # Errors
    ///
    /// Returns `SessionResultError` if totals and id lists disagree.
    pub fn into_result(self) -> Result<SessionResult, SessionResultError> {
        let score = Score {
            right: self.right,
            wrong: self.wrong,
            empty: self.empty,
            totals: ScoreTotals {
                right: self.totals.right,
                wrong: self.totals.wrong,
                empty: self.totals.empty,
            },
        };
        SessionResult::from_persisted(score, self.timestamp, self.subject, self.group)
    }
}

/// Session history persisted through a `KeyValueStore`.
///
/// Assumes a single writer; concurrent appends from separate processes may lose entries.
#[derive(Clone)]
pub struct SessionHistory {
    store: Arc<dyn KeyValueStore>,
}

impl SessionHistory {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All persisted sessions, most recent first.
    ///
    /// A missing or unparseable payload reads as an empty history. Entries that
    /// fail validation are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backing store cannot be read.
    pub async fn list(&self) -> Result<Vec<SessionResult>, StorageError> {
        let records = self.load_records().await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let timestamp = record.timestamp;
            match record.into_result() {
                Ok(result) => out.push(result),
                Err(err) => warn!("skipping invalid session entry at {timestamp}: {err}"),
            }
        }
        Ok(out)
    }

    /// Insert `result` at the front, evicting the oldest entries beyond the cap.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read or written.
    pub async fn append(&self, result: &SessionResult) -> Result<(), StorageError> {
        let mut records = self.load_records().await?;
        records.insert(0, SessionResultRecord::from_result(result));
        if records.len() > HISTORY_CAP {
            debug!("evicting {} old session(s)", records.len() - HISTORY_CAP);
            records.truncate(HISTORY_CAP);
        }
        self.save_records(&records).await
    }

    /// Delete the session whose timestamp equals `timestamp`.
    ///
    /// Returns `false` and leaves the log untouched when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read or written.
    pub async fn remove(&self, timestamp: DateTime<Utc>) -> Result<bool, StorageError> {
        let mut records = self.load_records().await?;
        let before = records.len();
        records.retain(|r| r.timestamp != timestamp);
        if records.len() == before {
            return Ok(false);
        }
        self.save_records(&records).await?;
        Ok(true)
    }

    /// Drop the whole log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(HISTORY_KEY).await
    }

    async fn load_records(&self) -> Result<Vec<SessionResultRecord>, StorageError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("ignoring corrupt session history: {err}");
                return Ok(Vec::new());
            }
        };
        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<SessionResultRecord>(entry) {
                Ok(record) => records.push(record),
                Err(err) => warn!("skipping unreadable session entry #{index}: {err}"),
            }
        }
        Ok(records)
    }

    async fn save_records(&self, records: &[SessionResultRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(HISTORY_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use chrono::Duration;
    use mpt_core::time::fixed_now;

    fn result_at(offset_secs: i64, subject: &str) -> SessionResult {
        let score = Score {
            right: vec![QuestionId::new(1)],
            wrong: vec![QuestionId::new(2)],
            empty: vec![QuestionId::new(3)],
            totals: ScoreTotals {
                right: 1,
                wrong: 1,
                empty: 1,
            },
        };
        SessionResult::new(
            score,
            fixed_now() + Duration::seconds(offset_secs),
            subject,
            None,
        )
    }

    fn history() -> (SessionHistory, InMemoryStore) {
        let store = InMemoryStore::new();
        (SessionHistory::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (history, _) = history();
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_keeps_most_recent_first_and_caps_at_twenty() {
        let (history, _) = history();
        for i in 0..25 {
            history
                .append(&result_at(i, &format!("Subject {i}")))
                .await
                .unwrap();
        }

        let listed = history.list().await.unwrap();
        assert_eq!(listed.len(), HISTORY_CAP);
        assert_eq!(listed[0].subject(), "Subject 24");
        assert_eq!(listed[19].subject(), "Subject 5");
        assert!(listed.iter().all(|r| r.timestamp() >= fixed_now() + Duration::seconds(5)));
    }

    #[tokio::test]
    async fn remove_deletes_matching_timestamp_only() {
        let (history, _) = history();
        history.append(&result_at(0, "Algebra")).await.unwrap();
        history.append(&result_at(1, "Geometry")).await.unwrap();

        let removed = history
            .remove(fixed_now() + Duration::seconds(0))
            .await
            .unwrap();

        assert!(removed);
        let listed = history.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].subject(), "Geometry");
    }

    #[tokio::test]
    async fn remove_missing_timestamp_leaves_log_unchanged() {
        let (history, store) = history();
        history.append(&result_at(0, "Algebra")).await.unwrap();
        let before = store.get(HISTORY_KEY).await.unwrap();

        let removed = history
            .remove(fixed_now() + Duration::days(1))
            .await
            .unwrap();

        assert!(!removed);
        assert_eq!(store.get(HISTORY_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn clear_then_list_is_empty() {
        let (history, store) = history();
        history.append(&result_at(0, "Algebra")).await.unwrap();
        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
        assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_payload_reads_as_empty_and_is_replaced_on_append() {
        let (history, store) = history();
        store.set(HISTORY_KEY, "{not json").await.unwrap();

        assert!(history.list().await.unwrap().is_empty());

        history.append(&result_at(0, "Algebra")).await.unwrap();
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_entries_are_skipped() {
        let (history, store) = history();
        let raw = r#"[
            {"right":[1],"wrong":[],"empty":[],"totals":{"right":1,"wrong":0,"empty":0},
             "timestamp":"2024-05-01T10:00:00.000Z","subject":"Algebra"},
            {"right":[1],"wrong":[],"empty":[],"totals":{"right":4,"wrong":0,"empty":0},
             "timestamp":"2024-05-01T09:00:00.000Z","subject":"Geometry"}
        ]"#;
        store.set(HISTORY_KEY, raw).await.unwrap();

        let listed = history.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].subject(), "Algebra");
    }

    #[tokio::test]
    async fn mistyped_entry_does_not_take_valid_entries_with_it() {
        let (history, store) = history();
        let raw = r#"[
            {"right":[1],"wrong":[],"empty":[],"totals":{"right":1,"wrong":0,"empty":0},
             "timestamp":"2024-05-01T10:00:00.000Z","subject":"Algebra"},
            {"right":["x"],"wrong":[],"empty":[],"totals":{"right":1,"wrong":0,"empty":0},
             "timestamp":"2024-05-01T09:30:00.000Z","subject":"Broken"},
            {"right":[],"wrong":[2],"empty":[],"totals":{"right":0,"wrong":1,"empty":0},
             "timestamp":"2024-05-01T09:00:00.000Z","subject":"Geometry"}
        ]"#;
        store.set(HISTORY_KEY, raw).await.unwrap();

        let before: Vec<_> = history
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.subject().to_owned())
            .collect();
        assert_eq!(before, vec!["Algebra", "Geometry"]);

        history.append(&result_at(0, "New")).await.unwrap();

        let after: Vec<_> = history
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.subject().to_owned())
            .collect();
        assert_eq!(after, vec!["New", "Algebra", "Geometry"]);
    }

    #[tokio::test]
    async fn persisted_layout_matches_browser_shape() {
        let (history, store) = history();
        let with_group = SessionResult::new(
            result_at(0, "Algebra").score().clone(),
            fixed_now(),
            "Algebra",
            Some("General Ability".into()),
        );
        history.append(&with_group).await.unwrap();
        history.append(&result_at(1, "Geometry")).await.unwrap();

        let raw = store.get(HISTORY_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let newest = &value[0];
        assert_eq!(newest["subject"], "Geometry");
        assert_eq!(newest["right"], serde_json::json!([1]));
        assert_eq!(newest["totals"], serde_json::json!({"right": 1, "wrong": 1, "empty": 1}));
        let stamped: DateTime<Utc> = newest["timestamp"].as_str().unwrap().parse().unwrap();
        assert_eq!(stamped, fixed_now() + Duration::seconds(1));
        assert!(newest.get("group").is_none());
        assert_eq!(value[1]["group"], "General Ability");
    }
}
