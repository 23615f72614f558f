use std::sync::Arc;

use chrono::{DateTime, Utc};

use mpt_core::model::SessionResult;
use mpt_core::scoring::{ScoreBand, ScoreTotals};
use storage::SessionHistory;

use crate::error::HistoryError;

/// Presentation-agnostic row of the session history list.
///
/// No pre-formatted strings; the caller formats timestamps and percentages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListItem {
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub group: Option<String>,
    pub totals: ScoreTotals,
    pub percent: u32,
    pub band: ScoreBand,
}

impl HistoryListItem {
    #[must_use]
    pub fn from_result(result: &SessionResult) -> Self {
        let totals = result.totals();
        Self {
            timestamp: result.timestamp(),
            subject: result.subject().to_owned(),
            group: result.group().map(str::to_owned),
            totals,
            percent: totals.percent(),
            band: totals.band(),
        }
    }
}

/// Listing view over the persisted session history.
#[derive(Clone)]
pub struct SessionHistoryService {
    history: Arc<SessionHistory>,
}

impl SessionHistoryService {
    #[must_use]
    pub fn new(history: Arc<SessionHistory>) -> Self {
        Self { history }
    }

    /// Past sessions, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on backend failures. Corrupt history is
    /// not an error and lists as empty.
    pub async fn list(&self) -> Result<Vec<HistoryListItem>, HistoryError> {
        let results = self.history.list().await?;
        Ok(results.iter().map(HistoryListItem::from_result).collect())
    }

    /// Full result for the session recorded at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on backend failures.
    pub async fn get(&self, timestamp: DateTime<Utc>) -> Result<Option<SessionResult>, HistoryError> {
        let results = self.history.list().await?;
        Ok(results.into_iter().find(|r| r.timestamp() == timestamp))
    }

    /// Delete one session. Returns `false` if no session has that timestamp.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on backend failures.
    pub async fn remove(&self, timestamp: DateTime<Utc>) -> Result<bool, HistoryError> {
        Ok(self.history.remove(timestamp).await?)
    }

    /// Like [`Self::remove`], taking the ISO-8601 timestamp as shown to the user.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidTimestamp` if `raw` is not RFC 3339.
    pub async fn remove_by_str(&self, raw: &str) -> Result<bool, HistoryError> {
        let timestamp = DateTime::parse_from_rfc3339(raw.trim())?.with_timezone(&Utc);
        self.remove(timestamp).await
    }

    /// Delete every session.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on backend failures.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        Ok(self.history.clear().await?)
    }
}
