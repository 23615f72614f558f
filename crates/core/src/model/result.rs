use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::QuestionId;
use crate::scoring::{Score, ScoreTotals};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionResultError {
    #[error("{bucket} total ({total}) does not match its {len} question ids")]
    CountMismatch {
        bucket: &'static str,
        total: u32,
        len: usize,
    },

    #[error("question {0} is classified more than once")]
    DuplicateQuestion(QuestionId),

    #[error("subject cannot be empty")]
    EmptySubject,
}

/// Review status of a single question after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Correct,
    Wrong,
    Empty,
}

/// Immutable outcome of one scored quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    score: Score,
    timestamp: DateTime<Utc>,
    subject: String,
    group: Option<String>,
}

impl SessionResult {
    /// Record a freshly computed score.
    ///
    /// `timestamp` should come from the services layer clock.
    #[must_use]
    pub fn new(
        score: Score,
        timestamp: DateTime<Utc>,
        subject: impl Into<String>,
        group: Option<String>,
    ) -> Self {
        Self {
            score,
            timestamp,
            subject: subject.into(),
            group,
        }
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionResultError::CountMismatch` if a stored total disagrees with
    /// its id list, `SessionResultError::DuplicateQuestion` if an id appears in more
    /// than one list, and `SessionResultError::EmptySubject` for a blank subject.
    pub fn from_persisted(
        score: Score,
        timestamp: DateTime<Utc>,
        subject: String,
        group: Option<String>,
    ) -> Result<Self, SessionResultError> {
        if subject.trim().is_empty() {
            return Err(SessionResultError::EmptySubject);
        }

        let buckets = [
            ("right", score.totals.right, &score.right),
            ("wrong", score.totals.wrong, &score.wrong),
            ("empty", score.totals.empty, &score.empty),
        ];
        let mut seen = HashSet::new();
        for (bucket, total, ids) in buckets {
            if usize::try_from(total).ok() != Some(ids.len()) {
                return Err(SessionResultError::CountMismatch {
                    bucket,
                    total,
                    len: ids.len(),
                });
            }
            for id in ids {
                if !seen.insert(*id) {
                    return Err(SessionResultError::DuplicateQuestion(*id));
                }
            }
        }

        Ok(Self::new(score, timestamp, subject, group))
    }

    #[must_use]
    pub fn score(&self) -> &Score {
        &self.score
    }

    #[must_use]
    pub fn right(&self) -> &[QuestionId] {
        &self.score.right
    }

    #[must_use]
    pub fn wrong(&self) -> &[QuestionId] {
        &self.score.wrong
    }

    #[must_use]
    pub fn empty(&self) -> &[QuestionId] {
        &self.score.empty
    }

    #[must_use]
    pub fn totals(&self) -> ScoreTotals {
        self.score.totals
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Status of `id` in this result. Ids outside the scored set read as `Empty`.
    #[must_use]
    pub fn status_of(&self, id: QuestionId) -> QuestionStatus {
        if self.score.right.contains(&id) {
            QuestionStatus::Correct
        } else if self.score.wrong.contains(&id) {
            QuestionStatus::Wrong
        } else {
            QuestionStatus::Empty
        }
    }
}
