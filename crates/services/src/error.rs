//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use mpt_core::model::{QuestionError, QuestionId};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

use crate::quiz::QuizState;

/// Errors emitted while fetching a question set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("question generation failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed question: {0}")]
    InvalidQuestion(#[from] QuestionError),
    #[error("question id {0} appears more than once")]
    DuplicateQuestion(QuestionId),
    #[error("invalid generation endpoint url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Errors emitted by `QuizSessionController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz is not ready (state: {0:?})")]
    NotReady(QuizState),
    #[error("quiz has already been scored")]
    AlreadyScored,
    #[error("no subject has been started yet")]
    NoSubject,
    #[error("subject name cannot be blank")]
    BlankSubject,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Errors emitted by `SessionHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("invalid session timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
