use std::time::Duration;

use mpt_core::catalog::QuizSubject;
use mpt_core::model::{AnswerSheet, Progress, Question, SessionResult};

use crate::generation::{DEFAULT_TIMEOUT, Difficulty};

/// Lifecycle of one quiz attempt.
///
/// `Idle -> Loading -> Ready -> Scored`, with `Loading -> Error` on a failed
/// fetch. Any state can go back to `Loading` through `start`, `retry` or `next`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuizState {
    #[default]
    Idle,
    Loading,
    Ready,
    Scored,
    Error,
}

/// What a quiz asks the generation endpoint for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    pub question_count: u32,
    pub difficulty: Difficulty,
    pub pakistan_only: bool,
    /// Upper bound on a single fetch, independent of the transport's own timeout.
    pub request_timeout: Duration,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: 15,
            difficulty: Difficulty::Medium,
            pakistan_only: true,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Result of a `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The fetched set was installed and the quiz is answerable.
    Ready { question_count: usize },
    /// A newer `start` began while this one was in flight; its response was dropped.
    Superseded,
}

/// Read-only copy of the controller state for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub state: QuizState,
    pub subject: Option<QuizSubject>,
    pub questions: Vec<Question>,
    pub answers: AnswerSheet,
    pub result: Option<SessionResult>,
}

impl QuizSnapshot {
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.answers.progress()
    }
}
