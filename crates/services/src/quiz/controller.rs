use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use mpt_core::Clock;
use mpt_core::catalog::QuizSubject;
use mpt_core::model::{AnswerSheet, Question, QuestionId, SessionResult};
use mpt_core::scoring;
use storage::SessionHistory;

use super::state::{QuizSettings, QuizSnapshot, QuizState, StartOutcome};
use crate::error::{GenerationError, QuizError};
use crate::events::{Notice, QuizEvents};
use crate::generation::{McqRequest, QuestionSource};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to generate MCQs. Please try again.";
pub const SAVE_FAILED_MESSAGE: &str = "Could not save this session to your history.";

/// Mutable state of the current attempt. Only touched under the controller lock.
#[derive(Default)]
struct Attempt {
    /// Incremented by every `start`; responses tagged with an older value are dropped.
    seq: u64,
    state: QuizState,
    subject: Option<QuizSubject>,
    questions: Vec<Question>,
    answers: AnswerSheet,
    result: Option<SessionResult>,
}

/// Drives one quiz attempt from fetch to scored review.
///
/// The controller owns the in-progress answers. Scored results are handed to the
/// session history as soon as they are computed.
pub struct QuizSessionController {
    clock: Clock,
    settings: QuizSettings,
    source: Arc<dyn QuestionSource>,
    history: Arc<SessionHistory>,
    events: Arc<dyn QuizEvents>,
    attempt: Mutex<Attempt>,
}

impl QuizSessionController {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        history: Arc<SessionHistory>,
        events: Arc<dyn QuizEvents>,
    ) -> Self {
        Self {
            clock,
            settings: QuizSettings::default(),
            source,
            history,
            events,
            attempt: Mutex::new(Attempt::default()),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.lock().state
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let attempt = self.lock();
        QuizSnapshot {
            state: attempt.state,
            subject: attempt.subject.clone(),
            questions: attempt.questions.clone(),
            answers: attempt.answers.clone(),
            result: attempt.result.clone(),
        }
    }

    /// Fetch a fresh question set for `subject`, discarding the current attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Generation` when the fetch fails or exceeds the request
    /// timeout. The controller is left in `QuizState::Error` with no questions and
    /// an error notice has been emitted.
    ///
    /// Returns `QuizError::BlankSubject` without touching the current attempt when
    /// the subject name is blank.
    pub async fn start(&self, subject: QuizSubject) -> Result<StartOutcome, QuizError> {
        if subject.is_blank() {
            return Err(QuizError::BlankSubject);
        }
        let (seq, request) = {
            let mut attempt = self.lock();
            attempt.seq = attempt.seq.wrapping_add(1);
            attempt.state = QuizState::Loading;
            attempt.questions.clear();
            attempt.answers = AnswerSheet::default();
            attempt.result = None;
            let request = self.request_for(&subject);
            attempt.subject = Some(subject);
            (attempt.seq, request)
        };
        debug!("quiz #{seq}: loading {:?}", request.subject);

        let timeout = self.settings.request_timeout;
        let fetched = match tokio::time::timeout(timeout, self.source.generate(&request)).await {
            Ok(fetched) => fetched,
            Err(_) => Err(GenerationError::Timeout(timeout)),
        };

        let mut attempt = self.lock();
        if attempt.seq != seq {
            debug!("quiz #{seq}: superseded by #{}, dropping response", attempt.seq);
            return Ok(StartOutcome::Superseded);
        }

        match fetched {
            Ok(questions) => {
                let question_count = questions.len();
                attempt.answers = AnswerSheet::for_questions(&questions);
                attempt.questions = questions;
                attempt.state = QuizState::Ready;
                debug!("quiz #{seq}: ready with {question_count} question(s)");
                Ok(StartOutcome::Ready { question_count })
            }
            Err(err) => {
                attempt.state = QuizState::Error;
                drop(attempt);
                warn!("quiz #{seq}: failed to fetch questions: {err}");
                self.events.notify(Notice::error(FETCH_FAILED_MESSAGE));
                Err(err.into())
            }
        }
    }

    /// Fetch a new set for the current subject. Used for both "retry" after a
    /// failure and "next set" after scoring.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSubject` if `start` was never called, otherwise the
    /// same errors as `start`.
    pub async fn retry(&self) -> Result<StartOutcome, QuizError> {
        let subject = self.lock().subject.clone().ok_or(QuizError::NoSubject)?;
        self.start(subject).await
    }

    /// Alias of [`Self::retry`] for the "next set" action.
    ///
    /// # Errors
    ///
    /// See [`Self::retry`].
    pub async fn next(&self) -> Result<StartOutcome, QuizError> {
        self.retry().await
    }

    /// Select `option` for `question_id`.
    ///
    /// Returns `Ok(false)` without changing anything once the quiz is scored, or
    /// when the question or option does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotReady` while idle, loading, or failed.
    pub fn set_answer(&self, question_id: QuestionId, option: usize) -> Result<bool, QuizError> {
        let mut attempt = self.lock();
        match attempt.state {
            QuizState::Ready => {}
            QuizState::Scored => return Ok(false),
            other => return Err(QuizError::NotReady(other)),
        }

        let Attempt {
            questions, answers, ..
        } = &mut *attempt;
        let changed = answers.select(questions, question_id, option);
        if !changed {
            debug!("ignoring answer {option} for unknown or out-of-range question {question_id}");
        }
        Ok(changed)
    }

    /// Score the current answers, record the result in history and move to `Scored`.
    ///
    /// A failed history write is logged and reported as a notice; the scored
    /// result is still returned.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyScored` when called twice for the same set and
    /// `QuizError::NotReady` before a set has loaded.
    pub async fn score(&self) -> Result<SessionResult, QuizError> {
        let (result, celebrate) = {
            let mut attempt = self.lock();
            match attempt.state {
                QuizState::Ready => {}
                QuizState::Scored => return Err(QuizError::AlreadyScored),
                other => return Err(QuizError::NotReady(other)),
            }
            let subject = attempt.subject.clone().ok_or(QuizError::NoSubject)?;

            let score = scoring::score(&attempt.questions, &attempt.answers);
            let celebrate = score.celebrates(attempt.questions.len());
            let result = SessionResult::new(score, self.clock.now(), subject.name, subject.group);

            attempt.result = Some(result.clone());
            attempt.state = QuizState::Scored;
            (result, celebrate)
        };

        let totals = result.totals();
        info!(
            "scored {}: {} right, {} wrong, {} empty",
            result.subject(),
            totals.right,
            totals.wrong,
            totals.empty
        );

        if let Err(err) = self.history.append(&result).await {
            warn!("failed to persist session result: {err}");
            self.events.notify(Notice::error(SAVE_FAILED_MESSAGE));
        }

        if celebrate {
            self.events.celebrate(&result);
        }

        Ok(result)
    }

    fn request_for(&self, subject: &QuizSubject) -> McqRequest {
        McqRequest {
            subject: subject.name.clone(),
            count: self.settings.question_count,
            difficulty: self.settings.difficulty,
            pakistan_only: self.settings.pakistan_only,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Attempt> {
        self.attempt.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
