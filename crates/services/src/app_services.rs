use std::sync::Arc;

use storage::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::events::QuizEvents;
use crate::generation::{GenerationConfig, HttpQuestionSource, QuestionSource};
use crate::history_service::SessionHistoryService;
use crate::quiz::{QuizSessionController, QuizSettings};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    history: Arc<SessionHistoryService>,
    quiz: Arc<QuizSessionController>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP generation endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// generation endpoint URL is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        generation: &GenerationConfig,
        events: Arc<dyn QuizEvents>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let source: Arc<dyn QuestionSource> = Arc::new(HttpQuestionSource::new(generation)?);
        let settings = QuizSettings {
            request_timeout: generation.timeout,
            ..QuizSettings::default()
        };
        Ok(Self::assemble(storage, clock, source, events, settings))
    }

    /// Build services over in-memory storage with the given question source.
    #[must_use]
    pub fn in_memory(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        events: Arc<dyn QuizEvents>,
    ) -> Self {
        Self::assemble(
            Storage::in_memory(),
            clock,
            source,
            events,
            QuizSettings::default(),
        )
    }

    fn assemble(
        storage: Storage,
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        events: Arc<dyn QuizEvents>,
        settings: QuizSettings,
    ) -> Self {
        let history = Arc::new(SessionHistoryService::new(Arc::clone(&storage.history)));
        let quiz = Arc::new(
            QuizSessionController::new(clock, source, Arc::clone(&storage.history), events)
                .with_settings(settings),
        );
        Self {
            storage,
            history,
            quiz,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn history(&self) -> Arc<SessionHistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizSessionController> {
        Arc::clone(&self.quiz)
    }
}
