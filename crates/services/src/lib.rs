#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod events;
pub mod generation;
pub mod history_service;
pub mod quiz;

pub use mpt_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, GenerationError, HistoryError, QuizError};
pub use events::{LogEvents, Notice, NoticeLevel, QuizEvents};
pub use generation::{
    Difficulty, GenerationConfig, HttpQuestionSource, McqRequest, McqResponse, QuestionSource,
};
pub use history_service::{HistoryListItem, SessionHistoryService};
pub use quiz::{QuizSessionController, QuizSettings, QuizSnapshot, QuizState, StartOutcome};
