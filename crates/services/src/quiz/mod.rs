mod controller;
mod state;

pub use controller::{FETCH_FAILED_MESSAGE, QuizSessionController, SAVE_FAILED_MESSAGE};
pub use state::{QuizSettings, QuizSnapshot, QuizState, StartOutcome};
