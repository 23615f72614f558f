mod answer;
mod ids;
mod question;
mod result;

pub use ids::{ParseIdError, QuestionId};

pub use answer::{Answer, AnswerSheet, Progress};
pub use question::{Question, QuestionError};
pub use result::{QuestionStatus, SessionResult, SessionResultError};
