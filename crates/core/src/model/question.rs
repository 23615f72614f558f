use thiserror::Error;

use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id} marks option {index} as correct but only has {len} options")]
    CorrectIndexOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },
}

/// A multiple-choice question as received from the generation endpoint.
///
/// The correct option index is always a valid index into `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    statement: String,
    options: Vec<String>,
    correct_option_index: usize,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` when `options` is empty and
    /// `QuestionError::CorrectIndexOutOfRange` when the correct index does not
    /// point at an option.
    pub fn new(
        id: QuestionId,
        statement: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }
        if correct_option_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                id,
                index: correct_option_index,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            statement: statement.into(),
            options,
            correct_option_index,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option_index(&self) -> usize {
        self.correct_option_index
    }

    /// The text of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_option_index]
    }

    #[must_use]
    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    #[test]
    fn accepts_in_range_correct_index() {
        let q = Question::new(QuestionId::new(1), "2 + 2?", options(4), 3).unwrap();
        assert_eq!(q.correct_option(), "option 3");
        assert!(q.has_option(3));
        assert!(!q.has_option(4));
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let err = Question::new(QuestionId::new(7), "?", options(2), 2).unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectIndexOutOfRange {
                id: QuestionId::new(7),
                index: 2,
                len: 2,
            }
        );
    }

    #[test]
    fn rejects_empty_options() {
        let err = Question::new(QuestionId::new(1), "?", Vec::new(), 0).unwrap_err();
        assert_eq!(err, QuestionError::NoOptions { id: QuestionId::new(1) });
    }
}
