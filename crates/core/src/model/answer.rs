use crate::model::{Question, QuestionId};

/// The user's selection for one question. `None` means unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
}

/// In-progress answers for a question set, one entry per question in question order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: Vec<Answer>,
}

impl AnswerSheet {
    /// Create one unanswered entry per question.
    #[must_use]
    pub fn for_questions(questions: &[Question]) -> Self {
        Self {
            answers: questions
                .iter()
                .map(|q| Answer {
                    question_id: q.id(),
                    selected: None,
                })
                .collect(),
        }
    }

    /// Rebuild a sheet from explicit entries.
    #[must_use]
    pub fn from_answers(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    /// Overwrite the selected option for `question_id`.
    ///
    /// Returns `false` without changing anything when the question is not part of
    /// this sheet or the option index is out of range for it.
    pub fn select(&mut self, questions: &[Question], question_id: QuestionId, option: usize) -> bool {
        let Some(question) = questions.iter().find(|q| q.id() == question_id) else {
            return false;
        };
        if !question.has_option(option) {
            return false;
        }
        match self.entry_mut(question_id) {
            Some(answer) => {
                answer.selected = Some(option);
                true
            }
            None => false,
        }
    }

    /// Reset `question_id` to unanswered. Returns `false` if the id is unknown.
    pub fn clear(&mut self, question_id: QuestionId) -> bool {
        match self.entry_mut(question_id) {
            Some(answer) => {
                answer.selected = None;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Selected option for `question_id`, if answered.
    #[must_use]
    pub fn selected(&self, question_id: QuestionId) -> Option<usize> {
        self.get(question_id).and_then(|a| a.selected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.selected.is_some()).count()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answered_count(),
            total: self.len(),
        }
    }

    fn entry_mut(&mut self, question_id: QuestionId) -> Option<&mut Answer> {
        self.answers.iter_mut().find(|a| a.question_id == question_id)
    }
}

/// Answered vs total questions for the active session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    /// Rounded completion percentage; 0 for an empty question set.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let scaled = (self.answered * 200 + self.total) / (self.total * 2);
        u32::try_from(scaled).unwrap_or(100)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<Question> {
        (0..3)
            .map(|i| {
                Question::new(
                    QuestionId::new(i),
                    format!("Q{i}"),
                    vec!["a".into(), "b".into(), "c".into()],
                    0,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn starts_with_one_unanswered_entry_per_question() {
        let qs = questions();
        let sheet = AnswerSheet::for_questions(&qs);
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.answered_count(), 0);
        let ids: Vec<_> = sheet.iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![QuestionId::new(0), QuestionId::new(1), QuestionId::new(2)]);
    }

    #[test]
    fn select_overwrites_previous_choice() {
        let qs = questions();
        let mut sheet = AnswerSheet::for_questions(&qs);
        assert!(sheet.select(&qs, QuestionId::new(1), 0));
        assert!(sheet.select(&qs, QuestionId::new(1), 2));
        assert_eq!(sheet.selected(QuestionId::new(1)), Some(2));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn out_of_range_selections_are_ignored() {
        let qs = questions();
        let mut sheet = AnswerSheet::for_questions(&qs);
        assert!(!sheet.select(&qs, QuestionId::new(99), 0));
        assert!(!sheet.select(&qs, QuestionId::new(0), 3));
        assert_eq!(sheet, AnswerSheet::for_questions(&qs));
    }

    #[test]
    fn clear_resets_to_unanswered() {
        let qs = questions();
        let mut sheet = AnswerSheet::for_questions(&qs);
        sheet.select(&qs, QuestionId::new(2), 1);
        assert!(sheet.clear(QuestionId::new(2)));
        assert_eq!(sheet.selected(QuestionId::new(2)), None);
        assert!(!sheet.clear(QuestionId::new(5)));
    }

    #[test]
    fn progress_percent_rounds() {
        assert_eq!(Progress { answered: 0, total: 0 }.percent(), 0);
        assert_eq!(Progress { answered: 1, total: 3 }.percent(), 33);
        assert_eq!(Progress { answered: 2, total: 3 }.percent(), 67);
        assert_eq!(Progress { answered: 15, total: 15 }.percent(), 100);
        assert!(Progress { answered: 15, total: 15 }.is_complete());
    }
}
