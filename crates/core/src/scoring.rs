//! Right/wrong/empty classification of a finished question set.

use crate::model::{AnswerSheet, Question, QuestionId};

/// Share of right answers (in percent, rounded up) required for a celebration.
pub const CELEBRATION_PERCENT: usize = 66;

/// Per-bucket counts of a scored session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTotals {
    pub right: u32,
    pub wrong: u32,
    pub empty: u32,
}

impl ScoreTotals {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.right.saturating_add(self.wrong).saturating_add(self.empty)
    }

    /// Rounded percentage of right answers; 0 for an empty session.
    #[must_use]
    pub fn percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let (right, total) = (u64::from(self.right), u64::from(total));
        u32::try_from((right * 200 + total) / (total * 2)).unwrap_or(100)
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percent(self.percent())
    }
}

/// Coarse grading used when listing past sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 80% and above.
    High,
    /// 60% up to 80%.
    Medium,
    Low,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            80.. => ScoreBand::High,
            60..=79 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

/// Partition of a question set into right, wrong and empty ids.
///
/// Every question id appears in exactly one list, in question order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    pub right: Vec<QuestionId>,
    pub wrong: Vec<QuestionId>,
    pub empty: Vec<QuestionId>,
    pub totals: ScoreTotals,
}

impl Score {
    /// Whether this score clears the celebration bar for `question_count` questions.
    #[must_use]
    pub fn celebrates(&self, question_count: usize) -> bool {
        self.right.len() >= celebration_threshold(question_count)
    }
}

/// Number of right answers needed to celebrate: `ceil(max(n, 1) * 0.66)`.
#[must_use]
pub fn celebration_threshold(question_count: usize) -> usize {
    let n = question_count.max(1);
    (n * CELEBRATION_PERCENT).div_ceil(100)
}

/// Score `answers` against `questions`.
///
/// Questions without an answer entry count as empty; answers for ids outside the
/// question set are ignored.
#[must_use]
pub fn score(questions: &[Question], answers: &AnswerSheet) -> Score {
    let mut out = Score::default();

    for question in questions {
        let id = question.id();
        match answers.selected(id) {
            None => out.empty.push(id),
            Some(index) if index == question.correct_option_index() => out.right.push(id),
            Some(_) => out.wrong.push(id),
        }
    }

    out.totals = ScoreTotals {
        right: count(&out.right),
        wrong: count(&out.wrong),
        empty: count(&out.empty),
    };
    out
}

fn count(ids: &[QuestionId]) -> u32 {
    u32::try_from(ids.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;

    fn question(id: i64, correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn sheet(entries: &[(i64, Option<usize>)]) -> AnswerSheet {
        AnswerSheet::from_answers(
            entries
                .iter()
                .map(|&(id, selected)| Answer {
                    question_id: QuestionId::new(id),
                    selected,
                })
                .collect(),
        )
    }

    #[test]
    fn classifies_right_wrong_and_empty() {
        let questions = vec![question(0, 0), question(1, 1), question(2, 2)];
        let answers = sheet(&[(0, Some(0)), (1, Some(2)), (2, None)]);

        let score = score(&questions, &answers);

        assert_eq!(score.right, vec![QuestionId::new(0)]);
        assert_eq!(score.wrong, vec![QuestionId::new(1)]);
        assert_eq!(score.empty, vec![QuestionId::new(2)]);
        assert_eq!(
            score.totals,
            ScoreTotals {
                right: 1,
                wrong: 1,
                empty: 1
            }
        );
    }

    #[test]
    fn partitions_every_question_exactly_once() {
        let questions: Vec<_> = (0..15).map(|i| question(i, (i % 4) as usize)).collect();
        let answers = sheet(
            &(0..15)
                .map(|i| {
                    let selected = match i % 3 {
                        0 => None,
                        1 => Some((i % 4) as usize),
                        _ => Some(((i + 1) % 4) as usize),
                    };
                    (i, selected)
                })
                .collect::<Vec<_>>(),
        );

        let score = score(&questions, &answers);

        let mut seen: Vec<_> = score
            .right
            .iter()
            .chain(&score.wrong)
            .chain(&score.empty)
            .copied()
            .collect();
        seen.sort();
        let expected: Vec<_> = questions.iter().map(Question::id).collect();
        assert_eq!(seen, expected);
        assert_eq!(score.totals.total(), 15);
        assert_eq!(score.totals, ScoreTotals { right: 5, wrong: 5, empty: 5 });
    }

    #[test]
    fn scoring_is_pure() {
        let questions = vec![question(0, 0), question(1, 3)];
        let answers = sheet(&[(0, Some(1)), (1, Some(3))]);
        assert_eq!(score(&questions, &answers), score(&questions, &answers));
    }

    #[test]
    fn orphan_answers_are_ignored_and_missing_answers_are_empty() {
        let questions = vec![question(0, 0), question(1, 1)];
        let answers = sheet(&[(0, Some(0)), (42, Some(1))]);

        let score = score(&questions, &answers);

        assert_eq!(score.right, vec![QuestionId::new(0)]);
        assert!(score.wrong.is_empty());
        assert_eq!(score.empty, vec![QuestionId::new(1)]);
        assert_eq!(score.totals.total(), 2);
    }

    #[test]
    fn empty_question_set_scores_nothing() {
        let score = score(&[], &AnswerSheet::default());
        assert_eq!(score.totals.total(), 0);
        assert_eq!(score.totals.percent(), 0);
        assert!(!score.celebrates(0));
    }

    #[test]
    fn celebration_threshold_matches_two_thirds_rounded_up() {
        assert_eq!(celebration_threshold(15), 10);
        assert_eq!(celebration_threshold(3), 2);
        assert_eq!(celebration_threshold(0), 1);
        assert_eq!(celebration_threshold(1), 1);
    }

    #[test]
    fn celebrates_at_ten_of_fifteen_but_not_nine() {
        let questions: Vec<_> = (0..15).map(|i| question(i, 0)).collect();
        let ten = sheet(&(0..15).map(|i| (i, Some(usize::from(i >= 10)))).collect::<Vec<_>>());
        let nine = sheet(&(0..15).map(|i| (i, Some(usize::from(i >= 9)))).collect::<Vec<_>>());

        assert!(score(&questions, &ten).celebrates(15));
        assert!(!score(&questions, &nine).celebrates(15));
    }

    #[test]
    fn bands_follow_percentage_cutoffs() {
        let totals = |right, wrong| ScoreTotals { right, wrong, empty: 0 };
        assert_eq!(totals(12, 3).band(), ScoreBand::High);
        assert_eq!(totals(9, 6).band(), ScoreBand::Medium);
        assert_eq!(totals(8, 7).band(), ScoreBand::Low);
        assert_eq!(ScoreTotals::default().band(), ScoreBand::Low);
    }
}
