use std::sync::Arc;

use tracing::debug;

use crate::error::QuizError;
use crate::model::{Answer, Choice, Question};
use crate::questions::QuestionBank;

/// Outcome of recording one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The cursor moved on to the question at `index`
    Next { index: usize },
    /// The last question was answered; the full, ordered answer list
    Complete(Vec<Answer>),
}

/// Append-only answer accumulator for a single quiz run.
#[derive(Debug, Clone)]
pub struct AnswerCollector {
    bank: Arc<QuestionBank>,
    cursor: usize,
    answers: Vec<Answer>,
}

impl AnswerCollector {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        let capacity = bank.len();
        Self { bank, cursor: 0, answers: Vec::with_capacity(capacity) }
    }

    /// Back to the first question with no answers.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.answers.clear();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.cursor)
    }

    /// Fraction of the quiz reached when answering the current question.
    pub fn progress(&self) -> f64 {
        (self.cursor + 1).min(self.bank.len()) as f64 / self.bank.len() as f64
    }

    /// Record `choice` for the current question and advance.
    ///
    /// On the final question the collected answers are handed back and the
    /// collector is left empty, ready for the next run.
    pub fn record_answer(&mut self, choice: Choice) -> Result<Progress, QuizError> {
        let question = self.bank.get(self.cursor).ok_or(QuizError::CursorOutOfBounds {
            cursor: self.cursor,
            len: self.bank.len(),
        })?;

        self.answers.push(Answer {
            question_id: question.id,
            selected_option: choice,
            selected_text: question.option_text(choice).to_string(),
        });
        debug!(question_id = question.id, choice = %choice, "Recorded answer");

        if self.cursor + 1 < self.bank.len() {
            self.cursor += 1;
            Ok(Progress::Next { index: self.cursor })
        } else {
            let answers = std::mem::take(&mut self.answers);
            self.cursor = 0;
            Ok(Progress::Complete(answers))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Arc<QuestionBank> {
        Arc::new(
            QuestionBank::new(vec![
                Question::new(1, "a1", "b1"),
                Question::new(2, "a2", "b2"),
                Question::new(3, "a3", "b3"),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn collects_one_answer_per_question_in_order() {
        let mut c = AnswerCollector::new(bank());
        assert_eq!(c.record_answer(Choice::A).unwrap(), Progress::Next { index: 1 });
        assert_eq!(c.record_answer(Choice::B).unwrap(), Progress::Next { index: 2 });
        let Progress::Complete(answers) = c.record_answer(Choice::A).unwrap() else {
            panic!("expected completion");
        };
        let ids: Vec<u32> = answers.iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(answers[1].selected_text, "b2");
        assert_eq!(answers[2].selected_option, Choice::A);
        assert!(c.answers().is_empty());
    }

    #[test]
    fn progress_tracks_cursor() {
        let mut c = AnswerCollector::new(bank());
        assert!((c.progress() - 1.0 / 3.0).abs() < 1e-9);
        c.record_answer(Choice::B).unwrap();
        assert!((c.progress() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(c.current_question().unwrap().id, 2);
        c.reset();
        assert_eq!(c.cursor(), 0);
        assert!(c.answers().is_empty());
    }
}
