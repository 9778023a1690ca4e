use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::QuizError;
use crate::model::Question;

const STANDARD_QUESTIONS: &[(&str, &str)] = &[
    ("I finish every task on my list before I relax.", "I relax first and let the list wait."),
    ("I like to plan a project down to the details.", "I like to start and figure it out as I go."),
    ("People come to me when a decision must be made quickly.", "People come to me when they need someone to listen."),
    ("I enjoy winning, even at small games.", "I enjoy playing more than winning."),
    ("I notice how others are feeling before they say anything.", "I focus on the facts of the situation first."),
    ("I gather information and ideas just because they are interesting.", "I look for information only when I need it."),
    ("I keep the promises I make, even when it costs me.", "I renegotiate commitments when circumstances change."),
    ("I am energized by meeting new people.", "I am energized by deepening existing friendships."),
    ("I think about where things will be in five years.", "I think about what needs to happen this week."),
    ("I enjoy fixing things that are broken.", "I enjoy building something new from scratch."),
    ("I speak up to take charge when a group is stuck.", "I help the group find common ground."),
    ("I want evidence before I accept a claim.", "I trust my instinct about what is true."),
    ("I treat everyone by the same rules.", "I adjust to each person's individual needs."),
    ("I like a routine that I can rely on.", "I like each day to bring something different."),
    ("I enjoy explaining ideas to an audience.", "I enjoy thinking ideas through on my own."),
    ("I look for the strongest talent in a team and build on it.", "I look for the weakest link and help raise it."),
    ("I make decisions carefully, considering every risk.", "I make decisions quickly and adjust as needed."),
    ("I like to understand the history behind a situation.", "I like to imagine what could come next."),
    ("I make sure everyone is included in a conversation.", "I keep conversations focused on the goal."),
    ("I believe things happen for a reason.", "I believe we make our own luck."),
    ("I see several paths forward and choose the best one.", "I commit to one path and push it through."),
    ("I want to be recognized for my contributions.", "I am content to work behind the scenes."),
    ("I like learning for its own sake.", "I like learning that leads to a clear result."),
    ("I stay optimistic and lift others' moods.", "I stay realistic and prepare others for problems."),
];

/// Ordered, immutable set of forced-choice questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from an explicit list. Ids must be unique.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidBank("question bank is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id) {
                return Err(QuizError::InvalidBank(format!("duplicate question id {}", q.id)));
            }
        }
        debug!(count = questions.len(), "Built question bank");
        Ok(Self { questions })
    }

    /// The built-in bank.
    pub fn standard() -> Self {
        let questions = STANDARD_QUESTIONS
            .iter()
            .zip(1u32..)
            .map(|((a, b), id)| Question::new(id, *a, *b))
            .collect();
        Self { questions }
    }

    /// Load a bank from a JSON array of `{ "id", "optionA", "optionB" }` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let questions: Vec<Question> = serde_json::from_str(&text)?;
        info!(path = %path.display(), count = questions.len(), "Loaded question bank from file");
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::standard()
    }
}
