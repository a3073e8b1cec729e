//! The scripted trip questionnaire Sara walks through before handing the
//! conversation to the model.

use super::state::ScriptProgress;

/// Default questionnaire, in the order Sara asks.
const DEFAULT_QUESTIONS: &[&str] = &[
    "Where would you like to go?",
    "When are you planning to travel?",
    "How many days will your trip be?",
    "What is your budget for this trip?",
    "What kind of traveler are you? Adventurous, relaxed, cultural, or a mix?",
    "Who will be traveling with you?",
    "What kind of food do you enjoy?",
    "Do you have any dietary restrictions?",
];

/// Ordered, immutable question list for one deployment.
///
/// Stateless: all progression state lives in [`ScriptProgress`], owned by
/// the conversation store.
#[derive(Debug, Clone)]
pub struct TripScript {
    questions: Vec<String>,
}

impl Default for TripScript {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect())
    }
}

impl TripScript {
    pub fn new(questions: Vec<String>) -> Self {
        Self { questions }
    }

    /// Number of questions in the script.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The question at the current index, or `None` once exhausted.
    pub fn next_question(&self, progress: &ScriptProgress) -> Option<&str> {
        self.questions.get(progress.question_index).map(String::as_str)
    }

    /// Whether every question has been answered.
    pub fn is_complete(&self, progress: &ScriptProgress) -> bool {
        progress.question_index >= self.questions.len()
    }

    /// Synthesize the hand-off prompt from the collected answers.
    ///
    /// One line per question: `"<label>: <answer>"`, where the label is the
    /// question text up to its first `?`.
    pub fn summary_prompt(&self, progress: &ScriptProgress) -> String {
        self.questions
            .iter()
            .zip(progress.answers.iter())
            .map(|(question, answer)| format!("{}: {}", Self::label(question), answer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn label(question: &str) -> &str {
        question.split('?').next().unwrap_or(question).trim_end()
    }
}
