//! JSON bodies exchanged between the round API and its clients.
//!
//! Field names are camelCase on the wire so browser clients can consume them
//! without a mapping layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub message: String,
    pub session_id: String,
    pub total_rounds: usize,
}

/// The current round as shown to a player. Never carries the correct answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// 1-indexed round number.
    pub round: usize,
    pub total_rounds: usize,
    pub question: String,
    pub options: Vec<String>,
    pub hint: String,
}

/// Body of a submit-answer request.
///
/// `answer` is optional here so a missing field can be reported as invalid
/// input instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: Option<String>,
}

impl AnswerRequest {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    /// Correct answers so far in this session.
    pub score: u32,
    pub game_over: bool,
    /// Final tally once the game is over, `null` before that.
    pub total_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
