//! Per-game round and score tracking.
//!
//! A [`GameSession`] walks its questions in order: every submitted answer
//! advances the round, and a correct one also bumps the score. The
//! [`SessionStore`] keeps many sessions keyed by id. Requests that carry no
//! id act on the most recently started game.

use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    error::{Result, TriviaError},
    message::{AnswerOutcome, QuestionPayload},
    question::Question,
};

pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Finished,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    questions: Vec<Question>,
    round: usize,
    score: u32,
}

impl GameSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            round: 0,
            score: 0,
        }
    }

    pub fn total_rounds(&self) -> usize {
        self.questions.len()
    }

    /// 0-based index of the round awaiting an answer.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        if self.round < self.questions.len() {
            Phase::InProgress
        } else {
            Phase::Finished
        }
    }

    fn current(&self) -> Result<&Question> {
        self.questions.get(self.round).ok_or(TriviaError::GameOver)
    }

    pub fn current_question(&self) -> Result<QuestionPayload> {
        let question = self.current()?;
        Ok(QuestionPayload {
            round: self.round + 1,
            total_rounds: self.total_rounds(),
            question: question.question.clone(),
            options: question.options.clone(),
            hint: question.hint.clone(),
        })
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome> {
        let question = self.current()?;
        let is_correct = question.is_correct(answer);
        let correct_answer = question.correct_answer.clone();

        if is_correct {
            self.score += 1;
        }
        self.round += 1;

        let game_over = self.phase() == Phase::Finished;
        Ok(AnswerOutcome {
            is_correct,
            correct_answer,
            score: self.score,
            game_over,
            total_score: game_over.then_some(self.score),
        })
    }
}

/// All live sessions, guarded by one lock so each transition runs to
/// completion before the next begins.
pub struct SessionStore {
    state: Mutex<Sessions>,
    max_sessions: usize,
}

#[derive(Default)]
struct Sessions {
    games: HashMap<SessionId, GameSession>,
    // Oldest first; drives eviction.
    order: VecDeque<SessionId>,
    latest: Option<SessionId>,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            state: Mutex::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Stores a fresh session and makes it the latest one.
    ///
    /// Passing an existing `id` restarts that game in place: round and score
    /// go back to zero. Without an id a new one is minted.
    pub async fn start(&self, id: Option<SessionId>, questions: Vec<Question>) -> SessionId {
        let id = id.unwrap_or_else(|| nanoid::nanoid!());
        let mut state = self.state.lock().await;

        if state.games.insert(id.clone(), GameSession::new(questions)).is_some() {
            state.order.retain(|existing| existing != &id);
            debug!(session = %id, "restarted session");
        }
        state.order.push_back(id.clone());
        state.latest = Some(id.clone());

        while state.games.len() > self.max_sessions {
            let Some(evicted) = state.order.pop_front() else {
                break;
            };
            state.games.remove(&evicted);
            info!(session = %evicted, "evicted oldest session");
        }

        id
    }

    pub async fn current_question(&self, id: Option<&str>) -> Result<QuestionPayload> {
        let state = self.state.lock().await;
        state.resolve(id)?.current_question()
    }

    pub async fn submit_answer(&self, id: Option<&str>, answer: &str) -> Result<AnswerOutcome> {
        let mut state = self.state.lock().await;
        state.resolve_mut(id)?.submit_answer(answer)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.games.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Sessions {
    fn key<'a>(&'a self, id: Option<&'a str>) -> Result<&'a str> {
        id.or(self.latest.as_deref()).ok_or(TriviaError::NoActiveGame)
    }

    fn resolve(&self, id: Option<&str>) -> Result<&GameSession> {
        let key = self.key(id)?;
        self.games.get(key).ok_or(TriviaError::NoActiveGame)
    }

    fn resolve_mut(&mut self, id: Option<&str>) -> Result<&mut GameSession> {
        let key = self.key(id)?.to_string();
        self.games.get_mut(&key).ok_or(TriviaError::NoActiveGame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Category;

    fn capital_question(country: &str, capital: &str) -> Question {
        Question {
            category: Category::Capital,
            question: format!("What is the capital of {country}?"),
            correct_answer: capital.to_string(),
            options: vec![capital.to_string(), "Atlantis".to_string()],
            hint: "This country is located in Europe.".to_string(),
        }
    }

    fn three_rounds() -> Vec<Question> {
        vec![
            capital_question("France", "Paris"),
            capital_question("Italy", "Rome"),
            capital_question("Spain", "Madrid"),
        ]
    }

    #[test]
    fn walks_rounds_and_tallies_score() {
        let mut session = GameSession::new(three_rounds());
        assert_eq!(session.phase(), Phase::InProgress);

        let first = session.current_question().expect("first question");
        assert_eq!(first.round, 1);
        assert_eq!(first.total_rounds, 3);
        assert_eq!(first.question, "What is the capital of France?");

        let outcome = session.submit_answer("PARIS").expect("answer round 1");
        assert!(outcome.is_correct);
        assert_eq!(outcome.score, 1);
        assert!(!outcome.game_over);
        assert_eq!(outcome.total_score, None);

        let outcome = session.submit_answer("Atlantis").expect("answer round 2");
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "Rome");
        assert_eq!(outcome.score, 1);

        assert_eq!(session.current_question().unwrap().round, 3);
        let outcome = session.submit_answer("madrid").expect("answer round 3");
        assert!(outcome.game_over);
        assert_eq!(outcome.total_score, Some(2));
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn finished_session_rejects_further_play() {
        let mut session = GameSession::new(vec![capital_question("Peru", "Lima")]);
        session.submit_answer("Lima").expect("only round");

        assert!(matches!(session.current_question(), Err(TriviaError::GameOver)));
        assert!(matches!(session.submit_answer("Lima"), Err(TriviaError::GameOver)));
        assert_eq!(session.score(), 1);
        assert_eq!(session.round(), 1);
    }

    #[test]
    fn empty_answer_is_incorrect_and_advances() {
        let mut session = GameSession::new(three_rounds());
        let outcome = session.submit_answer("").expect("timed out answer");
        assert!(!outcome.is_correct);
        assert_eq!(session.round(), 1);
    }

    #[tokio::test]
    async fn store_without_game_reports_no_active_game() {
        let store = SessionStore::new(4);
        assert!(matches!(
            store.current_question(None).await,
            Err(TriviaError::NoActiveGame)
        ));
        assert!(matches!(
            store.submit_answer(Some("missing"), "Paris").await,
            Err(TriviaError::NoActiveGame)
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn anonymous_requests_follow_latest_session() {
        let store = SessionStore::new(4);
        let first = store.start(None, three_rounds()).await;
        store.submit_answer(None, "Paris").await.expect("answer first");

        let second = store.start(None, three_rounds()).await;
        assert_ne!(first, second);

        let latest = store.current_question(None).await.expect("latest question");
        assert_eq!(latest.round, 1);
        let original = store
            .current_question(Some(first.as_str()))
            .await
            .expect("first session question");
        assert_eq!(original.round, 2);
    }

    #[tokio::test]
    async fn restarting_a_session_resets_progress() {
        let store = SessionStore::new(4);
        let id = store.start(None, three_rounds()).await;
        store.submit_answer(Some(id.as_str()), "Paris").await.unwrap();
        store.submit_answer(Some(id.as_str()), "Rome").await.unwrap();

        let restarted = store.start(Some(id.clone()), three_rounds()).await;
        assert_eq!(restarted, id);
        assert_eq!(store.len().await, 1);

        let question = store.current_question(Some(id.as_str())).await.unwrap();
        assert_eq!(question.round, 1);
        let outcome = store.submit_answer(Some(id.as_str()), "nope").await.unwrap();
        assert_eq!(outcome.score, 0);
    }

    #[tokio::test]
    async fn evicts_oldest_session_beyond_capacity() {
        let store = SessionStore::new(2);
        let oldest = store.start(None, three_rounds()).await;
        let middle = store.start(None, three_rounds()).await;
        let newest = store.start(None, three_rounds()).await;

        assert_eq!(store.len().await, 2);
        assert!(matches!(
            store.current_question(Some(oldest.as_str())).await,
            Err(TriviaError::NoActiveGame)
        ));
        assert!(store.current_question(Some(middle.as_str())).await.is_ok());
        assert!(store.current_question(Some(newest.as_str())).await.is_ok());
    }
}
