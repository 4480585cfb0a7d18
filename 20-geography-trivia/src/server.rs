use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::{
    error::TriviaError,
    message::{AnswerOutcome, AnswerRequest, QuestionPayload, StartGameResponse},
    question::generate_questions,
    session::SessionStore,
    source::CountrySource,
};

pub const DEFAULT_ROUNDS: usize = 10;
pub const DEFAULT_MAX_SESSIONS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Questions per game.
    pub rounds: usize,
    /// Sessions kept in memory before the oldest is evicted.
    pub max_sessions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

pub struct AppState {
    sessions: SessionStore,
    source: Arc<dyn CountrySource>,
    config: GameConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn CountrySource>, config: GameConfig) -> Self {
        Self {
            sessions: SessionStore::new(config.max_sessions),
            source,
            config,
        }
    }
}

/// Routes of the round API.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/start-game", get(start_game).post(start_game))
        .route("/api/question", get(current_question))
        .route("/api/answer", post(submit_answer))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(listener: TcpListener, source: Arc<dyn CountrySource>, config: GameConfig) -> Self {
        Self {
            listener,
            state: Arc::new(AppState::new(source, config)),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Server { listener, state } = self;
        axum::serve(listener, router(state))
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("trivia server shutting down");
            })
            .await?;
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    session: Option<String>,
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<StartGameResponse>, TriviaError> {
    // Fetch and generate before touching the store so a failure leaves every
    // existing session as it was.
    let countries = state.source.fetch_countries().await?;
    let questions = generate_questions(&countries, state.config.rounds, &mut rand::thread_rng())?;
    let total_rounds = questions.len();

    let session_id = state.sessions.start(query.session, questions).await;
    info!(session = %session_id, total_rounds, countries = countries.len(), "game started");

    Ok(Json(StartGameResponse {
        message: "Game started".to_string(),
        session_id,
        total_rounds,
    }))
}

async fn current_question(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<QuestionPayload>, TriviaError> {
    let question = state
        .sessions
        .current_question(query.session.as_deref())
        .await?;
    Ok(Json(question))
}

async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerOutcome>, TriviaError> {
    let Json(request) =
        payload.map_err(|rejection| TriviaError::invalid_input(rejection.body_text()))?;
    let answer = request
        .answer
        .ok_or_else(|| TriviaError::invalid_input("missing `answer` field"))?;

    let outcome = state
        .sessions
        .submit_answer(query.session.as_deref(), &answer)
        .await?;
    debug!(
        correct = outcome.is_correct,
        score = outcome.score,
        game_over = outcome.game_over,
        "answer submitted"
    );
    Ok(Json(outcome))
}
