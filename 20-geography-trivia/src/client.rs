use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    time::{timeout, timeout_at, Instant},
};
use tracing::{debug, warn};

use crate::{
    cli::PlayArgs,
    message::{AnswerOutcome, AnswerRequest, ErrorBody, QuestionPayload, StartGameResponse},
    profile::Profile,
    scoring::{Achievement, Scoreboard},
};

/// How long to wait for more stray input when clearing lines typed after a
/// countdown ran out.
const LATE_INPUT_GRACE: Duration = Duration::from_millis(50);

pub async fn run(args: PlayArgs) -> Result<()> {
    let profile_path = args.profile.clone().or_else(Profile::default_path);
    let mut profile = match &profile_path {
        Some(path) => Profile::load(path).await?,
        None => {
            warn!("no data directory available; progress will not be saved");
            Profile::default()
        }
    };

    let mut api = ApiClient::new(&args.server);
    let mut input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    let summary = play_game(&mut api, args.time_limit(), &mut input, &mut output).await?;
    report_summary(&summary, &mut profile, &mut output).await?;

    if let Some(path) = &profile_path {
        profile.save(path).await?;
        debug!(path = %path.display(), "profile saved");
    }

    Ok(())
}

/// HTTP client for the round API. Remembers the session it started so
/// later calls never act on somebody else's game.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Starts a game, or restarts the current one when a session exists.
    pub async fn start_game(&mut self) -> Result<StartGameResponse> {
        let request = self.scoped(self.http.get(self.url("/api/start-game")));
        let started: StartGameResponse = send(request).await.context("failed to start game")?;
        self.session = Some(started.session_id.clone());
        Ok(started)
    }

    pub async fn question(&self) -> Result<QuestionPayload> {
        let request = self.scoped(self.http.get(self.url("/api/question")));
        send(request).await.context("failed to fetch question")
    }

    pub async fn submit_answer(&self, answer: &str) -> Result<AnswerOutcome> {
        let request = self
            .scoped(self.http.post(self.url("/api/answer")))
            .json(&AnswerRequest::new(answer));
        send(request).await.context("failed to submit answer")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn scoped(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(id) => request.query(&[("session", id)]),
            None => request,
        }
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(anyhow!("server responded with {status}: {message}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub total_rounds: usize,
    /// Correct answers as counted by the server.
    pub total_score: u32,
    pub points: u32,
    pub achievements: Vec<Achievement>,
}

/// Plays one full game: every round is read from `input` under a
/// countdown, and progress is written to `output`.
pub async fn play_game<R, W>(
    api: &mut ApiClient,
    time_limit: Duration,
    input: &mut R,
    output: &mut W,
) -> Result<GameSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let started = api.start_game().await?;
    let limit_secs = time_limit.as_secs();
    write_line(
        output,
        &format!(
            "*** new game: {} rounds, {limit_secs} seconds per question (type ? for a hint)",
            started.total_rounds
        ),
    )
    .await?;

    let mut board = Scoreboard::new(started.total_rounds);
    let mut expired = false;
    loop {
        let question = api.question().await?;
        if expired {
            let dropped = discard_late_lines(input).await?;
            debug!(dropped, "discarded input typed after the countdown");
        }
        render_question(output, &question).await?;

        let asked_at = Instant::now();
        let answer = read_answer(input, output, &question, asked_at + time_limit).await?;
        let seconds_left = limit_secs.saturating_sub(asked_at.elapsed().as_secs());
        expired = answer.is_none();
        let answer = answer.unwrap_or_default();

        let outcome = api.submit_answer(&answer).await?;
        let earned = board.record(outcome.is_correct, seconds_left, limit_secs);
        render_outcome(output, &outcome, earned, board.points()).await?;

        if outcome.game_over {
            return Ok(GameSummary {
                total_rounds: started.total_rounds,
                total_score: outcome.total_score.unwrap_or(outcome.score),
                points: board.points(),
                achievements: board.achievements(),
            });
        }
    }
}

/// Reads the player's answer, or `None` once `deadline` passes.
async fn read_answer<R, W>(
    input: &mut R,
    output: &mut W,
    question: &QuestionPayload,
    deadline: Instant,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match timeout_at(deadline, input.read_line(&mut line)).await {
            Err(_) => {
                write_line(output, "*** time's up!").await?;
                return Ok(None);
            }
            Ok(read) => {
                if read.context("failed to read answer")? == 0 {
                    bail!("input closed before the game finished");
                }
            }
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "?" {
            let hint = match question.hint.as_str() {
                "" => "    no hint for this one".to_string(),
                hint => format!("    hint: {hint}"),
            };
            write_line(output, &hint).await?;
            continue;
        }
        return Ok(Some(resolve_choice(text, &question.options)));
    }
}

/// Drops lines that are already waiting on `input`, such as an answer typed
/// after the previous countdown. Returns how many were dropped.
async fn discard_late_lines<R>(input: &mut R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let mut dropped = 0;
    loop {
        line.clear();
        match timeout(LATE_INPUT_GRACE, input.read_line(&mut line)).await {
            Err(_) | Ok(Ok(0)) => return Ok(dropped),
            Ok(read) => {
                read.context("failed to read input")?;
                dropped += 1;
            }
        }
    }
}

/// Maps an option number (1-based) to its text; anything else is sent as typed.
pub fn resolve_choice(input: &str, options: &[String]) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| options.get(index))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

async fn render_question<W>(output: &mut W, question: &QuestionPayload) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_line(
        output,
        &format!(
            "\nRound {}/{}: {}",
            question.round, question.total_rounds, question.question
        ),
    )
    .await?;
    for (index, option) in question.options.iter().enumerate() {
        write_line(output, &format!("  {}) {option}", index + 1)).await?;
    }
    Ok(())
}

async fn render_outcome<W>(
    output: &mut W,
    outcome: &AnswerOutcome,
    earned: u32,
    points: u32,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let verdict = if outcome.is_correct {
        format!("*** correct! +{earned} points")
    } else {
        format!("*** wrong, the answer was {}", outcome.correct_answer)
    };
    write_line(output, &verdict).await?;
    write_line(
        output,
        &format!("*** {points} points, {} correct", outcome.score),
    )
    .await
}

async fn report_summary<W>(summary: &GameSummary, profile: &mut Profile, output: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_line(
        output,
        &format!(
            "\n*** game over: {}/{} correct, {} points",
            summary.total_score, summary.total_rounds, summary.points
        ),
    )
    .await?;

    if profile.record_game(summary.points) {
        write_line(output, "*** new high score!").await?;
    }
    write_line(output, &format!("*** high score: {}", profile.high_score)).await?;

    for achievement in profile.unlock(summary.achievements.iter().copied()) {
        write_line(
            output,
            &format!(
                "*** achievement unlocked: {} ({})",
                achievement.name(),
                achievement.description()
            ),
        )
        .await?;
    }
    Ok(())
}

async fn write_line<W>(output: &mut W, line: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
