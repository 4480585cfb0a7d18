//! Client-side points and achievements.
//!
//! The server only counts correct answers. Points reward speed on top of
//! that and never leave the client.

use serde::{Deserialize, Serialize};

/// Points for a correct answer given with the full time still on the clock.
pub const MAX_POINTS: u32 = 1000;
pub const HIGH_SCORE_THRESHOLD: u32 = 10_000;

/// `round(seconds_left / time_limit * MAX_POINTS)` for a correct answer,
/// zero otherwise. The clock counts down in whole seconds.
pub fn points_for(correct: bool, seconds_left: u64, time_limit: u64) -> u32 {
    if !correct || time_limit == 0 {
        return 0;
    }
    let ratio = seconds_left.min(time_limit) as f64 / time_limit as f64;
    (ratio * f64::from(MAX_POINTS)).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    MaxPoints,
    AllCorrect,
    HighScore,
}

impl Achievement {
    pub const ALL: [Achievement; 3] = [
        Achievement::MaxPoints,
        Achievement::AllCorrect,
        Achievement::HighScore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Achievement::MaxPoints => "In The Air",
            Achievement::AllCorrect => "Hot",
            Achievement::HighScore => "Flawlëss",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::MaxPoints => "Answer a question for maximum points",
            Achievement::AllCorrect => "Answer every question correctly in a single game",
            Achievement::HighScore => "Achieve a score of 10,000 points",
        }
    }
}

/// Running tally for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    total_rounds: usize,
    answered: usize,
    correct: usize,
    points: u32,
    best_answer: u32,
}

impl Scoreboard {
    pub fn new(total_rounds: usize) -> Self {
        Self {
            total_rounds,
            ..Self::default()
        }
    }

    /// Records one answered round and returns the points it earned.
    pub fn record(&mut self, correct: bool, seconds_left: u64, time_limit: u64) -> u32 {
        let earned = points_for(correct, seconds_left, time_limit);
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
        self.points += earned;
        self.best_answer = self.best_answer.max(earned);
        earned
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn is_complete(&self) -> bool {
        self.answered >= self.total_rounds
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        Achievement::ALL
            .into_iter()
            .filter(|achievement| match achievement {
                Achievement::MaxPoints => self.best_answer == MAX_POINTS,
                Achievement::AllCorrect => {
                    self.is_complete() && self.total_rounds > 0 && self.correct == self.total_rounds
                }
                Achievement::HighScore => self.points >= HIGH_SCORE_THRESHOLD,
            })
            .collect()
    }
}
