//! Geography trivia over HTTP.
//!
//! A small server fetches country data, turns it into multiple-choice
//! questions and plays them out round by round. Each module focuses on a
//! concrete responsibility:
//!
//! - [`country`] models the REST Countries records the game consumes.
//! - [`source`] fetches that dataset behind the [`source::CountrySource`] trait.
//! - [`question`] derives questions and distractors from the dataset.
//! - [`session`] holds the per-game round/score state machine and the
//!   session-keyed store.
//! - [`server`] exposes the round API with axum.
//! - [`message`] defines the JSON bodies shared by server and client.
//! - [`client`], [`scoring`] and [`profile`] make up the terminal player:
//!   countdown, time-based points, high score and achievements.
//! - [`cli`] parses the command-line interface for both modes.
//!
//! Unit tests live next to each module; `tests/` drives a real server against
//! a fake country API.

pub mod cli;
pub mod client;
pub mod country;
pub mod error;
pub mod message;
pub mod profile;
pub mod question;
pub mod scoring;
pub mod server;
pub mod session;
pub mod source;
