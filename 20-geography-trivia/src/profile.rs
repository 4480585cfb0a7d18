//! Local player profile: best score and unlocked achievements.
//!
//! Stored as JSON in the OS data directory (via `directories`), e.g.
//! `~/.local/share/geography-trivia/profile.json` on Linux.

use std::{
    collections::BTreeSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::scoring::Achievement;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub high_score: u32,
    #[serde(default)]
    pub achievements: BTreeSet<Achievement>,
}

impl Profile {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "geography-trivia").map(|dirs| dirs.data_dir().join("profile.json"))
    }

    /// Loads the profile at `path`. A missing file is a fresh profile.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse profile {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read profile {}", path.display()))
            }
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let encoded = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, encoded)
            .await
            .with_context(|| format!("failed to write profile {}", path.display()))
    }

    /// Returns true when `points` beats the stored high score.
    pub fn record_game(&mut self, points: u32) -> bool {
        if points > self.high_score {
            self.high_score = points;
            return true;
        }
        false
    }

    /// Unlocks `earned` and returns the ones that were not unlocked before.
    pub fn unlock(&mut self, earned: impl IntoIterator<Item = Achievement>) -> Vec<Achievement> {
        earned
            .into_iter()
            .filter(|achievement| self.achievements.insert(*achievement))
            .collect()
    }
}
