use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GamesConfig {
    pub words_file: PathBuf,
    pub ledger_file: PathBuf,
    signup_secs: u64,
    take_turn_after_secs: u64,
    pub story_limit: usize,
    trivia_answer_secs: u64,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            words_file: PathBuf::from("servers/words.txt"),
            ledger_file: PathBuf::from("servers/leaderboard.json"),
            signup_secs: 30,
            take_turn_after_secs: 300,
            story_limit: crate::games::story::DEFAULT_LIMIT,
            trivia_answer_secs: 30,
        }
    }
}

impl GamesConfig {
    /// How long a story's sign-up stays open.
    pub const fn signup_window(&self) -> Duration {
        Duration::from_secs(self.signup_secs)
    }

    /// How long a story turn is held before anyone may take it.
    pub fn take_turn_after(&self) -> chrono::Duration {
        chrono::Duration::from_std(Duration::from_secs(self.take_turn_after_secs))
            .unwrap_or_else(|_| chrono::Duration::weeks(52))
    }

    pub const fn trivia_answer_window(&self) -> Duration {
        Duration::from_secs(self.trivia_answer_secs)
    }
}
