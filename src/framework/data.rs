use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::games::{
    hangman::HangmanTable,
    ledger::{JsonFile, Ledger},
    story::StoryTable,
    trivia::TriviaClient,
    words::WordsList,
    UtcDateTime,
};

use super::Config;

/// Live game state, shared by every command.
#[derive(Debug, Clone)]
pub struct Games {
    pub hangman: HangmanTable,
    pub stories: StoryTable,
    pub ledger: Arc<Ledger>,
    pub trivia: TriviaClient,
}

impl Games {
    pub async fn load(config: &Config) -> Self {
        let words = Arc::new(WordsList::load(&config.games.words_file));
        let ledger = Arc::new(Ledger::load(JsonFile::new(&config.games.ledger_file)).await);

        Self {
            hangman: HangmanTable::new(words, ledger.clone()),
            stories: StoryTable::new(config.games.story_limit, config.games.take_turn_after()),
            ledger,
            trivia: TriviaClient::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoiseData {
    pub(crate) config: Config,
    pub(crate) started: UtcDateTime,
    pub(crate) games: Games,
}

impl PoiseData {
    pub(crate) async fn new(config: Config) -> Self {
        let games = Games::load(&config).await;
        let started = Utc::now();

        info!("game data loaded");

        Self {
            config,
            started,
            games,
        }
    }

    pub(crate) const fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) const fn games(&self) -> &Games {
        &self.games
    }
}
