//! Per-guild win counters, persisted as JSON after every change.

use poise::serenity_prelude::{GuildId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

mod backend;
mod ordered;

pub use backend::{Backend, JsonFile, Memory};
pub use ordered::OrderedMap;

/// Games that count towards the leaderboard.
#[derive(poise::ChoiceParameter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoredGame {
    #[name = "trivia"]
    Trivia,
    #[name = "hangman"]
    Hangman,
}

impl ScoredGame {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trivia => "trivia",
            Self::Hangman => "hangman",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Trivia => "Trivia",
            Self::Hangman => "Hangman",
        }
    }
}

/// One user's record in one guild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(default)]
    pub trivia_wins: u64,
    #[serde(default)]
    pub hangman_wins: u64,

    /// Keys this version doesn't know about, written back untouched.
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Scores {
    pub const fn get(&self, game: ScoredGame) -> u64 {
        match game {
            ScoredGame::Trivia => self.trivia_wins,
            ScoredGame::Hangman => self.hangman_wins,
        }
    }

    fn increment(&mut self, game: ScoredGame) {
        let counter = match game {
            ScoredGame::Trivia => &mut self.trivia_wins,
            ScoredGame::Hangman => &mut self.hangman_wins,
        };

        *counter = counter.saturating_add(1);
    }
}

pub type Standings = OrderedMap<GuildId, OrderedMap<UserId, Scores>>;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("couldn't write the leaderboard: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't serialize the leaderboard: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct Ledger<B = JsonFile> {
    backend: B,
    standings: Mutex<Standings>,
}

impl<B: Backend> Ledger<B> {
    /// Reads the ledger from `backend`. Missing or unreadable data starts an
    /// empty ledger.
    pub async fn load(backend: B) -> Self {
        let standings = match backend.read().await {
            Ok(Some(text)) => match serde_json::from_str::<Standings>(&text) {
                Ok(standings) => {
                    info!(guilds = standings.len(), "loaded leaderboard");
                    standings
                }
                Err(err) => {
                    warn!(%err, "leaderboard is malformed, starting empty");
                    Standings::default()
                }
            },
            Ok(None) => {
                warn!("no leaderboard found, starting empty");
                Standings::default()
            }
            Err(err) => {
                warn!(%err, "couldn't read leaderboard, starting empty");
                Standings::default()
            }
        };

        Self {
            backend,
            standings: Mutex::new(standings),
        }
    }

    pub fn empty(backend: B) -> Self {
        Self {
            backend,
            standings: Mutex::default(),
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Credits `user` with a win and writes the whole ledger out before
    /// returning. The increment stands even if the write fails.
    pub async fn record_win(
        &self,
        guild: GuildId,
        user: UserId,
        game: ScoredGame,
    ) -> Result<Scores, LedgerError> {
        let mut standings = self.standings.lock().await;

        let scores = standings
            .get_or_insert_with(guild, OrderedMap::default)
            .get_or_insert_with(user, Scores::default);
        scores.increment(game);
        let scores = scores.clone();

        debug!(%guild, %user, game = game.label(), wins = scores.get(game), "recorded win");

        if let Err(err) = self.persist(&standings).await {
            error!(%err, "couldn't persist leaderboard");
            return Err(err);
        }

        Ok(scores)
    }

    async fn persist(&self, standings: &Standings) -> Result<(), LedgerError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        standings.serialize(&mut serializer)?;

        let text = String::from_utf8(buf)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

        self.backend.write(text).await?;

        Ok(())
    }

    /// The guild's top `top_n` players by `game`, ties broken by who appeared
    /// in the ledger first.
    pub async fn leaderboard(
        &self,
        guild: GuildId,
        game: ScoredGame,
        top_n: usize,
    ) -> Vec<(UserId, u64)> {
        let standings = self.standings.lock().await;

        let Some(players) = standings.get(guild) else {
            return Vec::new();
        };

        let mut board: Vec<(UserId, u64)> = players
            .iter()
            .map(|(user, scores)| (user, scores.get(game)))
            .collect();

        board.sort_by(|a, b| b.1.cmp(&a.1));
        board.truncate(top_n);

        board
    }

    pub async fn stats(&self, guild: GuildId, user: UserId) -> Option<Scores> {
        let standings = self.standings.lock().await;

        standings.get(guild)?.get(user).cloned()
    }
}
