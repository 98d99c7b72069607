//! Hangman: guess a secret word one letter at a time before the gallows fill up.

use std::{collections::BTreeSet, sync::Arc};

use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use tracing::{debug, info};

use super::{
    ledger::{self, Ledger, LedgerError, ScoredGame},
    words::WordsList,
    Game, GameKind, Registry, SessionStatus, UtcDateTime,
};

mod gallows;

pub const MAX_WRONG_GUESSES: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HangmanError {
    #[error("A hangman game is already in progress in this channel. Use `hangman stop` to end it.")]
    AlreadyInProgress,

    #[error("No hangman game is currently running in this channel. Use `hangman start` to begin.")]
    NoActiveSession,

    #[error("The game is over. Please start a new one.")]
    GameAlreadyOver,

    #[error("Please guess a single letter.")]
    InvalidGuess,

    #[error("You've already guessed `{0}`.")]
    AlreadyGuessed(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Hit { letter: char, revealed: usize },
    Miss { letter: char, remaining: u8 },
    Won { word: String },
    Lost { word: String },
}

#[derive(Debug, Clone)]
pub struct Hangman {
    secret: Vec<char>,
    revealed: Vec<Option<char>>,
    guessed: BTreeSet<char>,
    wrong: u8,
    status: SessionStatus,
}

impl Hangman {
    pub fn new(secret: &str) -> Self {
        let secret: Vec<char> = secret.to_lowercase().chars().collect();
        let revealed = vec![None; secret.len()];

        Self {
            secret,
            revealed,
            guessed: BTreeSet::new(),
            wrong: 0,
            status: SessionStatus::InProgress,
        }
    }

    pub fn secret(&self) -> String {
        self.secret.iter().collect()
    }

    pub const fn wrong_guesses(&self) -> u8 {
        self.wrong
    }

    pub fn is_solved(&self) -> bool {
        self.revealed.iter().all(Option::is_some)
    }

    pub fn is_over(&self) -> bool {
        self.wrong >= MAX_WRONG_GUESSES || self.is_solved()
    }

    pub fn guessed(&self) -> impl Iterator<Item = char> + '_ {
        self.guessed.iter().copied()
    }

    /// The word so far, `_` standing in for hidden letters.
    pub fn pattern(&self) -> String {
        self.revealed.iter().map(|c| c.unwrap_or('_')).collect()
    }

    pub fn guess(&mut self, input: &str) -> Result<GuessOutcome, HangmanError> {
        if self.is_over() {
            return Err(HangmanError::GameAlreadyOver);
        }

        let letter = parse_letter(input).ok_or(HangmanError::InvalidGuess)?;

        if !self.guessed.insert(letter) {
            return Err(HangmanError::AlreadyGuessed(letter));
        }

        let mut revealed = 0;
        for (slot, secret) in self.revealed.iter_mut().zip(&self.secret) {
            if *secret == letter {
                *slot = Some(letter);
                revealed += 1;
            }
        }

        if revealed == 0 {
            self.wrong += 1;
        }

        let outcome = if self.is_solved() {
            self.status = SessionStatus::Won;
            GuessOutcome::Won {
                word: self.secret(),
            }
        } else if self.wrong >= MAX_WRONG_GUESSES {
            self.status = SessionStatus::Lost;
            GuessOutcome::Lost {
                word: self.secret(),
            }
        } else if revealed == 0 {
            GuessOutcome::Miss {
                letter,
                remaining: MAX_WRONG_GUESSES - self.wrong,
            }
        } else {
            GuessOutcome::Hit { letter, revealed }
        };

        Ok(outcome)
    }

    pub fn snapshot(&self) -> HangmanSnapshot {
        HangmanSnapshot {
            gallows: gallows::stage(self.wrong),
            pattern: self.pattern(),
            guessed: self.guessed().collect(),
            wrong: self.wrong,
        }
    }
}

impl Game for Hangman {
    const KIND: GameKind = GameKind::Hangman;

    fn status(&self) -> SessionStatus {
        self.status
    }
}

fn parse_letter(input: &str) -> Option<char> {
    let mut chars = input.trim().chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => Some(l),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Everything needed to draw a hangman board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangmanSnapshot {
    pub gallows: &'static str,
    pub pattern: String,
    pub guessed: Vec<char>,
    pub wrong: u8,
}

impl HangmanSnapshot {
    pub fn spaced_pattern(&self) -> String {
        let chars: Vec<String> = self.pattern.chars().map(String::from).collect();
        chars.join(" ")
    }

    pub fn guessed_list(&self) -> String {
        let letters: Vec<String> = self.guessed.iter().map(char::to_string).collect();
        letters.join(", ")
    }

    pub fn description(&self) -> String {
        format!(
            "```\n{gallows}\n```\n**Word:** `{word}`\n\n**Guessed:** {guessed}",
            gallows = self.gallows,
            word = self.spaced_pattern(),
            guessed = self.guessed_list(),
        )
    }
}

#[derive(Debug)]
pub struct GuessReport {
    pub outcome: GuessOutcome,
    pub snapshot: HangmanSnapshot,
    pub board: Option<MessageId>,
    /// Set when a win couldn't be saved to the leaderboard.
    pub unsaved: Option<LedgerError>,
}

/// Hangman sessions for every channel, plus what they need to start and score.
#[derive(Debug)]
pub struct HangmanTable<B = ledger::JsonFile> {
    sessions: Registry<Hangman>,
    words: Arc<WordsList>,
    ledger: Arc<Ledger<B>>,
}

impl<B> Clone for HangmanTable<B> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            words: self.words.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

impl<B: ledger::Backend> HangmanTable<B> {
    pub fn new(words: Arc<WordsList>, ledger: Arc<Ledger<B>>) -> Self {
        Self {
            sessions: Registry::new(),
            words,
            ledger,
        }
    }

    pub const fn sessions(&self) -> &Registry<Hangman> {
        &self.sessions
    }

    pub async fn start(
        &self,
        channel: ChannelId,
        now: UtcDateTime,
    ) -> Result<HangmanSnapshot, HangmanError> {
        let word = self.words.random(&mut rand::thread_rng()).to_owned();
        let game = Hangman::new(&word);
        let snapshot = game.snapshot();

        self.sessions
            .try_insert(channel, game, now)
            .await
            .map_err(|_| HangmanError::AlreadyInProgress)?;

        info!(%channel, length = snapshot.pattern.len(), "hangman started");

        Ok(snapshot)
    }

    /// Applies a guess. A winning guess is credited to `user` in `guild`.
    pub async fn guess(
        &self,
        channel: ChannelId,
        guild: Option<GuildId>,
        user: UserId,
        input: &str,
    ) -> Result<GuessReport, HangmanError> {
        let mut report = self
            .sessions
            .update(channel, |session| -> Result<GuessReport, HangmanError> {
                let outcome = session.game_mut().guess(input)?;

                Ok(GuessReport {
                    outcome,
                    snapshot: session.game().snapshot(),
                    board: session.board(),
                    unsaved: None,
                })
            })
            .await
            .ok_or(HangmanError::NoActiveSession)??;

        debug!(%channel, %user, outcome = ?report.outcome, "hangman guess");

        match (&report.outcome, guild) {
            (GuessOutcome::Won { word }, Some(guild)) => {
                info!(%channel, %user, %word, "hangman won");

                report.unsaved = self
                    .ledger
                    .record_win(guild, user, ScoredGame::Hangman)
                    .await
                    .err();
            }
            (GuessOutcome::Lost { word }, _) => info!(%channel, %word, "hangman lost"),
            _ => (),
        }

        Ok(report)
    }

    pub async fn render(
        &self,
        channel: ChannelId,
    ) -> Result<(HangmanSnapshot, Option<MessageId>), HangmanError> {
        self.sessions
            .view(channel, |session| (session.game().snapshot(), session.board()))
            .await
            .ok_or(HangmanError::NoActiveSession)
    }

    /// Ends the channel's game without a result. Returns whether there was one.
    pub async fn stop(&self, channel: ChannelId) -> bool {
        self.sessions.remove(channel).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use poise::serenity_prelude::{ChannelId, GuildId, UserId};
    use pretty_assertions::assert_eq;

    use super::{GuessOutcome, Hangman, HangmanError, HangmanTable, MAX_WRONG_GUESSES};
    use crate::games::{
        ledger::{Ledger, Memory, ScoredGame},
        words::WordsList,
        Game, SessionStatus,
    };

    #[test]
    fn fresh_game_is_all_blanks() {
        for word in ["abcd", "python", "supercalifragilistic"] {
            let game = Hangman::new(word);

            assert_eq!(game.pattern(), "_".repeat(word.len()));
            assert_eq!(game.wrong_guesses(), 0);
            assert_eq!(game.status(), SessionStatus::InProgress);
        }
    }

    #[test]
    fn python_scenario() {
        let mut game = Hangman::new("python");

        for letter in ["p", "y", "t", "h", "o"] {
            let outcome = game.guess(letter).expect("valid guess");
            assert!(matches!(outcome, GuessOutcome::Hit { revealed: 1, .. }));
        }

        assert_eq!(game.status(), SessionStatus::InProgress);
        assert_eq!(game.pattern(), "pytho_");

        assert_eq!(
            game.guess("n"),
            Ok(GuessOutcome::Won {
                word: "python".to_owned()
            })
        );
        assert_eq!(game.status(), SessionStatus::Won);
    }

    #[test]
    fn every_letter_once_always_wins() {
        let orders = ["abn", "anb", "ban", "bna", "nab", "nba"];

        for order in orders {
            let mut game = Hangman::new("banana");
            let mut last = None;

            for letter in order.chars() {
                if game.is_over() {
                    break;
                }
                last = Some(game.guess(&letter.to_string()).expect("valid guess"));
            }

            assert_eq!(game.wrong_guesses(), 0);
            assert_eq!(game.status(), SessionStatus::Won);
            assert!(matches!(last, Some(GuessOutcome::Won { .. })));
        }
    }

    #[test]
    fn repeated_letters_reveal_together() {
        let mut game = Hangman::new("banana");

        assert_eq!(
            game.guess("a"),
            Ok(GuessOutcome::Hit {
                letter: 'a',
                revealed: 3
            })
        );
        assert_eq!(game.pattern(), "_a_a_a");

        game.guess("n").expect("valid guess");
        assert_eq!(game.pattern(), "_anana");
    }

    #[test]
    fn six_misses_lose() {
        let mut game = Hangman::new("python");

        for (i, letter) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            let remaining = MAX_WRONG_GUESSES - (i as u8 + 1);
            assert_eq!(
                game.guess(letter),
                Ok(GuessOutcome::Miss {
                    letter: letter.chars().next().expect("one letter"),
                    remaining
                })
            );
        }

        assert_eq!(
            game.guess("f"),
            Ok(GuessOutcome::Lost {
                word: "python".to_owned()
            })
        );
        assert_eq!(game.status(), SessionStatus::Lost);
        assert_eq!(game.guess("p"), Err(HangmanError::GameAlreadyOver));
    }

    #[test]
    fn repeat_guess_changes_nothing() {
        let mut game = Hangman::new("python");
        game.guess("z").expect("valid guess");
        game.guess("p").expect("valid guess");

        let before = game.snapshot();

        assert_eq!(game.guess("z"), Err(HangmanError::AlreadyGuessed('z')));
        assert_eq!(game.guess("P"), Err(HangmanError::AlreadyGuessed('p')));
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.wrong_guesses(), 1);
    }

    #[test]
    fn invalid_guesses() {
        let mut game = Hangman::new("python");

        for input in ["", "ab", "1", "?", "  "] {
            assert_eq!(game.guess(input), Err(HangmanError::InvalidGuess));
        }

        assert_eq!(game.wrong_guesses(), 0);
        assert_eq!(game.guessed().count(), 0);
        assert!(game.guess(" Y ").is_ok());
    }

    #[test]
    fn snapshot_description() {
        let mut game = Hangman::new("rust");
        game.guess("u").expect("valid guess");
        game.guess("x").expect("valid guess");
        game.guess("a").expect("valid guess");

        let snapshot = game.snapshot();
        assert_eq!(snapshot.spaced_pattern(), "_ u _ _");
        assert_eq!(snapshot.guessed_list(), "a, u, x");
        assert_eq!(snapshot.wrong, 2);
        assert!(snapshot.description().contains("**Word:** `_ u _ _`"));
    }

    fn table(words: &[&str]) -> (HangmanTable<Memory>, Arc<Ledger<Memory>>) {
        let ledger = Arc::new(Ledger::empty(Memory::default()));
        let words = Arc::new(WordsList::from_words(words.iter().copied()));
        (HangmanTable::new(words, ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn table_records_wins() {
        let (table, ledger) = table(&["python"]);
        let channel = ChannelId::new(1);
        let guild = GuildId::new(2);
        let user = UserId::new(3);

        let snapshot = table.start(channel, Utc::now()).await.expect("empty channel");
        assert_eq!(snapshot.pattern, "______");
        assert_eq!(
            table.start(channel, Utc::now()).await,
            Err(HangmanError::AlreadyInProgress)
        );

        for letter in ["p", "y", "t", "h", "o"] {
            table
                .guess(channel, Some(guild), user, letter)
                .await
                .expect("valid guess");
        }

        let report = table
            .guess(channel, Some(guild), user, "n")
            .await
            .expect("valid guess");
        assert!(matches!(report.outcome, GuessOutcome::Won { .. }));
        assert_eq!(report.snapshot.pattern, "python");
        assert!(report.unsaved.is_none());

        assert!(!table.sessions().contains(channel).await);
        assert_eq!(
            table.guess(channel, Some(guild), user, "a").await.err(),
            Some(HangmanError::NoActiveSession)
        );

        let scores = ledger.stats(guild, user).await.expect("user has won");
        assert_eq!(scores.get(ScoredGame::Hangman), 1);
        assert_eq!(scores.get(ScoredGame::Trivia), 0);
    }

    #[tokio::test]
    async fn table_stop_and_render() {
        let (table, _) = table(&["python"]);
        let channel = ChannelId::new(1);

        assert!(!table.stop(channel).await);
        assert_eq!(
            table.render(channel).await.err(),
            Some(HangmanError::NoActiveSession)
        );

        table.start(channel, Utc::now()).await.expect("empty channel");
        table
            .guess(channel, None, UserId::new(3), "q")
            .await
            .expect("valid guess");

        let (first, board) = table.render(channel).await.expect("game running");
        let (second, _) = table.render(channel).await.expect("game running");
        assert_eq!(first, second);
        assert_eq!(first.wrong, 1);
        assert_eq!(board, None);

        assert!(table.stop(channel).await);
        assert!(!table.sessions().contains(channel).await);
    }
}
