//! Turn-based mini-games and the score ledger they report to.
//!
//! Every game kind keeps its live sessions in its own [`Registry`], keyed by
//! channel. Sessions never outlive the process; only the [`ledger`] is durable.

pub mod hangman;
pub mod ledger;
pub mod registry;
pub mod story;
pub mod trivia;
pub mod words;

pub use registry::Registry;

pub(crate) type UtcDateTime = chrono::DateTime<chrono::Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Hangman,
    Story,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hangman => f.write_str("hangman"),
            Self::Story => f.write_str("story"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    InProgress,
    Won,
    Lost,
    Ended,
}

impl SessionStatus {
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// State that can live in a [`Registry`].
pub trait Game {
    const KIND: GameKind;

    fn status(&self) -> SessionStatus;
}
