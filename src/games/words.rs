use std::{fs, path::Path};

use rand::{seq::SliceRandom, Rng};
use tracing::{info, warn};

/// Used when no words file exists at all.
const DEFAULT_WORDS: [&str; 5] = ["python", "discord", "bot", "hangman", "trivia"];

/// Used when the words file exists but holds nothing usable.
const FALLBACK_WORDS: [&str; 3] = ["python", "discord", "bot"];

/// Candidate secret words for hangman.
#[derive(Debug, Clone)]
pub struct WordsList {
    words: Vec<String>,
}

impl WordsList {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(text) => {
                let list = Self::from_lines(&text);
                info!(?path, words = list.words.len(), "loaded words list");
                list
            }
            Err(err) => {
                warn!(?path, %err, "couldn't read words list, using defaults");
                Self::from_words(DEFAULT_WORDS)
            }
        }
    }

    /// Keeps lines that are purely alphabetic and longer than 3 characters.
    pub fn from_lines(text: &str) -> Self {
        let words: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.chars().count() > 3 && line.chars().all(char::is_alphabetic))
            .map(str::to_lowercase)
            .collect();

        if words.is_empty() {
            warn!("words list has no usable words, using fallback");
            Self::from_words(FALLBACK_WORDS)
        } else {
            Self { words }
        }
    }

    pub fn from_words<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn random(&self, rng: &mut impl Rng) -> &str {
        self.words
            .choose(rng)
            .map_or(FALLBACK_WORDS[0], String::as_str)
    }
}
