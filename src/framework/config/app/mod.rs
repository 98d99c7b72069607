use rand::seq::IteratorRandom;
use serde::Deserialize;
use tracing::warn;

use super::Environment;

mod bot;
pub use bot::BotConfig;

mod games;
pub use games::GamesConfig;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub games: GamesConfig,
}

impl AppConfig {
    /// Reads the config file named by the environment. A missing file leaves
    /// every setting at its default.
    pub(super) fn load(env: &Environment) -> Result<Self, Error> {
        Self::from_source(
            ::config::File::new(env.config_file(), ::config::FileFormat::Toml).required(false),
        )
    }

    fn from_source(source: impl ::config::Source + Send + Sync + 'static) -> Result<Self, Error> {
        ::config::Config::builder()
            .add_source(source)
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file read error: {0}")]
    Read(::config::ConfigError),

    #[error("parsing error: {0}")]
    Parse(::config::ConfigError),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LogsConfig {
    #[serde(default)]
    flavor_texts: Vec<String>,
}

impl LogsConfig {
    pub fn flavor_text(&self) -> Option<&str> {
        let flavor_text = self
            .flavor_texts
            .iter()
            .choose(&mut rand::thread_rng())
            .map(String::as_str);

        if flavor_text.is_none() {
            warn!("no flavor texts provided in config :(");
        }

        flavor_text
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use poise::serenity_prelude::{ActivityType, ChannelId};
    use pretty_assertions::assert_eq;

    use super::AppConfig;

    fn parse(toml: &str) -> AppConfig {
        AppConfig::from_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .expect("valid config")
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse("");

        assert_eq!(config.bot.prefix(), "?");
        assert!(config.bot.activity().is_none());
        assert!(config.logs.flavor_text().is_none());
        assert_eq!(config.games.story_limit, 15);
        assert_eq!(config.games.signup_window(), Duration::from_secs(30));
        assert_eq!(config.games.take_turn_after(), chrono::Duration::minutes(5));
        assert_eq!(config.games.trivia_answer_window(), Duration::from_secs(30));
        assert_eq!(
            config.games.ledger_file.to_str(),
            Some("servers/leaderboard.json")
        );
    }

    #[test]
    fn reads_every_section() {
        let config = parse(
            r#"
            [bot]
            prefix = "!"
            activity = "listening to stories"
            status_channel = 1234

            [logs]
            flavor_texts = ["hello"]

            [games]
            words_file = "words.txt"
            story_limit = 5
            take_turn_after_secs = 60
            "#,
        );

        assert_eq!(config.bot.prefix(), "!");
        assert_eq!(config.bot.status_channel(), Some(ChannelId::new(1234)));
        assert_eq!(config.logs.flavor_text(), Some("hello"));
        assert_eq!(config.games.story_limit, 5);
        assert_eq!(config.games.take_turn_after(), chrono::Duration::minutes(1));
        assert_eq!(config.games.signup_window(), Duration::from_secs(30));

        let activity = config.bot.activity().expect("activity is valid");
        assert_eq!(activity.kind, ActivityType::Listening);
        assert_eq!(activity.name, "stories");
    }

    #[test]
    fn bad_activity_is_ignored() {
        let config = parse(
            r#"
            [bot]
            activity = "dancing"
            "#,
        );

        assert!(config.bot.activity().is_none());
    }
}
