use poise::serenity_prelude::{ActivityData, ChannelId, GuildId};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

#[derive(Deserialize, Debug, Clone)]
pub struct BotConfig {
    testing_server: Option<GuildId>,
    activity: Option<String>,
    #[serde(default = "default_prefix")]
    prefix: String,
    status_channel: Option<ChannelId>,
}

fn default_prefix() -> String {
    "?".to_owned()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            testing_server: None,
            activity: None,
            prefix: default_prefix(),
            status_channel: None,
        }
    }
}

impl BotConfig {
    pub fn testing_server(&self) -> Option<GuildId> {
        if self.testing_server.is_none() {
            debug!("no testing server set in config, registering commands globally");
        }

        self.testing_server
    }

    pub fn activity(&self) -> Option<ActivityData> {
        let Some(activity) = &self.activity else {
            warn!("no bot.activity provided in config, defaulting to none");
            return None;
        };

        if activity.is_empty() {
            warn!("bot.activity provided in config as empty string, defaulting to none");
            return None;
        }

        let parsed_activity = if let Some(name) = activity.strip_prefix("playing ") {
            ActivityData::playing(name)
        } else if let Some(name) = activity.strip_prefix("listening to ") {
            ActivityData::listening(name)
        } else if let Some(name) = activity.strip_prefix("watching ") {
            ActivityData::watching(name)
        } else if let Some(name) = activity.strip_prefix("competing in ") {
            ActivityData::competing(name)
        } else {
            error!("bot.activity in config could not be parsed - must start with `playing`, `listening to`, `watching` or `competing in`");
            warn!("disabling bot activity");
            return None;
        };

        debug!(
            "bot.activity parsed as {:?}: {}",
            parsed_activity.kind, parsed_activity.name
        );
        info!("successfully parsed bot activity from config");

        Some(parsed_activity)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub const fn status_channel(&self) -> Option<ChannelId> {
        self.status_channel
    }
}
