use std::path::PathBuf;

const TOKEN_VAR: &str = "PARLORBOT_TOKEN";
const CONFIG_FILE_VAR: &str = "PARLORBOT_CONFIG_FILE";

const DEFAULT_CONFIG_FILE: &str = "./parlorbot.toml";

/// Settings that come from environment variables rather than the config file.
#[derive(Debug, Clone)]
pub struct Environment {
    token: String,
    config_file: String,
}

impl Environment {
    pub(super) fn load() -> Result<Self, Error> {
        Self::from_vars(
            std::env::var(TOKEN_VAR).ok(),
            std::env::var(CONFIG_FILE_VAR).ok().map(PathBuf::from),
        )
    }

    fn from_vars(token: Option<String>, config_file: Option<PathBuf>) -> Result<Self, Error> {
        let token = token.filter(|t| !t.trim().is_empty()).ok_or(Error {
            key: TOKEN_VAR,
            message: "not set",
        })?;

        let config_file = config_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
            .to_str()
            .ok_or(Error {
                key: CONFIG_FILE_VAR,
                message: "path to configuration must be valid UTF-8",
            })?
            .to_owned();

        Ok(Self { token, config_file })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}

#[derive(Debug, thiserror::Error)]
#[error("couldn't load environment variable '{key}': {message}")]
pub struct Error {
    key: &'static str,
    message: &'static str,
}
