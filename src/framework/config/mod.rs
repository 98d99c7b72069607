mod app;
use std::ops::Deref;

pub use app::AppConfig as Config;

pub mod env;
pub use env::Environment;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("problem loading environment: {0}")]
    Env(#[from] env::Error),

    #[error("problem loading config file: {0}")]
    App(#[from] app::Error),
}

#[derive(Debug, Clone)]
pub struct ConfigSetup {
    pub app: Config,
    pub env: Environment,
}

impl ConfigSetup {
    #[tracing::instrument(skip_all, name = "config")]
    pub fn load() -> Result<Self, Error> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(%err, "no .env file loaded");
        }

        let env = Environment::load()?;
        let app = Config::load(&env)?;

        tracing::info!(file = env.config_file(), "config loaded");

        Ok(Self { app, env })
    }

    pub fn token(&self) -> &str {
        self.env.token()
    }

    pub fn finish(self) -> Config {
        self.app
    }
}

impl Deref for ConfigSetup {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.app
    }
}
