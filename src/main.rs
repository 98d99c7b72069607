#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

mod commands;

mod errors;
pub use errors::Error;

mod framework;
use framework::{config::ConfigSetup, data::PoiseData};

/// Hangman, stories, trivia and the score ledger.
mod games;

mod utils;

use poise::serenity_prelude::{self as serenity, GatewayIntents};
use tracing::info;
use tracing_unwrap::ResultExt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[tokio::main]
async fn main() {
    framework::logging::init_tracing();

    info!("parlorbot {}", env!("CARGO_PKG_VERSION"));

    let setup = ConfigSetup::load().expect_or_log("failed to load config");

    if let Some(flavor_text) = setup.logs.flavor_text() {
        info!("{flavor_text}");
    }

    let token = setup.token().to_owned();
    let data = PoiseData::new(setup.finish()).await;

    let framework = framework::poise::build(data);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await
        .expect_or_log("client should be valid");

    client
        .start()
        .await
        .expect_or_log("client should not return error");
}
