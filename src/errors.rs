use poise::{
    serenity_prelude::{self as serenity, Permissions},
    BoxFuture, FrameworkError,
};

use thiserror::Error as ThisError;
use tracing::{debug, error, error_span, warn, Instrument};
use tracing_unwrap::ResultExt;

use crate::{
    framework::data::PoiseData,
    games::{hangman::HangmanError, ledger::LedgerError, story::StoryError, trivia::TriviaError},
    utils::{poise::ContextExt, Context},
};

pub fn handle_framework_error(err: FrameworkError<'_, PoiseData, Error>) -> BoxFuture<()> {
    Box::pin(async {
        match err {
            FrameworkError::Command { error, ctx, .. } => {
                let command = ctx.invoked_command_name();
                let span = error_span!("", command);

                handle_error(error, ctx).instrument(span).await;
            }
            FrameworkError::MissingBotPermissions {
                missing_permissions,
                ctx,
                ..
            } => {
                let command = ctx.invoked_command_name();
                let _enter = error_span!("", command).entered();

                error!(%missing_permissions, "bot is missing permissions");
            }
            _ => {
                poise::builtins::on_error(err)
                    .await
                    .expect_or_log("failed to handle framework error");
            }
        };
    })
}

async fn handle_error(err: Error, ctx: Context<'_>) {
    err.trace();

    if let Err(reply_err) = ctx.reply_ext(err.to_string()).await {
        error!(%reply_err, "couldn't send error message");
    }
}

#[derive(Debug, ThisError)]
pub enum CommandError {
    #[error(transparent)]
    Hangman(#[from] HangmanError),

    #[error(transparent)]
    Story(#[from] StoryError),

    #[error("The win was counted, but the leaderboard couldn't be saved.")]
    Ledger(#[from] LedgerError),

    #[error("Could not reach the trivia service. Please try again later.")]
    Trivia(#[from] TriviaError),

    #[error("input error: {0}")]
    SendMessage(#[from] SendMessageError),

    #[error("other serenity error: {0}")]
    Serenity(#[from] serenity::Error),
}

impl CommandError {
    /// Game errors are the player's mistake; the rest is ours.
    pub fn trace(&self) {
        match self {
            Self::Hangman(err) => debug!(%err, "hangman rejected action"),
            Self::Story(err) => debug!(%err, "story rejected action"),
            Self::Ledger(err) => error!(%err, "leaderboard write failed"),
            Self::Trivia(err) => error!(%err, "trivia api failed"),
            Self::SendMessage(err) => err.trace(),
            Self::Serenity(err) => error!(%err, "serenity error"),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Config(#[from] crate::framework::config::Error),
}

impl Error {
    pub fn trace(&self) {
        match self {
            Self::Command(err) => err.trace(),
            Self::Config(err) => error!(%err, "config error"),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum SendMessageError {
    #[error(transparent)]
    Permissions(#[from] MissingPermissionsError),

    #[error(transparent)]
    MessageTooLong(#[from] MessageTooLongError),

    #[error("couldn't send message: {0}")]
    Other(serenity::Error),
}

impl SendMessageError {
    fn trace(&self) {
        match self {
            Self::Permissions(err) => {
                warn!(required = %err.required, present = %err.present, "{err}");
            }
            Self::MessageTooLong(err) => warn!(length = err.length, "{err}"),
            Self::Other(err) => error!(%err, "couldn't send message"),
        }
    }
}

impl From<serenity::Error> for SendMessageError {
    fn from(value: serenity::Error) -> Self {
        match value {
            serenity::Error::Model(ref model) => match model {
                serenity::ModelError::InvalidPermissions { required, present } => {
                    Self::Permissions(MissingPermissionsError {
                        required: *required,
                        present: *present,
                    })
                }
                serenity::ModelError::MessageTooLong(len) => {
                    Self::MessageTooLong(MessageTooLongError { length: *len })
                }
                _ => Self::Other(value),
            },
            _ => Self::Other(value),
        }
    }
}

#[derive(Debug, ThisError)]
#[error("missing permissions: {}", self.missing())]
pub struct MissingPermissionsError {
    required: Permissions,
    present: Permissions,
}

impl MissingPermissionsError {
    fn missing(&self) -> Permissions {
        self.required.difference(self.present)
    }
}

#[derive(Debug, ThisError)]
#[error("message is too long")]
pub struct MessageTooLongError {
    pub length: usize,
}
