use poise::{
    serenity_prelude::{self as serenity, ChannelId, FullEvent, MessageId},
    BoxFuture, FrameworkContext,
};
use tracing::{info, trace};

use crate::errors::Error;

use super::data::PoiseData;

async fn event_handler(
    _serenity_ctx: &serenity::Context,
    event: &FullEvent,
    _framework_ctx: FrameworkContext<'_, PoiseData, Error>,
    data: &PoiseData,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!(name = %data_about_bot.user.name, "connected to discord");
        }
        FullEvent::MessageDelete {
            channel_id,
            deleted_message_id,
            ..
        } => forget_board(data, *channel_id, *deleted_message_id).await,
        FullEvent::MessageDeleteBulk {
            channel_id,
            multiple_deleted_messages_ids,
            ..
        } => {
            for message in multiple_deleted_messages_ids {
                forget_board(data, *channel_id, *message).await;
            }
        }
        _ => (),
    }

    Ok(())
}

/// Drops a deleted board so the next update sends a fresh one.
async fn forget_board(data: &PoiseData, channel: ChannelId, message: MessageId) {
    let games = data.games();

    let hangman = games.hangman.sessions().forget_board(channel, message).await;
    let story = games.stories.sessions().forget_board(channel, message).await;

    if hangman || story {
        trace!(%channel, %message, "board message deleted");
    }
}

pub fn poise<'a>(
    serenity_ctx: &'a serenity::Context,
    event: &'a FullEvent,
    framework_ctx: FrameworkContext<'a, PoiseData, Error>,
    data: &'a PoiseData,
) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(event_handler(serenity_ctx, event, framework_ctx, data))
}
