use poise::serenity_prelude::{
    self as serenity, CacheHttp, ChannelId, CreateEmbed, CreateMessage, EditMessage, Http,
    Message, MessageId,
};
use tracing::{debug, trace};

use crate::errors::SendMessageError;

pub trait ChannelIdExt {
    async fn say_ext(
        self,
        cache_http: impl CacheHttp,
        content: impl Into<String>,
    ) -> Result<Message, SendMessageError>;

    async fn send_embed(
        self,
        cache_http: impl CacheHttp,
        embed: CreateEmbed,
    ) -> Result<Message, SendMessageError>;

    /// Edits `board` to show `embed`. If there is no board, or it has been
    /// deleted, sends a new message instead. Returns the board's id.
    async fn upsert_embed(
        self,
        cache_http: impl CacheHttp + Copy,
        board: Option<MessageId>,
        embed: CreateEmbed,
    ) -> Result<MessageId, SendMessageError>;

    /// Deletes a message, ignoring failures.
    async fn delete_quietly(self, http: impl AsRef<Http>, message: MessageId);
}

impl ChannelIdExt for ChannelId {
    async fn say_ext(
        self,
        cache_http: impl CacheHttp,
        content: impl Into<String>,
    ) -> Result<Message, SendMessageError> {
        self.say(cache_http, content)
            .await
            .map_err(SendMessageError::from)
    }

    async fn send_embed(
        self,
        cache_http: impl CacheHttp,
        embed: CreateEmbed,
    ) -> Result<Message, SendMessageError> {
        self.send_message(cache_http, CreateMessage::new().embed(embed))
            .await
            .map_err(SendMessageError::from)
    }

    async fn upsert_embed(
        self,
        cache_http: impl CacheHttp + Copy,
        board: Option<MessageId>,
        embed: CreateEmbed,
    ) -> Result<MessageId, SendMessageError> {
        if let Some(board) = board {
            match self
                .edit_message(cache_http, board, EditMessage::new().embed(embed.clone()))
                .await
            {
                Ok(message) => return Ok(message.id),
                Err(err) if is_not_found(&err) => {
                    debug!(channel = %self, %board, "board is gone, sending a new one");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let message = self.send_embed(cache_http, embed).await?;
        trace!(channel = %self, board = %message.id, "sent new board");

        Ok(message.id)
    }

    async fn delete_quietly(self, http: impl AsRef<Http>, message: MessageId) {
        if let Err(err) = self.delete_message(http, message).await {
            debug!(channel = %self, %message, %err, "couldn't delete message");
        }
    }
}

/// Whether discord answered 404, e.g. for a message someone deleted.
pub fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}
