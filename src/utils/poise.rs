use poise::{
    serenity_prelude::{CreateEmbed, MessageId},
    CreateReply,
};
use tracing::debug;

use crate::{
    errors::{CommandError, SendMessageError},
    framework::data::PoiseData,
    utils::serenity::channel::ChannelIdExt,
};

pub type Context<'a> = poise::Context<'a, PoiseData, crate::errors::Error>;

pub type Command = poise::Command<PoiseData, crate::errors::Error>;
pub type CommandResult = Result<(), CommandError>;

pub trait ContextExt {
    async fn send_ext(
        &self,
        builder: CreateReply,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError>;

    async fn reply_ext(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError>;

    /// Deletes the message a prefix command was invoked with, if allowed.
    async fn delete_invocation(&self);

    /// Shows a game board and returns its message id. Prefix commands edit
    /// the existing board in place. Slash commands have to answer the
    /// interaction, so they post a new board and delete the old one.
    async fn show_board(
        &self,
        board: Option<MessageId>,
        embed: CreateEmbed,
    ) -> Result<MessageId, SendMessageError>;

    async fn author_display_name(&self) -> String;

    async fn author_can_manage_guild(&self) -> bool;
}

impl ContextExt for Context<'_> {
    async fn send_ext(
        &self,
        builder: CreateReply,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError> {
        self.send(builder).await.map_err(SendMessageError::from)
    }

    async fn reply_ext(
        &self,
        text: impl Into<String>,
    ) -> Result<poise::ReplyHandle<'_>, SendMessageError> {
        self.send_ext(CreateReply::default().reply(true).content(text))
            .await
    }

    async fn delete_invocation(&self) {
        if let poise::Context::Prefix(prefix) = self {
            if let Err(err) = prefix.msg.delete(self.http()).await {
                debug!(%err, "couldn't delete invoking message");
            }
        }
    }

    async fn show_board(
        &self,
        board: Option<MessageId>,
        embed: CreateEmbed,
    ) -> Result<MessageId, SendMessageError> {
        let channel = self.channel_id();

        match self {
            poise::Context::Prefix(_) => channel.upsert_embed(*self, board, embed).await,
            poise::Context::Application(_) => {
                let handle = self.send_ext(CreateReply::default().embed(embed)).await?;
                let id = handle.message().await?.id;

                if let Some(old) = board {
                    channel.delete_quietly(self.http(), old).await;
                }

                Ok(id)
            }
        }
    }

    async fn author_display_name(&self) -> String {
        match self.author_member().await {
            Some(member) => member.display_name().to_owned(),
            None => self.author().display_name().to_owned(),
        }
    }

    async fn author_can_manage_guild(&self) -> bool {
        let Some(member) = self.author_member().await else {
            return false;
        };

        if let Some(permissions) = member.permissions {
            return permissions.manage_guild();
        }

        self.guild()
            .is_some_and(|guild| guild.member_permissions(&member).manage_guild())
    }
}

/// Colours shared by every game embed.
pub mod colors {
    use poise::serenity_prelude::Colour;

    pub const HANGMAN: Colour = Colour::BLUE;
    pub const STORY: Colour = Colour::DARK_GREEN;
    pub const TRIVIA: Colour = Colour::PURPLE;
    pub const LEADERBOARD: Colour = Colour::GOLD;
}
