use chrono::Utc;
use poise::{
    serenity_prelude::{
        CreateEmbed, CreateEmbedFooter, EditMessage, Mentionable, Message, MessageId, UserId,
    },
    CreateReply,
};
use tracing::{debug, instrument};

use crate::{
    commands::LogCommands,
    errors::{CommandError, SendMessageError},
    games::story::{SentenceReport, StoryEnding, StoryError, StorySnapshot},
    utils::{
        format_duration::FormatDuration,
        poise::{colors, CommandResult, ContextExt},
        serenity::channel::ChannelIdExt,
        Context,
    },
    Result,
};

const JOIN_EMOJI: char = '✅';

fn board(snapshot: &StorySnapshot, take_turn_after: chrono::Duration) -> CreateEmbed {
    CreateEmbed::new()
        .title("📖 Story")
        .colour(colors::STORY)
        .description(snapshot.description())
        .footer(CreateEmbedFooter::new(snapshot.footer(take_turn_after)))
}

fn ending(ending: &StoryEnding) -> CreateEmbed {
    CreateEmbed::new()
        .title(ending.title())
        .colour(colors::STORY)
        .description(ending.description())
}

fn help_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("📖 Story")
        .colour(colors::STORY)
        .description(
            "Write a story together, one sentence at a time!\n\n\
            `story start <first sentence>`: open sign-ups for a new story\n\
            `story add <sentence>`: add a sentence on your turn\n\
            `story take`: take the turn from an idle player\n\
            `story stop`: end the story early",
        )
}

async fn show(
    ctx: Context<'_>,
    snapshot: &StorySnapshot,
    previous: Option<MessageId>,
) -> CommandResult {
    let stories = &ctx.data().games().stories;

    let id = ctx
        .show_board(previous, board(snapshot, stories.take_turn_after()))
        .await?;
    stories.sessions().set_board(ctx.channel_id(), id).await;

    Ok(())
}

async fn post_ending(ctx: Context<'_>, story_ending: &StoryEnding) -> CommandResult {
    ctx.send_ext(CreateReply::default().embed(ending(story_ending)))
        .await?;

    if let Some(board) = story_ending.board {
        ctx.channel_id().delete_quietly(ctx.http(), board).await;
    }

    Ok(())
}

/// write a story together, one sentence at a time
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS",
    subcommands("start", "add", "take", "stop")
)]
pub async fn story(ctx: Context<'_>) -> Result<()> {
    _story(ctx).await?;
    Ok(())
}

async fn _story(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    match ctx.data().games().stories.render(ctx.channel_id()).await {
        Ok((snapshot, previous)) => show(ctx, &snapshot, previous).await,
        Err(StoryError::NoActiveSession) => {
            ctx.send_ext(CreateReply::default().embed(help_embed()))
                .await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// start a new story with its first sentence
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS | ADD_REACTIONS | READ_MESSAGE_HISTORY"
)]
async fn start(
    ctx: Context<'_>,
    #[rest]
    #[description = "the first sentence of the story"]
    first_sentence: String,
) -> Result<()> {
    _start(ctx, first_sentence).await?;
    Ok(())
}

async fn _start(ctx: Context<'_>, first_sentence: String) -> CommandResult {
    ctx.log_command().await;
    ctx.delete_invocation().await;

    let channel = ctx.channel_id();
    let stories = &ctx.data().games().stories;
    let opener = ctx.author().id;
    let opener_name = ctx.author_display_name().await;

    let signup_id = stories
        .begin_signup(channel, opener, &opener_name, &first_sentence, Utc::now())
        .await?;

    let window = ctx.data().config().games.signup_window();
    let window_text = chrono::Duration::from_std(window)
        .unwrap_or_else(|_| chrono::Duration::zero())
        .format_largest();

    let signup = CreateEmbed::new()
        .title("📝 A new story is starting!")
        .colour(colors::STORY)
        .description(format!(
            "{} started a story! React with {JOIN_EMOJI} in the next {window_text} to join!",
            opener.mention()
        ))
        .field("First Sentence", &first_sentence, false);

    let message_id = match post_signup(ctx, signup).await {
        Ok(id) => id,
        Err(err) => {
            stories.abort_signup(channel, signup_id).await;
            return Err(err);
        }
    };

    tokio::time::sleep(window).await;

    let Ok(mut message) = channel.message(ctx, message_id).await else {
        if stories.abort_signup(channel, signup_id).await {
            channel
                .say_ext(ctx, "The sign-up message was deleted. Aborting story.")
                .await?;
        }
        return Ok(());
    };

    let joined = match joined_users(ctx, &message).await {
        Ok(joined) => joined,
        Err(err) => {
            stories.abort_signup(channel, signup_id).await;
            return Err(err);
        }
    };

    match stories
        .close_signup(channel, signup_id, joined, Utc::now())
        .await
    {
        Ok(start) => {
            channel.delete_quietly(ctx.http(), message_id).await;

            channel
                .say_ext(
                    ctx,
                    format!(
                        "The story begins with {} players! It's {}'s turn.",
                        start.players,
                        start.first_turn.mention()
                    ),
                )
                .await?;

            show(ctx, &start.snapshot, None).await
        }
        Err(StoryError::InsufficientPlayers) => {
            let cancelled = CreateEmbed::new()
                .title("📝 Story cancelled")
                .colour(colors::STORY)
                .description(StoryError::InsufficientPlayers.to_string());

            message
                .edit(ctx, EditMessage::new().embed(cancelled))
                .await
                .map_err(SendMessageError::from)?;

            Ok(())
        }
        // stopped, or replaced by a newer sign-up
        Err(StoryError::NoActiveSession) => {
            debug!(%channel, "sign-up ended before it closed");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn post_signup(ctx: Context<'_>, signup: CreateEmbed) -> Result<MessageId, CommandError> {
    let handle = ctx.send_ext(CreateReply::default().embed(signup)).await?;
    let message = handle.message().await?;

    message.react(ctx, JOIN_EMOJI).await?;

    Ok(message.id)
}

/// Discord hands out reactors at most this many at a time.
const REACTORS_PER_PAGE: u8 = 100;

async fn joined_users(ctx: Context<'_>, message: &Message) -> Result<Vec<UserId>, CommandError> {
    let mut joined = Vec::new();
    let mut after = None;

    loop {
        let page = message
            .reaction_users(ctx, JOIN_EMOJI, Some(REACTORS_PER_PAGE), after)
            .await?;

        after = page.last().map(|user| user.id);
        let full = page.len() == usize::from(REACTORS_PER_PAGE);

        joined.extend(page.into_iter().filter(|user| !user.bot).map(|user| user.id));

        if !full {
            break;
        }
    }

    Ok(joined)
}

/// add the next sentence on your turn
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn add(
    ctx: Context<'_>,
    #[rest]
    #[description = "your sentence"]
    sentence: String,
) -> Result<()> {
    _add(ctx, sentence).await?;
    Ok(())
}

async fn _add(ctx: Context<'_>, sentence: String) -> CommandResult {
    ctx.log_command().await;

    let author_name = ctx.author_display_name().await;
    let report = ctx
        .data()
        .games()
        .stories
        .add_sentence(
            ctx.channel_id(),
            ctx.author().id,
            author_name,
            sentence,
            Utc::now(),
        )
        .await?;

    ctx.delete_invocation().await;

    match report {
        SentenceReport::Next {
            snapshot, board, ..
        } => show(ctx, &snapshot, board).await,
        SentenceReport::Finished(story_ending) => post_ending(ctx, &story_ending).await,
    }
}

/// take the turn from a player who's gone quiet
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn take(ctx: Context<'_>) -> Result<()> {
    _take(ctx).await?;
    Ok(())
}

async fn _take(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let report = ctx
        .data()
        .games()
        .stories
        .take_turn(ctx.channel_id(), ctx.author().id, Utc::now())
        .await?;

    ctx.reply_ext(format!(
        "{} has taken the turn from {}!",
        ctx.author().mention(),
        report.previous.mention()
    ))
    .await?;

    show(ctx, &report.snapshot, report.board).await
}

/// end the story early
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn stop(ctx: Context<'_>) -> Result<()> {
    _stop(ctx).await?;
    Ok(())
}

async fn _stop(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let privileged = ctx.author_can_manage_guild().await;
    let requester_name = ctx.author_display_name().await;

    let story_ending = ctx
        .data()
        .games()
        .stories
        .stop(
            ctx.channel_id(),
            ctx.author().id,
            &requester_name,
            privileged,
        )
        .await?;

    post_ending(ctx, &story_ending).await
}
