use chrono::Utc;
use poise::serenity_prelude::CreateEmbed;
use tracing::instrument;

use crate::{
    commands::LogCommands,
    errors::CommandError,
    games::hangman::{GuessOutcome, HangmanSnapshot},
    utils::{
        poise::{colors, CommandResult, ContextExt},
        Context,
    },
    Result,
};

fn board(snapshot: &HangmanSnapshot) -> CreateEmbed {
    CreateEmbed::new()
        .title("🪢 Hangman")
        .colour(colors::HANGMAN)
        .description(snapshot.description())
}

/// guess a letter, or show the current board
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    aliases("hm"),
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS",
    subcommands("start", "guess", "stop")
)]
pub async fn hangman(
    ctx: Context<'_>,
    #[rest]
    #[description = "a single letter"]
    letter: Option<String>,
) -> Result<()> {
    _hangman(ctx, letter).await?;
    Ok(())
}

async fn _hangman(ctx: Context<'_>, letter: Option<String>) -> CommandResult {
    ctx.log_command().await;

    match letter {
        Some(letter) => play(ctx, &letter).await,
        None => {
            let hangman = &ctx.data().games().hangman;
            let (snapshot, previous) = hangman.render(ctx.channel_id()).await?;

            let id = ctx.show_board(previous, board(&snapshot)).await?;
            hangman.sessions().set_board(ctx.channel_id(), id).await;

            Ok(())
        }
    }
}

/// start a new game in this channel
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn start(ctx: Context<'_>) -> Result<()> {
    _start(ctx).await?;
    Ok(())
}

async fn _start(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let hangman = &ctx.data().games().hangman;
    let snapshot = hangman.start(ctx.channel_id(), Utc::now()).await?;

    ctx.reply_ext(format!(
        "A new hangman game has started! The word has {} letters. \
        Guess with `hangman <letter>`.",
        snapshot.pattern.chars().count()
    ))
    .await?;

    let id = ctx.show_board(None, board(&snapshot)).await?;
    hangman.sessions().set_board(ctx.channel_id(), id).await;

    Ok(())
}

/// guess a letter
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn guess(
    ctx: Context<'_>,
    #[rest]
    #[description = "a single letter"]
    letter: String,
) -> Result<()> {
    _guess(ctx, letter).await?;
    Ok(())
}

async fn _guess(ctx: Context<'_>, letter: String) -> CommandResult {
    ctx.log_command().await;
    play(ctx, &letter).await
}

async fn play(ctx: Context<'_>, input: &str) -> CommandResult {
    let channel = ctx.channel_id();
    let hangman = &ctx.data().games().hangman;

    let report = hangman
        .guess(channel, ctx.guild_id(), ctx.author().id, input)
        .await?;

    let id = ctx.show_board(report.board, board(&report.snapshot)).await?;

    match &report.outcome {
        GuessOutcome::Won { word } => {
            ctx.reply_ext(format!("Congratulations! You guessed the word: **{word}**"))
                .await?;
        }
        GuessOutcome::Lost { word } => {
            ctx.reply_ext(format!("You lost! The word was **{word}**."))
                .await?;
        }
        GuessOutcome::Hit { .. } | GuessOutcome::Miss { .. } => {
            hangman.sessions().set_board(channel, id).await;
        }
    }

    match report.unsaved {
        Some(err) => Err(CommandError::from(err)),
        None => Ok(()),
    }
}

/// stop the game in this channel
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
async fn stop(ctx: Context<'_>) -> Result<()> {
    _stop(ctx).await?;
    Ok(())
}

async fn _stop(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    let reply = if ctx.data().games().hangman.stop(ctx.channel_id()).await {
        "The hangman game has been stopped."
    } else {
        "There is no hangman game to stop in this channel."
    };

    ctx.reply_ext(reply).await?;

    Ok(())
}
