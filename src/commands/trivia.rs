use poise::{
    serenity_prelude::{collector::MessageCollector, CreateEmbed, CreateEmbedFooter},
    CreateReply,
};
use tracing::{debug, instrument};

use crate::{
    commands::LogCommands,
    games::{ledger::ScoredGame, trivia::Category},
    utils::{
        poise::{colors, CommandResult, ContextExt},
        Context,
    },
    Result,
};

/// answer a multiple-choice trivia question
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS | READ_MESSAGE_HISTORY",
    subcommands("categories")
)]
pub async fn trivia(
    ctx: Context<'_>,
    #[description = "category id, see `trivia categories`"] category: Option<u32>,
) -> Result<()> {
    _trivia(ctx, category).await?;
    Ok(())
}

async fn _trivia(ctx: Context<'_>, category: Option<u32>) -> CommandResult {
    ctx.log_command().await;

    let games = ctx.data().games();

    ctx.defer().await?;
    let question = games.trivia.question(category).await?;

    let embed = CreateEmbed::new()
        .title("🧠 Trivia Time!")
        .colour(colors::TRIVIA)
        .description(question.description())
        .footer(CreateEmbedFooter::new(question.footer()));

    ctx.send_ext(CreateReply::default().embed(embed)).await?;

    let options = question.options().len();
    let answer = MessageCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(ctx.data().config().games.trivia_answer_window())
        .filter(move |msg| {
            msg.content
                .trim()
                .parse::<usize>()
                .is_ok_and(|choice| (1..=options).contains(&choice))
        })
        .next()
        .await;

    let correct = question.correct_answer();

    let Some(answer) = answer else {
        debug!("trivia answer timed out");
        ctx.reply_ext(format!("Time's up! The correct answer was **{correct}**."))
            .await?;
        return Ok(());
    };

    if question.check(&answer.content) == Some(true) {
        let saved = match ctx.guild_id() {
            Some(guild) => games
                .ledger
                .record_win(guild, ctx.author().id, ScoredGame::Trivia)
                .await
                .map(drop),
            None => Ok(()),
        };

        ctx.reply_ext(format!("Correct! 🎉 The answer was **{correct}**."))
            .await?;

        saved?;
    } else {
        ctx.reply_ext(format!(
            "Sorry, that's incorrect. The correct answer was **{correct}**."
        ))
        .await?;
    }

    Ok(())
}

fn category_list(categories: &[Category]) -> String {
    let lines: Vec<String> = categories
        .iter()
        .map(|category| format!("**{}**: {}", category.id, category.name))
        .collect();

    lines.join("\n")
}

/// list the trivia categories
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
async fn categories(ctx: Context<'_>) -> Result<()> {
    _categories(ctx).await?;
    Ok(())
}

async fn _categories(ctx: Context<'_>) -> CommandResult {
    ctx.log_command().await;

    ctx.defer().await?;
    let categories = ctx.data().games().trivia.categories().await?;

    let embed = CreateEmbed::new()
        .title("🧠 Trivia Categories")
        .colour(colors::TRIVIA)
        .description(category_list(&categories))
        .footer(CreateEmbedFooter::new(
            "Use `trivia <id>` for a question from one category.",
        ));

    ctx.send_ext(CreateReply::default().embed(embed)).await?;

    Ok(())
}
