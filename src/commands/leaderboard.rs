use poise::{
    serenity_prelude::{CreateEmbed, GuildId, Mentionable, User, UserId},
    CreateReply,
};
use tracing::instrument;

use crate::{
    commands::LogCommands,
    games::ledger::ScoredGame,
    utils::{
        poise::{colors, CommandResult, ContextExt},
        Context,
    },
    Result,
};

const TOP_N: usize = 10;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Numbered standings, medals for the podium.
fn format_leaderboard(entries: &[(String, u64)]) -> String {
    let lines: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, (name, score))| {
            let place = MEDALS
                .get(i)
                .map_or_else(|| format!("**#{}**", i + 1), |medal| (*medal).to_owned());

            format!("{place} {name} - {score} wins")
        })
        .collect();

    lines.join("\n")
}

async fn display_name(ctx: Context<'_>, guild: GuildId, user: UserId) -> String {
    match guild.member(ctx, user).await {
        Ok(member) => member.display_name().to_owned(),
        Err(_) => user.mention().to_string(),
    }
}

/// show this server's top players for a game
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    aliases("lb"),
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
pub async fn leaderboard(
    ctx: Context<'_>,
    #[description = "which game"] game: ScoredGame,
) -> Result<()> {
    _leaderboard(ctx, game).await?;
    Ok(())
}

async fn _leaderboard(ctx: Context<'_>, game: ScoredGame) -> CommandResult {
    ctx.log_command().await;

    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };

    let board = ctx
        .data()
        .games()
        .ledger
        .leaderboard(guild, game, TOP_N)
        .await;

    if board.is_empty() {
        ctx.reply_ext("There are no scores on the leaderboard for this server yet.")
            .await?;
        return Ok(());
    }

    let mut entries = Vec::with_capacity(board.len());
    for (user, score) in board {
        entries.push((display_name(ctx, guild, user).await, score));
    }

    let embed = CreateEmbed::new()
        .title(format!("🏆 {} Leaderboard", game.title()))
        .colour(colors::LEADERBOARD)
        .description(format_leaderboard(&entries));

    ctx.send_ext(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// show a player's wins in this server
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL | EMBED_LINKS"
)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "whose rank to show (defaults to you)"] user: Option<User>,
) -> Result<()> {
    _rank(ctx, user).await?;
    Ok(())
}

async fn _rank(ctx: Context<'_>, user: Option<User>) -> CommandResult {
    ctx.log_command().await;

    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };

    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let name = display_name(ctx, guild, user.id).await;

    let Some(scores) = ctx.data().games().ledger.stats(guild, user.id).await else {
        ctx.reply_ext(format!("{name} hasn't played any games yet."))
            .await?;
        return Ok(());
    };

    let mut embed = CreateEmbed::new()
        .title(format!("📊 {name}'s Stats"))
        .colour(colors::LEADERBOARD)
        .field("🧠 Trivia Wins", scores.trivia_wins.to_string(), true)
        .field("🪢 Hangman Wins", scores.hangman_wins.to_string(), true);

    if let Some(avatar) = user.avatar_url() {
        embed = embed.thumbnail(avatar);
    }

    ctx.send_ext(CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::format_leaderboard;

    #[test]
    fn medals_then_numbers() {
        let entries: Vec<(String, u64)> = [("ann", 9), ("bo", 7), ("cy", 7), ("di", 2), ("ed", 0)]
            .into_iter()
            .map(|(name, score)| (name.to_owned(), score))
            .collect();

        assert_eq!(
            format_leaderboard(&entries),
            "🥇 ann - 9 wins\n\
            🥈 bo - 7 wins\n\
            🥉 cy - 7 wins\n\
            **#4** di - 2 wins\n\
            **#5** ed - 0 wins"
        );
    }

    #[test]
    fn empty_board_is_blank() {
        assert_eq!(format_leaderboard(&[]), "");
    }
}
