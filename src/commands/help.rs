use chrono::Utc;
use tracing::instrument;

use crate::{
    commands::LogCommands,
    errors::SendMessageError,
    utils::{format_duration::FormatDuration, poise::CommandResult, Context},
    Result,
};

/// show the games and how to play them
#[instrument(skip_all)]
#[poise::command(
    slash_command,
    prefix_command,
    discard_spare_arguments,
    required_bot_permissions = "SEND_MESSAGES | VIEW_CHANNEL"
)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "specific command to display help for"] command: Option<String>,
) -> Result<()> {
    _help(ctx, command).await?;
    Ok(())
}

async fn _help(ctx: Context<'_>, command: Option<String>) -> CommandResult {
    ctx.log_command().await;

    let prefix = ctx.data().config().bot.prefix();
    let uptime = Utc::now() - ctx.data().started;

    let bottom = format!(
        "Type {prefix}help <command> for more on a command. \
        Up for {}.",
        uptime.format_largest()
    );

    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: &bottom,
            ..Default::default()
        },
    )
    .await
    .map_err(SendMessageError::from)?;

    Ok(())
}
