// Update handlers, routed in the same order the bot registers them:
// commands, inline mode, history buttons, images, ZIP archives, other documents

pub mod archive;
pub mod callback;
pub mod commands;
pub mod images;
pub mod inline;

#[cfg(test)]
pub(crate) mod test_support;

use tracing::{debug, error};

use super::BotContext;
use crate::error::AppResult;
use crate::modules::i18n::Locale;
use crate::telegram::{Message, Update};

/// `/cmd@bot_name args` -> `cmd`
pub fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    let command = command.split('@').next().unwrap_or(command);
    if command.is_empty() {
        None
    } else {
        Some(command)
    }
}

pub fn locale_of(message: &Message) -> Locale {
    Locale::from_language_code(message.language_code())
}

pub async fn dispatch(ctx: &BotContext, update: Update) {
    let update_id = update.update_id;
    if let Err(e) = route(ctx, update).await {
        error!("Failed to handle update {}: {}", update_id, e);
    }
}

async fn route(ctx: &BotContext, update: Update) -> AppResult<()> {
    if let Some(query) = update.inline_query {
        return inline::handle_inline_query(ctx, &query).await;
    }
    if let Some(query) = update.callback_query {
        return callback::handle_history_callback(ctx, &query).await;
    }
    let Some(message) = update.message else {
        debug!("Ignoring update {} without a supported payload", update.update_id);
        return Ok(());
    };

    if let Some(command) = message.text.as_deref().and_then(parse_command) {
        return match command {
            "start" => commands::handle_start(ctx, &message).await,
            "help" => commands::handle_help(ctx, &message).await,
            "history" => commands::handle_history(ctx, &message).await,
            "stats" => commands::handle_stats(ctx, &message).await,
            other => {
                debug!("Ignoring unknown command /{}", other);
                Ok(())
            }
        };
    }

    if message.photo.is_some() {
        return images::handle_image(ctx, message).await;
    }
    match &message.document {
        Some(doc) if doc.is_image() => images::handle_image(ctx, message).await,
        Some(doc) if doc.is_zip() => archive::handle_zip(ctx, &message).await,
        Some(_) => images::handle_image(ctx, message).await,
        None => Ok(()),
    }
}
