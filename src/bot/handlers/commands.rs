use crate::bot::report::{escape_html, format_stats_report, truncate_label};
use crate::bot::state::today;
use crate::bot::BotContext;
use crate::error::AppResult;
use crate::modules::charts;
use crate::modules::i18n::{self, t};
use crate::telegram::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, Message, ParseMode, SendMessage,
};

use super::locale_of;

pub async fn handle_start(ctx: &BotContext, msg: &Message) -> AppResult<()> {
    let text = t(i18n::WELCOME, locale_of(msg), &[]);
    ctx.api
        .send_message(SendMessage::new(msg.chat_id(), text))
        .await?;
    Ok(())
}

pub async fn handle_help(ctx: &BotContext, msg: &Message) -> AppResult<()> {
    let limit = ctx.state.max_images_per_day().to_string();
    let text = t(i18n::HELP, locale_of(msg), &[("limit", &limit)]);
    ctx.api
        .send_message(SendMessage::new(msg.chat_id(), text).parse_mode(ParseMode::MarkdownV2))
        .await?;
    Ok(())
}

/// One button per stored result; the callback re-sends the document
pub async fn handle_history(ctx: &BotContext, msg: &Message) -> AppResult<()> {
    let locale = locale_of(msg);
    let Some(user_id) = msg.user_id() else {
        return Ok(());
    };
    let history = ctx.state.get_history(user_id);

    if history.is_empty() {
        ctx.api
            .send_message(SendMessage::new(
                msg.chat_id(),
                t(i18n::HISTORY_EMPTY, locale, &[]),
            ))
            .await?;
        return Ok(());
    }

    let buttons = history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            vec![InlineKeyboardButton {
                text: format!("{}. {}", i + 1, truncate_label(entry.display_name())),
                callback_data: format!("history:{}", i),
            }]
        })
        .collect();

    let count = history.len().to_string();
    ctx.api
        .send_message(
            SendMessage::new(
                msg.chat_id(),
                t(i18n::HISTORY_TITLE, locale, &[("count", &count)]),
            )
            .reply_markup(InlineKeyboardMarkup {
                inline_keyboard: buttons,
            }),
        )
        .await?;
    Ok(())
}

/// Admin-only usage report; silently ignored for everyone else
pub async fn handle_stats(ctx: &BotContext, msg: &Message) -> AppResult<()> {
    let Some(user_id) = msg.user_id() else {
        return Ok(());
    };
    if !ctx.config.is_admin(user_id) {
        return Ok(());
    }

    let stats = ctx.state.stats().await;
    let today = today();
    let report = format_stats_report(&stats, today);
    ctx.api
        .send_message(
            SendMessage::new(msg.chat_id(), format!("<pre>{}</pre>", escape_html(&report)))
                .parse_mode(ParseMode::Html),
        )
        .await?;

    let (overview, top_users) = tokio::task::spawn_blocking(move || -> AppResult<_> {
        let overview = charts::render_overview_chart(&stats, today)?;
        let top_users = charts::render_top_users_chart(&stats.user_counts, 10)?;
        Ok((overview, top_users))
    })
    .await??;

    ctx.api
        .send_photo(
            msg.chat_id(),
            InputFile::bytes(overview, "overview.png"),
            None,
        )
        .await?;
    if let Some(top_users) = top_users {
        ctx.api
            .send_photo(
                msg.chat_id(),
                InputFile::bytes(top_users, "top_users.png"),
                None,
            )
            .await?;
    }
    Ok(())
}
