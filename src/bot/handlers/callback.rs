use once_cell::sync::Lazy;
use regex::Regex;

use crate::bot::BotContext;
use crate::error::AppResult;
use crate::telegram::{CallbackQuery, InputFile};

static HISTORY_CALLBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^history:(\d+)$").expect("valid history callback regex"));

/// Index encoded in `history:<n>` button data
pub fn parse_history_index(data: &str) -> Option<usize> {
    HISTORY_CALLBACK
        .captures(data)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Re-send a stored result when its /history button is pressed
pub async fn handle_history_callback(ctx: &BotContext, query: &CallbackQuery) -> AppResult<()> {
    let Some(index) = query.data.as_deref().and_then(parse_history_index) else {
        return Ok(());
    };
    ctx.api.answer_callback_query(&query.id).await?;

    let history = ctx.state.get_history(query.from.id);
    let Some(entry) = history.get(index) else {
        return Ok(());
    };
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat_id())
        .unwrap_or(query.from.id);

    ctx.api
        .send_document(chat_id, InputFile::FileId(entry.file_id.clone()), None)
        .await?;
    Ok(())
}
