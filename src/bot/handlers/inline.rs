use crate::bot::report::format_timestamp;
use crate::bot::BotContext;
use crate::error::AppResult;
use crate::modules::i18n::{self, t, Locale};
use crate::telegram::{
    InlineQuery, InlineQueryAnswer, InlineQueryResultCachedDocument, InlineQueryResultsButton,
};

const MAX_RESULTS: usize = 20;
const CACHE_TIME: u32 = 5;

/// `@bot <search>` in any chat lists the user's recent results
pub async fn handle_inline_query(ctx: &BotContext, query: &InlineQuery) -> AppResult<()> {
    let history = ctx.state.get_history(query.from.id);

    if history.is_empty() {
        let locale = Locale::from_language_code(query.from.language_code.as_deref());
        ctx.api
            .answer_inline_query(InlineQueryAnswer {
                inline_query_id: query.id.clone(),
                results: Vec::new(),
                button: Some(InlineQueryResultsButton {
                    text: t(i18n::INLINE_OPEN_BOT, locale, &[]),
                    start_parameter: "inline".to_string(),
                }),
                cache_time: CACHE_TIME,
                is_personal: true,
            })
            .await?;
        return Ok(());
    }

    let search = query.query.trim().to_lowercase();
    let results = history
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            search.is_empty() || entry.display_name().to_lowercase().contains(&search)
        })
        .take(MAX_RESULTS)
        .map(|(i, entry)| {
            let mut result = InlineQueryResultCachedDocument::new(
                i.to_string(),
                entry.display_name().to_string(),
                entry.file_id.clone(),
            );
            result.description = Some(format_timestamp(entry.timestamp));
            result
        })
        .collect();

    ctx.api
        .answer_inline_query(InlineQueryAnswer {
            inline_query_id: query.id.clone(),
            results,
            button: None,
            cache_time: CACHE_TIME,
            is_personal: true,
        })
        .await?;
    Ok(())
}
