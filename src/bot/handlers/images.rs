use std::time::Duration;
use tracing::{error, info, warn};

use super::locale_of;
use crate::bot::BotContext;
use crate::error::{AppError, AppResult};
use crate::models::HistoryEntry;
use crate::modules::i18n::{self, t};
use crate::telegram::{InputFile, Message, SendMessage};
use crate::watermark::codec::{self, PREVIEW_JPEG_QUALITY};

const CLEANED_FILENAME: &str = "cleaned.png";
const DEFAULT_ORIGINAL_NAME: &str = "photo.jpg";

/// File to download for a message, or None for a non-image document
fn image_file_id(msg: &Message) -> Option<&str> {
    match &msg.document {
        Some(doc) if doc.is_image() => Some(doc.file_id.as_str()),
        Some(_) => None,
        None => msg.largest_photo().map(|p| p.file_id.as_str()),
    }
}

fn original_name(msg: &Message) -> String {
    msg.document
        .as_ref()
        .and_then(|d| d.file_name.clone())
        .unwrap_or_else(|| DEFAULT_ORIGINAL_NAME.to_string())
}

/// Download, clean, then reply with a JPEG preview and the full-resolution PNG
pub async fn process_and_reply(
    ctx: &BotContext,
    msg: &Message,
    file_id: &str,
) -> AppResult<HistoryEntry> {
    let raw = ctx.api.fetch_file(file_id).await?;

    let remover = ctx.remover.clone();
    let (preview, full) = tokio::task::spawn_blocking(move || -> AppResult<_> {
        let cleaned = remover.clean_bytes(&raw)?;
        let preview = codec::encode_jpeg(&cleaned, PREVIEW_JPEG_QUALITY)?;
        let full = codec::encode_png(&cleaned)?;
        Ok((preview, full))
    })
    .await??;

    ctx.api
        .send_photo(
            msg.chat_id(),
            InputFile::bytes(preview, "preview.jpg"),
            Some(msg.message_id),
        )
        .await?;
    let doc_msg = ctx
        .api
        .send_document(
            msg.chat_id(),
            InputFile::bytes(full, CLEANED_FILENAME),
            Some(msg.message_id),
        )
        .await?;

    let stored_id = doc_msg
        .document
        .map(|d| d.file_id)
        .ok_or_else(|| AppError::Telegram {
            code: 0,
            description: "sendDocument returned no document".to_string(),
        })?;

    Ok(HistoryEntry {
        file_id: stored_id,
        filename: CLEANED_FILENAME.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        original_name: original_name(msg),
    })
}

/// Entry point for photos and documents: albums are buffered, everything else handled directly
pub async fn handle_image(ctx: &BotContext, msg: Message) -> AppResult<()> {
    let Some(group_id) = msg.media_group_id.clone() else {
        return handle_single(ctx, &msg).await;
    };

    if ctx.media_groups.push(&group_id, msg) {
        let delay = Duration::from_millis(ctx.config.media_group_delay_ms);
        let flush_ctx = ctx.clone();
        ctx.tasks.spawn(async move {
            let ctx = flush_ctx;
            tokio::time::sleep(delay).await;
            if let Err(e) = flush_media_group(&ctx, &group_id).await {
                error!("Failed to flush media group {}: {}", group_id, e);
            }
        });
    }
    Ok(())
}

pub async fn handle_single(ctx: &BotContext, msg: &Message) -> AppResult<()> {
    let locale = locale_of(msg);
    let Some(user_id) = msg.user_id() else {
        return Ok(());
    };
    let chat_id = msg.chat_id();

    let (allowed, _remaining) = ctx.state.check_rate_limit(user_id, 1);
    if !allowed {
        let limit = ctx.state.max_images_per_day().to_string();
        ctx.api
            .send_message(SendMessage::new(
                chat_id,
                t(i18n::RATE_LIMIT_REACHED, locale, &[("limit", &limit)]),
            ))
            .await?;
        return Ok(());
    }

    let status = ctx
        .api
        .send_message(SendMessage::new(chat_id, t(i18n::PROCESSING, locale, &[])))
        .await?;

    let Some(file_id) = image_file_id(msg) else {
        ctx.api
            .edit_message_text(chat_id, status.message_id, &t(i18n::NOT_AN_IMAGE, locale, &[]))
            .await?;
        return Ok(());
    };

    match process_and_reply(ctx, msg, file_id).await {
        Ok(entry) => {
            if let Err(e) = ctx.api.delete_message(chat_id, status.message_id).await {
                warn!("Failed to delete status message: {}", e);
            }
            ctx.state.increment_rate(user_id, 1);
            ctx.state.record_usage(user_id, 1).await;
            ctx.state.add_to_history(user_id, entry);
            ctx.persist().await;
            info!("Cleaned image for user {}", user_id);
        }
        Err(e) => {
            error!("Failed to process image: {}", e);
            ctx.api
                .edit_message_text(chat_id, status.message_id, &t(i18n::ERROR, locale, &[]))
                .await?;
        }
    }
    Ok(())
}

/// Process a collected album as one batch
pub async fn flush_media_group(ctx: &BotContext, group_id: &str) -> AppResult<()> {
    let messages = ctx.media_groups.take(group_id);
    let Some(first) = messages.first() else {
        return Ok(());
    };
    let Some(user_id) = first.user_id() else {
        return Ok(());
    };
    let locale = locale_of(first);
    let chat_id = first.chat_id();
    let total = messages.len();

    let (allowed, _remaining) = ctx.state.check_rate_limit(user_id, total as u32);
    if !allowed {
        let limit = ctx.state.max_images_per_day().to_string();
        ctx.api
            .send_message(SendMessage::new(
                chat_id,
                t(i18n::RATE_LIMIT_REACHED, locale, &[("limit", &limit)]),
            ))
            .await?;
        return Ok(());
    }

    let count = total.to_string();
    let status = ctx
        .api
        .send_message(SendMessage::new(
            chat_id,
            t(i18n::PROCESSING_BATCH, locale, &[("count", &count)]),
        ))
        .await?;

    let mut success = 0u32;
    for (i, msg) in messages.iter().enumerate() {
        if total > 1 {
            let current = (i + 1).to_string();
            if let Err(e) = ctx
                .api
                .edit_message_text(
                    chat_id,
                    status.message_id,
                    &t(i18n::PROGRESS, locale, &[("current", &current), ("total", &count)]),
                )
                .await
            {
                warn!("Failed to update progress: {}", e);
            }
        }

        let Some(file_id) = image_file_id(msg) else {
            continue;
        };
        match process_and_reply(ctx, msg, file_id).await {
            Ok(entry) => {
                success += 1;
                ctx.state.add_to_history(user_id, entry);
            }
            Err(e) => error!("Failed to process image in group {}: {}", group_id, e),
        }
    }

    ctx.state.increment_rate(user_id, success);
    if success > 0 {
        ctx.state.record_usage(user_id, success as u64).await;
    }
    ctx.persist().await;
    info!(
        "Media group {} done: {}/{} images for user {}",
        group_id, success, total, user_id
    );

    if success as usize == total {
        ctx.api.delete_message(chat_id, status.message_id).await?;
    } else {
        ctx.api
            .edit_message_text(
                chat_id,
                status.message_id,
                &t(
                    i18n::DONE_BATCH,
                    locale,
                    &[("success", &success.to_string()), ("total", &count)],
                ),
            )
            .await?;
    }
    Ok(())
}
