use bytes::Bytes;
use std::io::{Cursor, Read, Write};
use tracing::{error, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::locale_of;
use crate::bot::BotContext;
use crate::error::{AppError, AppResult};
use crate::models::HistoryEntry;
use crate::modules::i18n::{self, t};
use crate::telegram::{InputFile, Message, SendMessage};
use crate::watermark::codec::{self, OutputFormat};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"];
const DEFAULT_ARCHIVE_NAME: &str = "archive.zip";

/// Names of image entries, in archive order
pub fn list_image_entries(archive: &mut ZipArchive<Cursor<Bytes>>) -> AppResult<Vec<String>> {
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let is_image = codec::extension(file.name())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if is_image {
            names.push(file.name().to_string());
        }
    }
    Ok(names)
}

/// Inflate one entry, refusing anything larger than `limit` bytes
fn read_entry(archive: &mut ZipArchive<Cursor<Bytes>>, name: &str, limit: u64) -> AppResult<Vec<u8>> {
    let too_large = || AppError::EntryTooLarge {
        name: name.to_string(),
        limit,
    };
    let file = archive.by_name(name)?;
    if file.size() > limit {
        return Err(too_large());
    }
    // Headers can lie about the size, so cap the read as well
    let mut data = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut data)?;
    if data.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(data)
}

async fn clean_entry(ctx: &BotContext, name: &str, data: Vec<u8>) -> AppResult<Vec<u8>> {
    let remover = ctx.remover.clone();
    let format = OutputFormat::for_file_name(name);
    tokio::task::spawn_blocking(move || -> AppResult<Vec<u8>> {
        let cleaned = remover.clean_bytes(&data)?;
        codec::encode(&cleaned, format)
    })
    .await?
}

/// Accept a ZIP of images and send back a ZIP of cleaned images
pub async fn handle_zip(ctx: &BotContext, msg: &Message) -> AppResult<()> {
    let locale = locale_of(msg);
    let (Some(user_id), Some(doc)) = (msg.user_id(), msg.document.as_ref()) else {
        return Ok(());
    };
    let chat_id = msg.chat_id();

    let raw = ctx.api.fetch_file(&doc.file_id).await?;

    let parsed = ZipArchive::new(Cursor::new(raw))
        .map_err(AppError::from)
        .and_then(|mut archive| {
            let names = list_image_entries(&mut archive)?;
            Ok((archive, names))
        });
    let (mut archive, names) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Rejected archive from user {}: {}", user_id, e);
            ctx.api
                .send_message(SendMessage::new(chat_id, t(i18n::NOT_A_ZIP, locale, &[])))
                .await?;
            return Ok(());
        }
    };

    if names.is_empty() {
        ctx.api
            .send_message(SendMessage::new(
                chat_id,
                t(i18n::ZIP_NO_IMAGES, locale, &[]),
            ))
            .await?;
        return Ok(());
    }

    let total = names.len();
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
            t(i18n::PROCESSING_ZIP, locale, &[("count", &count)]),
        ))
        .await?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut success = 0u32;

    for (i, name) in names.iter().enumerate() {
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

        let cleaned = match read_entry(&mut archive, name, ctx.config.max_zip_entry_bytes) {
            Ok(data) => clean_entry(ctx, name, data).await,
            Err(e) => Err(e),
        };
        let written = cleaned.and_then(|data| {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(&data)?;
            Ok(())
        });
        match written {
            Ok(()) => success += 1,
            Err(e) => error!("Failed to process {} from ZIP: {}", name, e),
        }
    }

    let output = writer.finish()?.into_inner();

    ctx.state.increment_rate(user_id, success);
    if success > 0 {
        ctx.state.record_usage(user_id, success as u64).await;
    }

    let original_name = doc
        .file_name
        .clone()
        .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string());
    let result_name = format!("cleaned_{}", original_name);

    let doc_msg = ctx
        .api
        .send_document(
            chat_id,
            InputFile::bytes(output, result_name.clone()),
            Some(msg.message_id),
        )
        .await?;

    if let Some(stored) = doc_msg.document {
        ctx.state.add_to_history(
            user_id,
            HistoryEntry {
                file_id: stored.file_id,
                filename: result_name,
                timestamp: chrono::Utc::now().timestamp(),
                original_name,
            },
        );
    }
    ctx.persist().await;
    info!(
        "Archive done: {}/{} images for user {}",
        success, total, user_id
    );

    if success as usize == total {
        ctx.api.delete_message(chat_id, status.message_id).await?;
    } else {
        ctx.api
            .edit_message_text(
                chat_id,
                status.message_id,
                &t(
                    i18n::ZIP_DONE,
                    locale,
                    &[("success", &success.to_string()), ("total", &count)],
                ),
            )
            .await?;
    }
    Ok(())
}
