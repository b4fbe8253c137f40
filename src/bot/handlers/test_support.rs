use image::RgbImage;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::bot::{BotContext, BotState};
use crate::models::AppConfig;
use crate::telegram::mock::MockTelegram;
use crate::telegram::{Chat, Document, Message, PhotoSize, Update, User};
use crate::watermark::{codec, AlphaMap, WatermarkRemover};

pub const ADMIN: i64 = 900;

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::new();
    config.bot_token = "123:test".to_string();
    config.admin_id = Some(ADMIN);
    config.max_images_per_day = 5;
    config.history_size = 3;
    config.media_group_delay_ms = 20;
    config
}

fn remover() -> WatermarkRemover {
    let alpha = |size: u32| AlphaMap::from_values(size, size, vec![0.25; (size * size) as usize]).unwrap();
    WatermarkRemover::new(PathBuf::from("/nonexistent"))
        .with_alpha_map(48, alpha(48))
        .with_alpha_map(96, alpha(96))
}

pub fn test_context_with(config: AppConfig) -> (BotContext, Arc<MockTelegram>) {
    let mock = Arc::new(MockTelegram::new());
    let state = BotState::new(config.max_images_per_day, config.history_size);
    let ctx = BotContext::new(config, mock.clone(), remover(), state);
    (ctx, mock)
}

pub fn test_context() -> (BotContext, Arc<MockTelegram>) {
    test_context_with(test_config())
}

pub fn user(id: i64) -> User {
    User {
        id,
        first_name: format!("user{}", id),
        ..Default::default()
    }
}

pub fn text_message(user_id: i64, text: &str) -> Message {
    Message {
        message_id: 1,
        chat: Chat { id: user_id },
        from: Some(user(user_id)),
        text: Some(text.to_string()),
        ..Default::default()
    }
}

pub fn photo_message(user_id: i64, message_id: i64, file_id: &str) -> Message {
    Message {
        message_id,
        chat: Chat { id: user_id },
        from: Some(user(user_id)),
        photo: Some(vec![
            PhotoSize {
                file_id: "thumb".to_string(),
                width: 90,
                height: 90,
                file_size: None,
            },
            PhotoSize {
                file_id: file_id.to_string(),
                width: 200,
                height: 200,
                file_size: None,
            },
        ]),
        ..Default::default()
    }
}

pub fn document_message(user_id: i64, file_id: &str, name: &str, mime: &str) -> Message {
    Message {
        message_id: 5,
        chat: Chat { id: user_id },
        from: Some(user(user_id)),
        document: Some(Document {
            file_id: file_id.to_string(),
            file_name: Some(name.to_string()),
            mime_type: Some(mime.to_string()),
            file_size: None,
        }),
        ..Default::default()
    }
}

pub fn message_update(message: Message) -> Update {
    Update {
        update_id: 1,
        message: Some(message),
        callback_query: None,
        inline_query: None,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, image::Rgb([120, 130, 140]));
    codec::encode_png(&image).unwrap()
}

pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}
