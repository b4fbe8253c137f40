// telegram module - Bot API client and wire types

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod rate_limiter;
pub mod types;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::AppResult;
pub use client::TelegramClient;
pub use types::*;

/// The Bot API surface the handlers depend on
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout: u64) -> AppResult<Vec<Update>>;

    async fn send_message(&self, message: SendMessage) -> AppResult<Message>;

    async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> AppResult<()>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> AppResult<()>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message>;

    async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message>;

    async fn answer_callback_query(&self, callback_query_id: &str) -> AppResult<()>;

    async fn answer_inline_query(&self, answer: InlineQueryAnswer) -> AppResult<()>;

    async fn get_file(&self, file_id: &str) -> AppResult<File>;

    async fn download_file(&self, file_path: &str) -> AppResult<Bytes>;

    /// getFile + download in one step
    async fn fetch_file(&self, file_id: &str) -> AppResult<Bytes> {
        let file = self.get_file(file_id).await?;
        let path = file.file_path.ok_or_else(|| crate::error::AppError::Telegram {
            code: 0,
            description: format!("No file_path for {}", file_id),
        })?;
        self.download_file(&path).await
    }
}
