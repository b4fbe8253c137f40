// Bot API client over reqwest

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::time::Duration;

use super::rate_limiter::ChatRateLimiter;
use super::types::*;
use super::TelegramApi;
use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const MAX_ATTEMPTS: usize = 3;
const EDIT_INTERVAL_MS: u64 = 400;

pub struct TelegramClient {
    http_client: Client,
    api_url: String,
    file_url: String,
    edit_limiter: ChatRateLimiter,
}

impl TelegramClient {
    pub fn new(config: &AppConfig) -> Self {
        let http_client = crate::utils::http::create_client_with_proxy(
            config.request_timeout,
            Some(config.upstream_proxy.clone()),
        );
        Self::with_client(http_client, &config.api_base_url, &config.bot_token)
    }

    pub fn with_client(http_client: Client, base_url: &str, token: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            http_client,
            api_url: format!("{}/bot{}", base, token),
            file_url: format!("{}/file/bot{}", base, token),
            edit_limiter: ChatRateLimiter::new(EDIT_INTERVAL_MS),
        }
    }

    /// Build method URL
    fn build_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }

    fn unwrap_response<T>(method: &str, response: ApiResponse<T>) -> Result<T, (AppError, Option<u64>)> {
        if response.ok {
            if let Some(result) = response.result {
                return Ok(result);
            }
        }
        let retry_after = response.parameters.and_then(|p| p.retry_after);
        let err = AppError::Telegram {
            code: response.error_code.unwrap_or(0),
            description: response
                .description
                .unwrap_or_else(|| format!("{} returned no result", method)),
        };
        Err((err, retry_after))
    }

    /// Retry while Telegram answers 429 with retry_after
    async fn execute<T, F, Fut>(&self, method: &str, send: F) -> AppResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response: ApiResponse<T> = send().await?.json().await?;
            match Self::unwrap_response(method, response) {
                Ok(result) => return Ok(result),
                Err((err, Some(retry_after))) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        "{} throttled (attempt {}/{}), retrying in {}s: {}",
                        method,
                        attempt,
                        MAX_ATTEMPTS,
                        retry_after,
                        err
                    );
                    tokio::time::sleep(Duration::from_secs(retry_after)).await;
                }
                Err((err, _)) => return Err(err),
            }
        }
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(method);
        self.execute(method, || self.http_client.post(&url).json(body).send())
            .await
    }

    async fn call_multipart<T, F>(&self, method: &str, build_form: F) -> AppResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> Form,
    {
        let url = self.build_url(method);
        self.execute(method, || {
            self.http_client.post(&url).multipart(build_form()).send()
        })
        .await
    }

    async fn send_file(
        &self,
        method: &str,
        field: &str,
        chat_id: i64,
        file: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message> {
        match file {
            InputFile::FileId(file_id) => {
                let mut body = json!({ "chat_id": chat_id, field: file_id });
                if let Some(id) = reply_to {
                    body["reply_parameters"] = serde_json::to_value(ReplyParameters::to(id))?;
                }
                self.call(method, &body).await
            }
            InputFile::Bytes { data, file_name } => {
                let reply = reply_to
                    .map(|id| serde_json::to_string(&ReplyParameters::to(id)))
                    .transpose()?;
                let data = Bytes::from(data);
                self.call_multipart(method, || {
                    let part = Part::stream(data.clone()).file_name(file_name.clone());
                    let mut form = Form::new()
                        .text("chat_id", chat_id.to_string())
                        .part(field.to_string(), part);
                    if let Some(reply) = &reply {
                        form = form.text("reply_parameters", reply.clone());
                    }
                    form
                })
                .await
            }
        }
    }
}

#[async_trait]
impl TelegramApi for TelegramClient {
    async fn get_updates(&self, offset: i64, timeout: u64) -> AppResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout,
                "allowed_updates": ["message", "callback_query", "inline_query"],
            }),
        )
        .await
    }

    async fn send_message(&self, message: SendMessage) -> AppResult<Message> {
        self.call("sendMessage", &message).await
    }

    async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> AppResult<()> {
        self.edit_limiter.wait(chat_id).await;
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({ "chat_id": chat_id, "message_id": message_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> AppResult<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message> {
        self.send_file("sendPhoto", "photo", chat_id, photo, reply_to)
            .await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message> {
        self.send_file("sendDocument", "document", chat_id, document, reply_to)
            .await
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> AppResult<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    async fn answer_inline_query(&self, answer: InlineQueryAnswer) -> AppResult<()> {
        let _: bool = self.call("answerInlineQuery", &answer).await?;
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> AppResult<File> {
        self.call("getFile", &json!({ "file_id": file_id })).await
    }

    async fn download_file(&self, file_path: &str) -> AppResult<Bytes> {
        let url = format!("{}/{}", self.file_url, file_path);
        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Telegram {
                code: response.status().as_u16() as i64,
                description: format!("File download failed for {}", file_path),
            });
        }
        Ok(response.bytes().await?)
    }
}
