use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use super::types::*;
use super::TelegramApi;
use crate::error::{AppError, AppResult};

/// Outgoing request recorded by MockTelegram
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendMessage(SendMessage),
    EditMessageText {
        chat_id: i64,
        message_id: i64,
        text: String,
    },
    DeleteMessage {
        chat_id: i64,
        message_id: i64,
    },
    SendPhoto {
        chat_id: i64,
        photo: InputFile,
        reply_to: Option<i64>,
    },
    SendDocument {
        chat_id: i64,
        document: InputFile,
        reply_to: Option<i64>,
    },
    AnswerCallbackQuery(String),
    AnswerInlineQuery(InlineQueryAnswer),
}

/// Records every request and serves registered files
pub struct MockTelegram {
    calls: Mutex<Vec<Call>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    updates: Mutex<VecDeque<Vec<Update>>>,
    offsets: Mutex<Vec<i64>>,
    next_message_id: AtomicI64,
}

impl MockTelegram {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            files: Mutex::new(HashMap::new()),
            updates: Mutex::new(VecDeque::new()),
            offsets: Mutex::new(Vec::new()),
            next_message_id: AtomicI64::new(1000),
        }
    }

    pub fn add_file(&self, file_id: impl Into<String>, data: Vec<u8>) {
        self.files.lock().unwrap().insert(file_id.into(), data);
    }

    pub fn push_updates(&self, updates: Vec<Update>) {
        self.updates.lock().unwrap().push_back(updates);
    }

    /// Offsets passed to getUpdates, in order
    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of sendMessage and editMessageText calls, in order
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendMessage(m) => Some(m.text),
                Call::EditMessageText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn sent_documents(&self) -> Vec<InputFile> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendDocument { document, .. } => Some(document),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn message(&self, chat_id: i64) -> Message {
        Message {
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            chat: Chat { id: chat_id },
            ..Default::default()
        }
    }
}

impl Default for MockTelegram {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelegramApi for MockTelegram {
    async fn get_updates(&self, offset: i64, _timeout: u64) -> AppResult<Vec<Update>> {
        self.offsets.lock().unwrap().push(offset);
        let batch = self.updates.lock().unwrap().pop_front();
        match batch {
            Some(updates) => Ok(updates),
            None => {
                // Stand-in for the long poll so an idle loop doesn't spin
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(&self, message: SendMessage) -> AppResult<Message> {
        let reply = self.message(message.chat_id);
        self.record(Call::SendMessage(message));
        Ok(reply)
    }

    async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> AppResult<()> {
        self.record(Call::EditMessageText {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> AppResult<()> {
        self.record(Call::DeleteMessage {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message> {
        self.record(Call::SendPhoto {
            chat_id,
            photo,
            reply_to,
        });
        Ok(self.message(chat_id))
    }

    async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        reply_to: Option<i64>,
    ) -> AppResult<Message> {
        let mut reply = self.message(chat_id);
        let file_id = match &document {
            InputFile::FileId(id) => id.clone(),
            InputFile::Bytes { .. } => format!("doc-{}", reply.message_id),
        };
        reply.document = Some(Document {
            file_id,
            ..Default::default()
        });
        self.record(Call::SendDocument {
            chat_id,
            document,
            reply_to,
        });
        Ok(reply)
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> AppResult<()> {
        self.record(Call::AnswerCallbackQuery(callback_query_id.to_string()));
        Ok(())
    }

    async fn answer_inline_query(&self, answer: InlineQueryAnswer) -> AppResult<()> {
        self.record(Call::AnswerInlineQuery(answer));
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> AppResult<File> {
        Ok(File {
            file_id: file_id.to_string(),
            file_path: Some(format!("files/{}", file_id)),
            file_size: None,
        })
    }

    async fn download_file(&self, file_path: &str) -> AppResult<Bytes> {
        let file_id = file_path.trim_start_matches("files/");
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .map(Bytes::from)
            .ok_or_else(|| AppError::Telegram {
                code: 404,
                description: format!("Not Found: {}", file_path),
            })
    }
}
