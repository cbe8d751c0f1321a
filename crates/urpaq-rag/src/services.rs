use std::path::Path;
use std::sync::Arc;

use chrono::{Local, Utc};
use tracing::{debug, error, info};

use urpaq_core::error::{Error, Result};
use urpaq_core::traits::{ChatModel, ObjectStore};
use urpaq_core::types::{ChatMessage, ChatResponse, EType};
use urpaq_storage::upload_key;

use crate::orchestrator::{RagOrchestrator, RagResponse};

const SUMMARY_PROMPT: &str = "Ты инструмент который сокращает сообщения по форме : \
     [Название]: <|РАСПИСАНИЕ|КАБИНЕТЫ|УЧИТЕЛЯ|НАПРАВЛЕНИЯ>\n\
     [Ключевые слова]: <ключевые слова>\n\
     [Краткое описание]: <6 предложения>\n\
     Вот текст который надо сократить:";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Model-facing operations: grounded answers, raw completions and summaries.
#[derive(Clone)]
pub struct AiService {
    orchestrator: Arc<RagOrchestrator>,
    model: Arc<dyn ChatModel>,
}

impl AiService {
    pub fn new(orchestrator: Arc<RagOrchestrator>, model: Arc<dyn ChatModel>) -> Self {
        Self { orchestrator, model }
    }

    pub async fn respond(&self, question: &str) -> String {
        info!("Processing RAG request: {}", question);
        self.ask(question).await.answer
    }

    pub async fn ask(&self, question: &str) -> RagResponse {
        self.orchestrator.process_query(question).await
    }

    /// The prompt goes to the model as is, without retrieval.
    pub async fn simple_response(&self, prompt: &str) -> Result<String> {
        debug!("Generating simple response");
        self.model
            .chat(prompt)
            .await
            .inspect_err(|e| error!("Error generating simple response: {}", e))
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to summarize is empty".into()));
        }
        self.model.chat(&format!("{SUMMARY_PROMPT}{text}")).await
    }
}

#[derive(Clone)]
pub struct ChatService {
    ai: AiService,
}

impl ChatService {
    pub fn new(ai: AiService) -> Self {
        Self { ai }
    }

    pub async fn process_message(&self, text: &str) -> Result<ChatMessage> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }
        info!("Processing message from user: {}", text);

        let asked_at = Local::now().naive_local();
        let answer = self.ai.respond(text).await;
        let message = ChatMessage {
            entity: EType::User,
            message: text.to_string(),
            timestamp: asked_at,
            response: ChatResponse { entity: EType::AiHelper, message: answer, timestamp: Local::now().naive_local() },
        };
        debug!("Response created: {:?}", message);
        Ok(message)
    }
}

/// Stores uploaded files in object storage for the next load.
#[derive(Clone)]
pub struct UploadService {
    objects: Arc<dyn ObjectStore>,
}

impl UploadService {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Returns the object key. Only the final path component of
    /// `file_name` is kept.
    pub async fn upload_txt(&self, file_name: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<String> {
        let base = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::InvalidInput(format!("invalid file name: {file_name:?}")))?;

        let key = upload_key("txt", base, Utc::now());
        let content_type = content_type.filter(|ct| !ct.trim().is_empty()).unwrap_or(DEFAULT_CONTENT_TYPE);
        info!("Uploading {} ({} bytes) as {}", base, bytes.len(), key);
        self.objects.put_object(&key, bytes, content_type).await?;
        Ok(key)
    }
}
