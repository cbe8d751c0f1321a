use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use urpaq_core::config::RagSettings;
use urpaq_core::error::{Error, Result};
use urpaq_core::traits::ChatModel;
use urpaq_core::types::{ProcessedQuery, ScoredDocument, ValidationIssue};
use urpaq_hybrid::SearchStrategy;

use crate::cache::CacheService;
use crate::context::ContextBuilder;
use crate::metrics::RagMetrics;
use crate::query::QueryProcessor;
use crate::validator::ResponseValidator;

/// Context used when the search returns nothing.
pub const NO_DOCUMENTS_CONTEXT: &str = "Информация не найдена";
const FALLBACK_CONTEXT_CHARS: usize = 500;
const GENERATION_FAILED_TEXT: &str = "Извините, произошла ошибка при генерации ответа. Попробуйте еще раз.";
const NO_SOURCES_TEXT: &str = "Источники не найдены";
const SUMMARY_SOURCES: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagResponse {
    pub answer: String,
    pub processed_query: ProcessedQuery,
    pub source_documents: Vec<ScoredDocument>,
    pub is_valid: bool,
    pub validation_issue: ValidationIssue,
}

impl RagResponse {
    pub fn sources_summary(&self) -> String {
        if self.source_documents.is_empty() {
            return NO_SOURCES_TEXT.to_string();
        }
        self.source_documents
            .iter()
            .take(SUMMARY_SOURCES)
            .map(|doc| format!("• {}", doc.name()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn source_count(&self) -> usize {
        self.source_documents.len()
    }
}

/// Question in, validated answer out: classify, search, build the prompt,
/// generate, validate. Retries and the overall deadline wrap the whole run.
pub struct RagOrchestrator {
    search: Arc<SearchStrategy>,
    model: Arc<dyn ChatModel>,
    cache: Arc<CacheService>,
    metrics: Arc<RagMetrics>,
    settings: RagSettings,
    llm_timeout: Duration,
    processor: QueryProcessor,
    context_builder: ContextBuilder,
    validator: ResponseValidator,
}

impl RagOrchestrator {
    pub fn new(
        search: Arc<SearchStrategy>,
        model: Arc<dyn ChatModel>,
        cache: Arc<CacheService>,
        metrics: Arc<RagMetrics>,
        settings: RagSettings,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            search,
            model,
            cache,
            metrics,
            settings,
            llm_timeout,
            processor: QueryProcessor,
            context_builder: ContextBuilder,
            validator: ResponseValidator,
        }
    }

    /// Never fails: errors become an apology response and a metrics entry.
    pub async fn process_query(&self, question: &str) -> RagResponse {
        let started = Instant::now();
        info!("Processing RAG query: {}", question);

        if self.settings.cache_responses {
            if let Some(cached) = self.cache.cached_response(question) {
                debug!("Response cache HIT for: {}", question);
                self.metrics.record_success(elapsed_ms(started));
                return cached;
            }
        }

        let deadline = Duration::from_secs(self.settings.timeout_secs);
        let outcome = match tokio::time::timeout(deadline, self.run_with_retries(question)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(deadline)),
        };

        match outcome {
            Ok(response) => {
                let ms = elapsed_ms(started);
                self.metrics.record_success(ms);
                info!("RAG query processed in {}ms", ms);
                if self.settings.cache_responses && response.is_valid {
                    self.cache.store_response(question, response.clone());
                }
                response
            }
            Err(e) => {
                error!("Error processing RAG query: {}", e);
                self.metrics.record_failure(e.kind());
                error_response(&e)
            }
        }
    }

    async fn run_with_retries(&self, question: &str) -> Result<RagResponse> {
        let mut attempt: u32 = 0;
        loop {
            match self.run_pipeline(question).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() || attempt >= self.settings.max_retries => return Err(e),
                Err(e) => {
                    let backoff = self.backoff(attempt);
                    attempt += 1;
                    warn!("Attempt {} failed: {}. Retrying in {:?}", attempt, e, backoff);
                    self.metrics.record_retry();
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.settings.retry_backoff_ms.saturating_mul(factor))
    }

    async fn run_pipeline(&self, question: &str) -> Result<RagResponse> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".into()));
        }

        info!("Step 1: Processing query");
        let processor = self.processor;
        let processed = self
            .cache
            .get_or_compute_query(question, || async move { Ok(processor.process(question)) })
            .await?;

        info!("Step 2: Searching documents");
        let documents = self.search_documents(&processed).await?;
        info!("Found {} relevant documents", documents.len());

        info!("Step 3: Building context");
        let context = if documents.is_empty() {
            warn!("No documents found for query: {}", question);
            NO_DOCUMENTS_CONTEXT.to_string()
        } else {
            self.context_builder.build_context(&documents)
        };

        info!("Step 4: Generating response");
        let prompt = self.context_builder.build_prompt(&context, question, &processed);
        let raw = self.generate(&prompt, &context).await;

        info!("Step 5: Validating response");
        let validation = self.validator.validate(&raw);
        if !validation.is_valid {
            self.metrics.record_validation_failure(validation.issue);
        }

        Ok(RagResponse {
            answer: validation.processed_response,
            processed_query: processed,
            source_documents: documents,
            is_valid: validation.is_valid,
            validation_issue: validation.issue,
        })
    }

    async fn search_documents(&self, processed: &ProcessedQuery) -> Result<Vec<ScoredDocument>> {
        let search = Arc::clone(&self.search);
        let query = processed.clone();
        let top_k = self.settings.top_k;
        self.cache
            .get_or_compute_search(processed.search_query(), || async move {
                tokio::task::spawn_blocking(move || search.hybrid_search(&query, top_k))
                    .await
                    .map_err(|e| Error::Operation(format!("search task failed: {e}")))
            })
            .await
    }

    async fn generate(&self, prompt: &str, context: &str) -> String {
        let result = match tokio::time::timeout(self.llm_timeout, self.model.chat(prompt)).await {
            Ok(reply) => reply,
            Err(_) => Err(Error::Timeout(self.llm_timeout)),
        };
        match result {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error generating response: {}", e);
                fallback_answer(context)
            }
        }
    }
}

/// What the user gets when the model call fails: the head of the context,
/// or a plain apology when there is none.
pub fn fallback_answer(context: &str) -> String {
    if context.trim().is_empty() {
        return GENERATION_FAILED_TEXT.to_string();
    }
    let head: String = context.chars().take(FALLBACK_CONTEXT_CHARS).collect();
    format!(
        "На основе найденной информации:\n\n{}\n\n(Полный ответ не был сгенерирован из-за технической ошибки)",
        head
    )
}

fn error_response(error: &Error) -> RagResponse {
    let hint = match error {
        Error::Timeout(_) => "Превышено время ожидания. Попробуйте упростить запрос.",
        _ => "Пожалуйста, попробуйте еще раз позже.",
    };
    RagResponse {
        answer: format!("Извините, произошла ошибка при обработке вашего запроса. {}", hint),
        processed_query: ProcessedQuery::general(""),
        source_documents: Vec::new(),
        is_valid: false,
        validation_issue: ValidationIssue::EmptyResponse,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
