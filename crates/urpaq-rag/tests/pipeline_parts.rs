use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use urpaq_core::error::Error;
use urpaq_core::types::{ProcessedQuery, QueryCategory, RetrievalDocument, ScoredDocument, ValidationIssue};
use urpaq_rag::cache::{CacheService, CacheSettings};
use urpaq_rag::context::{ContextBuilder, NOTHING_FOUND};
use urpaq_rag::metrics::RagMetrics;
use urpaq_rag::query::{determine_category, extract_keywords, QueryProcessor};
use urpaq_rag::validator::{post_process, ResponseValidator, EMPTY_RESPONSE_TEXT, INSUFFICIENT_KNOWLEDGE_TEXT};

fn scored(id: &str, name: &str, text: &str, score: f64) -> ScoredDocument {
    ScoredDocument::new(RetrievalDocument::new(id, name, text), score)
}

// --- query classification ---

#[test]
fn categories_follow_stem_groups_in_order() {
    assert_eq!(determine_category("какое расписание звонков?"), QueryCategory::Schedule);
    assert_eq!(determine_category("где кабинет химии"), QueryCategory::Rooms);
    assert_eq!(determine_category("кто преподаватель робототехники"), QueryCategory::Teachers);
    assert_eq!(determine_category("какие есть кружки и секции"), QueryCategory::Directions);
    assert_eq!(determine_category("номер телефона приемной"), QueryCategory::Contacts);
    assert_eq!(determine_category("расскажи о дворце"), QueryCategory::General);
    // schedule wins over teachers
    assert_eq!(determine_category("расписание учителей"), QueryCategory::Schedule);
}

#[test]
fn keywords_come_from_marker_or_whole_query() {
    let summary = "[название]: кабинеты\n[ключевые слова]: химия, биология \n[краткое описание]: текст";
    assert_eq!(extract_keywords(summary), "химия, биология");
    assert_eq!(extract_keywords("где кабинет химии"), "где кабинет химии");
}

#[test]
fn processor_lowercases_and_handles_blank() {
    let processed = QueryProcessor.process("Где КАБИНЕТ химии?");
    assert_eq!(processed.original_query, "Где КАБИНЕТ химии?");
    assert_eq!(processed.metadata, "где кабинет химии?");
    assert_eq!(processed.category, QueryCategory::Rooms);
    assert_eq!(processed.keywords, "где кабинет химии?");

    let blank = QueryProcessor.process("   ");
    assert_eq!(blank.category, QueryCategory::General);
    assert!(blank.keywords.is_empty());
    assert!(blank.metadata.is_empty());
}

#[test]
fn marker_is_found_regardless_of_case() {
    let processed = QueryProcessor.process("[Ключевые слова]: Гидропоника");
    assert_eq!(processed.keywords, "гидропоника");
    assert_eq!(processed.search_query(), "гидропоника");
}

// --- context and prompt ---

#[test]
fn empty_context_says_nothing_found() {
    assert_eq!(ContextBuilder.build_context(&[]), NOTHING_FOUND);
}

#[test]
fn context_numbers_documents_with_scores() {
    let docs = vec![scored("a", "Контакты", "Телефон 34-02-40", 1.5), scored("b", "Статистика", "100 кружков", 0.25)];
    let context = ContextBuilder.build_context(&docs);

    assert!(context.starts_with("=== НАЙДЕННАЯ ИНФОРМАЦИЯ ===\n\n"));
    assert!(context.contains("Документ 1: Контакты\nРелевантность: 1.50\n\nТелефон 34-02-40\n---\n"));
    assert!(context.contains("Документ 2: Статистика\nРелевантность: 0.25\n\n100 кружков\n---\n"));
    assert!(context.ends_with("\n=== КОНЕЦ ИНФОРМАЦИИ ===\n"));
}

#[test]
fn oversized_first_document_is_kept_and_the_rest_dropped() {
    let docs = vec![scored("big", "Большой", &"а".repeat(4500), 2.0), scored("small", "Малый", "текст", 1.0)];
    let context = ContextBuilder.build_context(&docs);
    assert!(context.contains("Документ 1: Большой"));
    assert!(!context.contains("Документ 2"));
}

#[test]
fn prompt_carries_question_context_and_category_hint() {
    let processed = QueryProcessor.process("телефон приемной");
    let prompt = ContextBuilder.build_prompt("КОНТЕКСТ", "телефон приемной", &processed);
    assert!(prompt.starts_with("Ты - AI помощник Дворца школьников \"Digital Urpaq\"."));
    assert!(prompt.contains("КАТЕГОРИЯ: Контакты"));
    assert!(prompt.contains("\nКОНТЕКСТ\n"));
    assert!(prompt.contains("ВОПРОС ПОЛЬЗОВАТЕЛЯ:\nтелефон приемной\n"));
    assert!(prompt.ends_with("ОТВЕТ:\n"));
}

// --- validation ---

#[test]
fn blank_and_short_answers_are_rejected() {
    let empty = ResponseValidator.validate("  \n ");
    assert!(!empty.is_valid);
    assert_eq!(empty.issue, ValidationIssue::EmptyResponse);
    assert_eq!(empty.processed_response, EMPTY_RESPONSE_TEXT);

    let short = ResponseValidator.validate("Да, есть.");
    assert!(!short.is_valid);
    assert_eq!(short.issue, ValidationIssue::TooShort);
}

#[test]
fn long_answer_is_cut_at_last_sentence() {
    let long = format!("{}.{}", "а".repeat(4900), "б".repeat(200));
    let result = ResponseValidator.validate(&long);
    assert!(result.is_valid);
    assert_eq!(result.issue, ValidationIssue::Truncated);
    let expected = format!("{}.\n\n[Ответ сокращен для удобства чтения]", "а".repeat(4900));
    assert_eq!(result.processed_response, expected);
}

#[test]
fn long_answer_without_late_period_keeps_five_thousand_chars() {
    let long = format!("{}.{}", "а".repeat(100), "б".repeat(5000));
    let result = ResponseValidator.validate(&long);
    assert_eq!(result.issue, ValidationIssue::Truncated);
    let body = result.processed_response.strip_suffix("\n\n[Ответ сокращен для удобства чтения]").unwrap();
    assert_eq!(body.chars().count(), 5000);
}

#[test]
fn hallucination_phrases_are_flagged_case_insensitively() {
    let result = ResponseValidator.validate("К сожалению, Я НЕ ЗНАЮ ответа на этот вопрос.");
    assert!(!result.is_valid);
    assert_eq!(result.issue, ValidationIssue::Hallucination);
    assert_eq!(result.processed_response, INSUFFICIENT_KNOWLEDGE_TEXT);
}

#[test]
fn valid_answer_is_tidied() {
    let raw = "  Ответ:\n\n\n\n- первый\n* второй\n1) один\n2: два  [INST]x<|eot_id|>  ";
    let result = ResponseValidator.validate(raw);
    assert!(result.is_valid);
    assert_eq!(result.issue, ValidationIssue::None);
    assert_eq!(result.processed_response, "Ответ:\n\n• первый\n• второй\n1. один\n2. два x");
}

#[test]
fn post_process_keeps_single_newlines() {
    assert_eq!(post_process("строка\nещё\tстрока"), "строка\nещё строка");
}

// --- caches ---

#[tokio::test]
async fn query_cache_keys_ignore_case_and_padding() {
    let cache = CacheService::default();
    let calls = AtomicUsize::new(0);
    for question in ["Где кабинет?", "  где КАБИНЕТ? "] {
        let processed = cache
            .get_or_compute_query(question, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(ProcessedQuery::general("где кабинет?"))
            })
            .await
            .unwrap();
        assert_eq!(processed.original_query, "где кабинет?");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats().query_cache_size, 1);
}

#[tokio::test]
async fn failed_computations_are_not_cached() {
    let cache = CacheService::default();
    let failed = cache.get_or_compute_search("q", || async { Err(Error::Index("down".into())) }).await;
    assert!(failed.is_err());
    assert_eq!(cache.stats().search_cache_size, 0);

    let docs = cache.get_or_compute_search("q", || async { Ok(vec![scored("a", "A", "t", 1.0)]) }).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(cache.stats().search_cache_valid, 1);
}

#[tokio::test]
async fn expired_entries_are_recomputed() {
    let cache = CacheService::new(CacheSettings { query_ttl: Duration::ZERO, ..CacheSettings::default() });
    let calls = AtomicUsize::new(0);
    for _ in 0..2 {
        cache
            .get_or_compute_query("вопрос", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(ProcessedQuery::general("вопрос"))
            })
            .await
            .unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let stats = cache.stats();
    assert_eq!(stats.query_cache_size, 1);
    assert_eq!(stats.query_cache_valid, 0);
}

#[tokio::test]
async fn full_cache_evicts_before_insert() {
    let cache = CacheService::new(CacheSettings { max_entries: 4, ..CacheSettings::default() });
    for i in 0..5 {
        cache.get_or_compute_search(&format!("q{i}"), || async { Ok(Vec::new()) }).await.unwrap();
    }
    assert_eq!(cache.stats().search_cache_size, 4);
}

#[tokio::test]
async fn invalidation_clears_the_right_caches() {
    let cache = CacheService::default();
    cache.get_or_compute_search("s", || async { Ok(Vec::new()) }).await.unwrap();
    cache.get_or_compute_query("q", || async { Ok(ProcessedQuery::general("q")) }).await.unwrap();

    cache.invalidate_search_cache();
    let stats = cache.stats();
    assert_eq!((stats.search_cache_size, stats.query_cache_size), (0, 1));

    cache.invalidate_all();
    assert_eq!(cache.stats().query_cache_size, 0);
    assert_eq!(cache.stats().to_string(), "Cache Stats: Search[0/0] Query[0/0] Response[0/0]");
}

// --- metrics ---

#[test]
fn snapshot_summarises_counters() {
    let metrics = RagMetrics::new();
    metrics.record_success(100);
    metrics.record_success(300);
    metrics.record_failure("Timeout");
    metrics.record_retry();
    metrics.record_validation_failure(ValidationIssue::TooShort);

    let snap = metrics.snapshot();
    assert_eq!(snap.total_requests, 3);
    assert_eq!(snap.successful_requests, 2);
    assert_eq!(snap.failed_requests, 1);
    assert_eq!(snap.total_retries, 1);
    assert!((snap.success_rate - 200.0 / 3.0).abs() < 1e-9);
    assert!((snap.avg_response_time_ms - 200.0).abs() < 1e-9);
    assert_eq!(snap.error_types.get("Timeout"), Some(&1));
    assert_eq!(snap.validation_issues.get("TOO_SHORT"), Some(&1));
    assert_eq!(snap.recent_requests.len(), 3);
    assert_eq!(snap.recent_requests[2].error_type.as_deref(), Some("Timeout"));

    let text = snap.to_string();
    assert!(text.starts_with("=== RAG Metrics ===\n"));
    assert!(text.contains("Successful: 2 (66.7%)"));
    assert!(text.contains("Avg Response Time: 200ms"));
    assert!(text.contains("  TOO_SHORT: 1"));
}

#[test]
fn recent_requests_are_bounded_and_reset_clears() {
    let metrics = RagMetrics::new();
    for i in 0..150 {
        metrics.record_success(i);
    }
    let snap = metrics.snapshot();
    assert_eq!(snap.recent_requests.len(), 100);
    assert_eq!(snap.recent_requests[0].response_time_ms, 50);

    metrics.reset();
    let snap = metrics.snapshot();
    assert_eq!(snap.total_requests, 0);
    assert_eq!(snap.success_rate, 0.0);
    assert!(snap.recent_requests.is_empty());
    assert!(snap.to_string().contains("Validation Issues:\n  None\n"));
}

#[test]
fn snapshot_serializes_camel_case() {
    let metrics = RagMetrics::new();
    metrics.record_success(10);
    let json = serde_json::to_value(metrics.snapshot()).unwrap();
    assert_eq!(json["totalRequests"], 1);
    assert_eq!(json["avgResponseTimeMs"], 10.0);
    assert_eq!(json["recentRequests"][0]["success"], true);
}
