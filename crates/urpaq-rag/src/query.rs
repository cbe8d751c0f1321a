use tracing::info;

use urpaq_core::types::{ProcessedQuery, QueryCategory};

const KEYWORDS_MARKER: &str = "[ключевые слова]:";

/// First matching group wins.
const CATEGORY_STEMS: &[(QueryCategory, &[&str])] = &[
    (QueryCategory::Schedule, &["расписание", "звонк"]),
    (QueryCategory::Rooms, &["кабинет", "лаборатор"]),
    (QueryCategory::Teachers, &["учител", "педагог", "преподават"]),
    (QueryCategory::Directions, &["направлен", "кружок", "секци"]),
    (QueryCategory::Contacts, &["контакт", "телефон", "адрес"]),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct QueryProcessor;

impl QueryProcessor {
    pub fn process(&self, user_query: &str) -> ProcessedQuery {
        if user_query.trim().is_empty() {
            return ProcessedQuery {
                original_query: user_query.to_string(),
                metadata: String::new(),
                category: QueryCategory::General,
                keywords: String::new(),
            };
        }

        let lower = user_query.to_lowercase();
        let category = determine_category(&lower);
        let keywords = extract_keywords(&lower);
        info!("Processed query - Category: {}, Keywords: {}", category, keywords);

        ProcessedQuery { original_query: user_query.to_string(), metadata: lower, category, keywords }
    }
}

pub fn determine_category(lower: &str) -> QueryCategory {
    CATEGORY_STEMS
        .iter()
        .find(|(_, stems)| stems.iter().any(|stem| lower.contains(stem)))
        .map_or(QueryCategory::General, |(category, _)| *category)
}

/// Text after the keywords marker up to the next `[`, or the whole input.
pub fn extract_keywords(lower: &str) -> String {
    match lower.split_once(KEYWORDS_MARKER) {
        Some((_, rest)) => rest.split('[').next().unwrap_or_default().trim().to_string(),
        None => lower.to_string(),
    }
}
