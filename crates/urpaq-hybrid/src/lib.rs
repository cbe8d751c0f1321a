//! urpaq-hybrid
//!
//! Combines a free-text match and a category match over the document
//! store into one ranked list.
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{error, info};

use urpaq_core::traits::DocumentStore;
use urpaq_core::types::{ProcessedQuery, QueryCategory, ScoredDocument};

const TEXT_WEIGHT: f64 = 1.0;
const CATEGORY_WEIGHT: f64 = 0.5;
const REPEAT_FACTOR: f64 = 0.5;
/// Hits fetched per sub-search before merging.
const CANDIDATES_PER_SEARCH: usize = 10;

static RESERVED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["*\[\]{}()?]"#).expect("reserved pattern"));
/// Operators the index query parser would read as syntax; they split words.
static OPERATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+\-^~:!\\/<>=']").expect("operator pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

pub struct SearchStrategy {
    store: Arc<dyn DocumentStore>,
}

impl SearchStrategy {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn hybrid_search(&self, query: &ProcessedQuery, top_k: usize) -> Vec<ScoredDocument> {
        let search_text = query.search_query();
        let category = query.category;
        info!("Executing hybrid search for: '{}', category: {}, topK: {}", search_text, category.label(), top_k);

        let limit = CANDIDATES_PER_SEARCH.max(top_k);
        let mut results = self.text_match(search_text, limit);
        results.extend(self.category_match(category, limit));

        let mut merged = merge_and_rank(results);
        info!("Found {} unique documents after merging", merged.len());
        merged.truncate(top_k);
        merged
    }

    fn text_match(&self, search_text: &str, limit: usize) -> Vec<ScoredDocument> {
        let safe_text = sanitize_search_text(search_text);
        if safe_text.is_empty() {
            return Vec::new();
        }
        self.execute_search(&safe_text, TEXT_WEIGHT, limit)
    }

    fn category_match(&self, category: QueryCategory, limit: usize) -> Vec<ScoredDocument> {
        if category == QueryCategory::General {
            return Vec::new();
        }
        self.execute_search(category.label(), CATEGORY_WEIGHT, limit)
    }

    fn execute_search(&self, text: &str, weight: f64, limit: usize) -> Vec<ScoredDocument> {
        match self.store.search(text, limit) {
            Ok(hits) => hits
                .into_iter()
                .map(|hit| {
                    let score = weighted_score(hit.score, weight, &hit.document.text);
                    ScoredDocument::new(hit.document, score)
                })
                .collect(),
            Err(e) => {
                error!("Search error: {}", e);
                Vec::new()
            }
        }
    }
}

/// `raw × weight` plus a bonus of up to 0.1 for documents of 1000+ chars.
pub fn weighted_score(raw: f32, weight: f64, text: &str) -> f64 {
    let length_bonus = (text.chars().count() as f64 / 1000.0).min(1.0) * 0.1;
    f64::from(raw) * weight + length_bonus
}

/// Strip query-syntax characters and collapse whitespace.
pub fn sanitize_search_text(text: &str) -> String {
    let stripped = RESERVED.replace_all(text, "");
    let stripped = OPERATORS.replace_all(&stripped, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Collapse repeated ids (adding half of each repeat's score), best first.
pub fn merge_and_rank(results: Vec<ScoredDocument>) -> Vec<ScoredDocument> {
    let mut by_id: HashMap<String, ScoredDocument> = HashMap::new();
    for doc in results {
        by_id
            .entry(doc.document.id.clone())
            .and_modify(|existing| existing.score += doc.score * REPEAT_FACTOR)
            .or_insert(doc);
    }
    let mut merged: Vec<ScoredDocument> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.document.id.cmp(&b.document.id))
    });
    merged
}
