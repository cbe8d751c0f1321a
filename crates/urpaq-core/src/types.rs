//! Domain types shared by the index, the pipeline and the HTTP surface.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type DocumentId = String;

/// A unit of knowledge stored in the full-text index.
///
/// - `id`: unique key; saving a document with an existing id replaces it
/// - `name`: human readable title, also searched
/// - `text`: the payload handed to the model as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalDocument {
    pub id: DocumentId,
    pub name: String,
    pub text: String,
}

impl RetrievalDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), text: text.into() }
    }
}

const CHUNK_ID_MARKER: &str = "_chunk_";

pub fn chunk_id(document_id: &str, index: usize) -> DocumentId {
    format!("{document_id}{CHUNK_ID_MARKER}{index}")
}

/// Id of the source document an index entry belongs to: the part before
/// `_chunk_<n>` for a chunk, the id itself otherwise.
pub fn source_document_id(id: &str) -> &str {
    match id.rsplit_once(CHUNK_ID_MARKER) {
        Some((source, index)) if !source.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
            source
        }
        _ => id,
    }
}

/// A slice of a source document that is indexed on its own.
///
/// `chunk_index` is the zero-based position within the parent document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: DocumentId,
    pub document_id: DocumentId,
    pub document_name: String,
    pub text: String,
    pub chunk_index: usize,
}

impl DocumentChunk {
    pub fn to_retrieval_document(&self) -> RetrievalDocument {
        RetrievalDocument {
            id: self.id.clone(),
            name: format!("{} (часть {})", self.document_name, self.chunk_index + 1),
            text: self.text.clone(),
        }
    }
}

/// Raw hit returned by a [`crate::traits::DocumentStore`]. Higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: RetrievalDocument,
    pub score: f32,
}

/// A document after weighting and merging by the search strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: RetrievalDocument,
    pub score: f64,
}

impl ScoredDocument {
    pub fn new(document: RetrievalDocument, score: f64) -> Self {
        Self { document, score }
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn text(&self) -> &str {
        &self.document.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryCategory {
    Schedule,
    Rooms,
    Teachers,
    Directions,
    Contacts,
    General,
}

impl QueryCategory {
    /// The Russian label; also used as the category search text.
    pub fn label(self) -> &'static str {
        match self {
            QueryCategory::Schedule => "расписание",
            QueryCategory::Rooms => "кабинеты",
            QueryCategory::Teachers => "учителя",
            QueryCategory::Directions => "направления",
            QueryCategory::Contacts => "контакты",
            QueryCategory::General => "общее",
        }
    }
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryCategory::Schedule => "SCHEDULE",
            QueryCategory::Rooms => "ROOMS",
            QueryCategory::Teachers => "TEACHERS",
            QueryCategory::Directions => "DIRECTIONS",
            QueryCategory::Contacts => "CONTACTS",
            QueryCategory::General => "GENERAL",
        };
        f.write_str(name)
    }
}

/// A user question after classification and keyword extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedQuery {
    pub original_query: String,
    pub metadata: String,
    pub category: QueryCategory,
    pub keywords: String,
}

impl ProcessedQuery {
    pub fn general(original_query: impl Into<String>) -> Self {
        Self {
            original_query: original_query.into(),
            metadata: String::new(),
            category: QueryCategory::General,
            keywords: String::new(),
        }
    }

    pub fn search_query(&self) -> &str {
        if self.keywords.trim().is_empty() { &self.original_query } else { &self.keywords }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationIssue {
    None,
    EmptyResponse,
    TooShort,
    TooLong,
    Truncated,
    Hallucination,
    Irrelevant,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationIssue::None => "NONE",
            ValidationIssue::EmptyResponse => "EMPTY_RESPONSE",
            ValidationIssue::TooShort => "TOO_SHORT",
            ValidationIssue::TooLong => "TOO_LONG",
            ValidationIssue::Truncated => "TRUNCATED",
            ValidationIssue::Hallucination => "HALLUCINATION",
            ValidationIssue::Irrelevant => "IRRELEVANT",
        };
        f.write_str(name)
    }
}

/// Who authored a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EType {
    User,
    AiHelper,
}

impl EType {
    pub fn display_name(self) -> &'static str {
        match self {
            EType::User => "Пользователь",
            EType::AiHelper => "DIGITAL URPAQ помошник",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub entity: EType,
    pub message: String,
    pub timestamp: NaiveDateTime,
}

/// One question/answer exchange as returned by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub entity: EType,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub response: ChatResponse,
}
