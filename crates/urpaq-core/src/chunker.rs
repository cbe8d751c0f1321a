use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::types::{chunk_id, DocumentChunk, RetrievalDocument};

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("sentence pattern"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("paragraph pattern"));

/// Sizes are in characters, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 100 }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DocumentChunker {
    config: ChunkingConfig,
}

impl DocumentChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    /// Split a document into paragraph-packed chunks with a short overlap
    /// between neighbours. Paragraphs longer than `chunk_size` are packed
    /// sentence by sentence.
    pub fn chunk_document(&self, document: &RetrievalDocument) -> Vec<DocumentChunk> {
        let mut builder = ChunkBuilder { document, chunks: Vec::new() };
        if document.text.trim().is_empty() {
            return builder.chunks;
        }

        let ChunkingConfig { chunk_size, overlap } = self.config;
        let mut current = String::new();

        for paragraph in PARAGRAPH_BREAK.split(&document.text) {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            let paragraph_len = char_len(paragraph);

            if paragraph_len > chunk_size {
                if !current.is_empty() {
                    builder.push(&current);
                    current.clear();
                }
                self.chunk_large_paragraph(&mut builder, paragraph);
                continue;
            }

            if !current.is_empty() && char_len(&current) + paragraph_len > chunk_size {
                builder.push(&current);
                current = overlap_tail(&current, overlap).to_string();
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
        }

        if !current.is_empty() {
            builder.push(&current);
        }

        debug!(document = %document.name, chunks = builder.chunks.len(), "Document chunked");
        builder.chunks
    }

    fn chunk_large_paragraph(&self, builder: &mut ChunkBuilder<'_>, paragraph: &str) {
        let ChunkingConfig { chunk_size, overlap } = self.config;
        let mut current = String::new();

        for sentence in SENTENCE_BREAK.split(paragraph) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            if !current.is_empty() && char_len(&current) + char_len(sentence) > chunk_size {
                builder.push(&current);
                current = overlap_tail(&current, overlap).to_string();
            }
            if !current.is_empty() {
                current.push_str(". ");
            }
            current.push_str(sentence);
        }

        if !current.is_empty() {
            builder.push(&current);
        }
    }
}

struct ChunkBuilder<'a> {
    document: &'a RetrievalDocument,
    chunks: Vec<DocumentChunk>,
}

impl ChunkBuilder<'_> {
    fn push(&mut self, text: &str) {
        let index = self.chunks.len();
        self.chunks.push(DocumentChunk {
            id: chunk_id(&self.document.id, index),
            document_id: self.document.id.clone(),
            document_name: self.document.name.clone(),
            text: text.trim().to_string(),
            chunk_index: index,
        });
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `overlap` characters of `text`, starting at the next sentence
/// when one begins early in the tail.
pub fn overlap_tail(text: &str, overlap: usize) -> &str {
    let total = char_len(text);
    if total <= overlap {
        return text;
    }
    let start = text.char_indices().nth(total - overlap).map_or(text.len(), |(i, _)| i);
    let tail = &text[start..];

    if let Some(byte_pos) = tail.find(". ") {
        let char_pos = char_len(&tail[..byte_pos]);
        if char_pos > 0 && char_pos < overlap / 2 {
            return &tail[byte_pos + 2..];
        }
    }
    tail
}
