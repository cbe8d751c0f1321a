use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DocumentId, RetrievalDocument, SearchHit};

/// Document repository backed by a full-text index.
pub trait DocumentStore: Send + Sync {
    /// Insert or replace the document with the same id.
    fn save(&self, document: &RetrievalDocument) -> Result<()>;
    fn save_many(&self, documents: &[RetrievalDocument]) -> Result<usize>;
    /// Drop every entry of the listed source documents (the document and
    /// its chunks), then index `documents`, as one commit.
    fn replace_sources(&self, source_ids: &[DocumentId], documents: &[RetrievalDocument]) -> Result<usize>;
    fn find_by_id(&self, id: &str) -> Result<Option<RetrievalDocument>>;
    fn find_all(&self) -> Result<Vec<RetrievalDocument>>;
    fn delete_by_id(&self, id: &str) -> Result<()>;
    fn delete_all(&self) -> Result<()>;
    fn count(&self) -> Result<u64>;
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }
    /// Full-text match over name and text, best hits first.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;
    async fn list_keys(&self) -> Result<Vec<String>>;
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;
}
