use std::sync::Arc;

use tracing::{debug, error, info, warn};

use urpaq_core::chunker::DocumentChunker;
use urpaq_core::error::{Error, Result};
use urpaq_core::traits::DocumentStore;
use urpaq_core::types::{DocumentId, RetrievalDocument};

use crate::cache::CacheService;

/// Document repository facade: chunking on write, cache invalidation, and
/// index work moved off the async runtime.
#[derive(Clone)]
pub struct RetrievalService {
    store: Arc<dyn DocumentStore>,
    chunker: DocumentChunker,
    cache: Arc<CacheService>,
}

impl RetrievalService {
    pub fn new(store: Arc<dyn DocumentStore>, chunker: DocumentChunker, cache: Arc<CacheService>) -> Self {
        Self { store, chunker, cache }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn DocumentStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| Error::Operation(format!("index task failed: {e}")))?
    }

    /// Index `parts` in place of everything previously stored for
    /// `sources`, so a re-loaded document never keeps stale chunks.
    async fn replace(&self, sources: Vec<DocumentId>, parts: Vec<RetrievalDocument>) -> Result<Vec<RetrievalDocument>> {
        let saved = self
            .blocking(move |store| {
                store.replace_sources(&sources, &parts)?;
                Ok(parts)
            })
            .await
            .inspect_err(|e| error!("Error saving documents: {}", e))?;
        self.cache.invalidate_search_cache();
        Ok(saved)
    }

    pub async fn save(&self, document: RetrievalDocument) -> Result<RetrievalDocument> {
        info!("Saving document: {}", document.name);
        let id = document.id.clone();
        let mut saved = self.replace(vec![id.clone()], vec![document]).await?;
        info!("Document saved successfully: {}", id);
        saved.pop().ok_or_else(|| Error::Operation(format!("document {id} was not saved")))
    }

    /// Index the document's chunks, or the document itself when it yields none.
    pub async fn save_with_chunking(&self, document: RetrievalDocument) -> Result<Vec<RetrievalDocument>> {
        info!("Saving document with chunking: {}", document.name);
        let chunks = self.chunker.chunk_document(&document);
        if chunks.is_empty() {
            warn!("No chunks created for document: {}", document.name);
            return Ok(vec![self.save(document).await?]);
        }
        info!("Created {} chunks for document: {}", chunks.len(), document.name);
        let parts: Vec<RetrievalDocument> = chunks.iter().map(|c| c.to_retrieval_document()).collect();
        self.replace(vec![document.id], parts).await
    }

    pub async fn save_all(&self, documents: Vec<RetrievalDocument>) -> Result<Vec<RetrievalDocument>> {
        info!("Saving {} documents", documents.len());
        let sources = documents.iter().map(|d| d.id.clone()).collect();
        self.replace(sources, documents).await
    }

    pub async fn save_all_with_chunking(&self, documents: Vec<RetrievalDocument>) -> Result<Vec<RetrievalDocument>> {
        info!("Saving {} documents with chunking", documents.len());
        let sources = documents.iter().map(|d| d.id.clone()).collect();
        let mut parts = Vec::new();
        for document in documents {
            let chunks = self.chunker.chunk_document(&document);
            if chunks.is_empty() {
                warn!("No chunks created for document: {}", document.name);
                parts.push(document);
            } else {
                debug!("Created {} chunks for document: {}", chunks.len(), document.name);
                parts.extend(chunks.iter().map(|c| c.to_retrieval_document()));
            }
        }
        self.replace(sources, parts).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<RetrievalDocument>> {
        let id = id.to_string();
        self.blocking(move |store| store.find_by_id(&id)).await
    }

    pub async fn find_all(&self) -> Result<Vec<RetrievalDocument>> {
        self.blocking(|store| store.find_all()).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        info!("Deleting document: {}", id);
        let owned = id.to_string();
        self.blocking(move |store| store.delete_by_id(&owned)).await?;
        self.cache.invalidate_search_cache();
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<()> {
        warn!("Deleting all documents");
        self.blocking(|store| store.delete_all()).await?;
        self.cache.invalidate_all();
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        self.blocking(|store| store.count()).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.blocking(move |store| store.exists(&id)).await
    }
}
