//! Startup ingestion: local sources (PDF, seed set, text directory) and
//! the object-storage bucket.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use urpaq_core::config::{expand_path, IngestSettings};
use urpaq_core::error::{Error, Result};
use urpaq_core::seed;
use urpaq_core::traits::ObjectStore;
use urpaq_core::types::RetrievalDocument;
use urpaq_storage::pdf::load_pdf_if_exists;
use urpaq_storage::text_dir::load_txt_documents;
use urpaq_storage::{decode_object, stable_document_id};

use crate::retrieval::RetrievalService;

pub const PDF_DOCUMENT_ID: &str = "pdf_schedule";
pub const PDF_DOCUMENT_NAME: &str = "Расписание кружков из PDF";

pub struct DataInitializer {
    retrieval: RetrievalService,
    settings: IngestSettings,
}

impl DataInitializer {
    pub fn new(retrieval: RetrievalService, settings: IngestSettings) -> Self {
        Self { retrieval, settings }
    }

    /// PDF first (when present and non-blank), then the seed set, then
    /// `.txt` files.
    pub async fn collect_documents(&self) -> Result<Vec<RetrievalDocument>> {
        let mut documents = Vec::new();

        let pdf_path = expand_path(&self.settings.pdf_path);
        let pdf_text = tokio::task::spawn_blocking(move || load_pdf_if_exists(&pdf_path))
            .await
            .map_err(|e| Error::Operation(format!("pdf task failed: {e}")))?;
        if !pdf_text.trim().is_empty() {
            documents.push(RetrievalDocument::new(PDF_DOCUMENT_ID, PDF_DOCUMENT_NAME, pdf_text));
        }

        if self.settings.seed_path.trim().is_empty() {
            documents.extend(seed::builtin_documents()?);
        } else {
            let path = expand_path(&self.settings.seed_path);
            info!("Loading seed documents from: {}", path.display());
            documents.extend(seed::load_seed_documents(&path)?);
        }

        if let Some(dir) = self.txt_dir() {
            documents.extend(load_txt_documents(&dir)?);
        }
        Ok(documents)
    }

    fn txt_dir(&self) -> Option<PathBuf> {
        let dir = self.settings.txt_dir.trim();
        if dir.is_empty() { None } else { Some(expand_path(dir)) }
    }

    /// Index everything from [`Self::collect_documents`]; returns the index
    /// size afterwards.
    pub async fn run(&self) -> Result<u64> {
        if self.settings.skip_seed {
            info!("Data initialization skipped (ingest.skip_seed=true)");
            return self.retrieval.count().await;
        }

        info!("=== Starting Data Initialization ===");
        info!("Use chunking: {}", self.settings.use_chunking);
        let started = Instant::now();

        let documents = self.collect_documents().await?;
        info!("Created {} documents for indexing", documents.len());

        let saved = if self.settings.use_chunking {
            info!("Saving documents with chunking...");
            self.retrieval.save_all_with_chunking(documents).await?
        } else {
            info!("Saving documents without chunking...");
            self.retrieval.save_all(documents).await?
        };
        debug!("Saved {} index entries", saved.len());

        let count = self.retrieval.count().await?;
        info!("=== Data Initialization Completed ===");
        info!("Total documents in index: {}", count);
        info!("Initialization took: {}ms", started.elapsed().as_millis());
        Ok(count)
    }
}

/// Copies every object of a bucket into the index.
pub struct ObjectLoader {
    objects: Arc<dyn ObjectStore>,
    retrieval: RetrievalService,
    use_chunking: bool,
}

impl ObjectLoader {
    pub fn new(objects: Arc<dyn ObjectStore>, retrieval: RetrievalService, use_chunking: bool) -> Self {
        Self { objects, retrieval, use_chunking }
    }

    pub async fn load_all(&self) -> Result<usize> {
        self.load_all_with(|_, _, _| {}).await
    }

    /// Like [`Self::load_all`], calling `on_object(done, total, key)` after
    /// each object is handled.
    pub async fn load_all_with(&self, mut on_object: impl FnMut(usize, usize, &str)) -> Result<usize> {
        let keys = self.objects.list_keys().await?;
        info!("Loading {} objects from storage", keys.len());

        let mut stored = 0usize;
        for (i, key) in keys.iter().enumerate() {
            match self.load_one(key).await {
                Ok(true) => {
                    stored += 1;
                    info!("Loaded: {}", key);
                }
                Ok(false) => debug!("Skipped empty object: {}", key),
                Err(e) => warn!("Error loading object {}: {}", key, e),
            }
            on_object(i + 1, keys.len(), key);
        }

        info!("Object storage load finished: {} of {} objects stored", stored, keys.len());
        Ok(stored)
    }

    async fn load_one(&self, key: &str) -> Result<bool> {
        let bytes = self.objects.get_object(key).await?;
        let owned_key = key.to_string();
        let text = tokio::task::spawn_blocking(move || decode_object(&owned_key, &bytes))
            .await
            .map_err(|e| Error::Operation(format!("decode task failed: {e}")))??;
        if text.trim().is_empty() {
            return Ok(false);
        }

        let document = RetrievalDocument::new(stable_document_id(key), key, text);
        if self.use_chunking {
            self.retrieval.save_with_chunking(document).await?;
        } else {
            self.retrieval.save(document).await?;
        }
        Ok(true)
    }
}
