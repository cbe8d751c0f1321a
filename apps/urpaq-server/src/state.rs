use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use urpaq_core::chunker::{ChunkingConfig, DocumentChunker};
use urpaq_core::config::{IndexSettings, S3Settings, Settings};
use urpaq_core::error::Result;
use urpaq_core::traits::{ChatModel, DocumentStore, ObjectStore};
use urpaq_hybrid::SearchStrategy;
use urpaq_llm::Llm7Client;
use urpaq_rag::services::{AiService, ChatService, UploadService};
use urpaq_rag::{CacheService, RagMetrics, RagOrchestrator, RetrievalService};
use urpaq_storage::{InMemoryObjectStore, S3ObjectStore};
use urpaq_text::TantivyDocumentStore;

/// Everything a request handler or a binary needs, wired once.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub ai: AiService,
    pub uploads: UploadService,
    pub retrieval: RetrievalService,
    pub objects: Arc<dyn ObjectStore>,
    pub cache: Arc<CacheService>,
    pub metrics: Arc<RagMetrics>,
}

impl AppState {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn ChatModel>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        let cache = Arc::new(CacheService::default());
        let metrics = Arc::new(RagMetrics::new());
        let chunker = DocumentChunker::new(ChunkingConfig {
            chunk_size: settings.ingest.chunk_size,
            overlap: settings.ingest.chunk_overlap,
        });

        let orchestrator = Arc::new(RagOrchestrator::new(
            Arc::new(SearchStrategy::new(Arc::clone(&store))),
            Arc::clone(&model),
            Arc::clone(&cache),
            Arc::clone(&metrics),
            settings.rag.clone(),
            Duration::from_secs(settings.llm.timeout_secs),
        ));
        let ai = AiService::new(orchestrator, model);

        Self {
            chat: ChatService::new(ai.clone()),
            ai,
            uploads: UploadService::new(Arc::clone(&objects)),
            retrieval: RetrievalService::new(store, chunker, Arc::clone(&cache)),
            objects,
            cache,
            metrics,
        }
    }

    /// Production wiring: on-disk (or in-memory) index, hosted model, S3
    /// when a bucket is configured.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let store = open_store(&settings.index)?;
        let model: Arc<dyn ChatModel> = Arc::new(Llm7Client::new(&settings.llm)?);
        let objects = connect_objects(&settings.s3).await?;
        Ok(Self::new(settings, store, model, objects))
    }
}

pub fn open_store(settings: &IndexSettings) -> Result<Arc<dyn DocumentStore>> {
    match settings.path() {
        Some(dir) => {
            info!("Opening index at {}", dir.display());
            Ok(Arc::new(TantivyDocumentStore::open_or_create(&dir)?))
        }
        None => {
            warn!("index.dir is not set, keeping the index in memory");
            Ok(Arc::new(TantivyDocumentStore::in_memory()?))
        }
    }
}

pub async fn connect_objects(settings: &S3Settings) -> Result<Arc<dyn ObjectStore>> {
    if settings.is_configured() {
        Ok(Arc::new(S3ObjectStore::connect(settings).await?))
    } else {
        warn!("s3.bucket is not set, uploads are kept in memory");
        Ok(Arc::new(InMemoryObjectStore::new()))
    }
}
