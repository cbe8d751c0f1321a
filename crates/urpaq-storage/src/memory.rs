use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use urpaq_core::error::{Error, Result};
use urpaq_core::traits::ObjectStore;

/// Object store kept in a sorted map; used in tests and local runs
/// without a bucket.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, (Vec<u8>, String)>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().await.get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.write().await.insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.objects.read().await.keys().cloned().collect())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| Error::NotFound(format!("object {key}")))
    }
}
