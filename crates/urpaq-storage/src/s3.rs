use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, info};

use urpaq_core::config::S3Settings;
use urpaq_core::error::{Error, Result};
use urpaq_core::traits::ObjectStore;

fn storage_err(context: &str, e: impl std::error::Error) -> Error {
    Error::Storage(format!("{context}: {}", DisplayErrorContext(e)))
}

pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into(), prefix: prefix.into() }
    }

    /// Static credentials against a custom endpoint when keys are set,
    /// otherwise the default AWS provider chain.
    pub async fn connect(settings: &S3Settings) -> Result<Self> {
        if !settings.is_configured() {
            return Err(Error::InvalidConfig("s3.bucket is not set".into()));
        }
        let region = Region::new(settings.region.clone());

        let config = if settings.has_static_credentials() {
            let credentials = Credentials::new(&settings.access_key, &settings.secret_key, None, None, "static");
            let mut builder = aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(credentials)
                .force_path_style(true);
            if !settings.endpoint.is_empty() {
                builder = builder.endpoint_url(&settings.endpoint);
            }
            builder.build()
        } else {
            let sdk = aws_config::defaults(BehaviorVersion::latest()).load().await;
            let mut builder = aws_sdk_s3::config::Builder::from(&sdk).region(region).force_path_style(true);
            if !settings.endpoint.is_empty() {
                builder = builder.endpoint_url(&settings.endpoint);
            }
            builder.build()
        };

        info!("S3 store ready: bucket={} endpoint={}", settings.bucket, settings.endpoint);
        Ok(Self::new(S3Client::from_conf(config), settings.bucket.clone(), settings.prefix.clone()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| storage_err("Failed to write to S3", e))?;
        debug!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket);
        if !self.prefix.is_empty() {
            request = request.prefix(&self.prefix);
        }
        let mut pages = request.into_paginator().send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| storage_err("Failed to list S3 objects", e))?;
            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));
        }
        Ok(keys)
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_err("Failed to read from S3", e))?;
        let data = resp.body.collect().await.map_err(|e| storage_err("Failed to collect S3 data", e))?;
        Ok(data.into_bytes().to_vec())
    }
}
