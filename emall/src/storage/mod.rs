//! Image storage abstraction layer.
//!
//! This module defines the [`ImageStorage`] trait which abstracts hosted image
//! storage. The only production implementation talks to Cloudinary; tests
//! point the client at a local mock server instead.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::errors::Result;

pub mod cloudinary;

/// Create an image storage backend from configuration
pub fn create_storage(config: &StorageConfig) -> Arc<dyn ImageStorage> {
    Arc::new(cloudinary::CloudinaryClient::new(config))
}

/// An image that has been accepted by the storage backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Publicly servable HTTPS URL
    pub url: String,
    /// Backend identifier, kept so the asset can be deleted later
    pub public_id: String,
}

/// Abstract hosted image storage
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Upload one image and return where it ended up.
    ///
    /// `folder` namespaces the asset on the backend (e.g. `emall/rooms`).
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str, folder: &str) -> Result<StoredImage>;
}
