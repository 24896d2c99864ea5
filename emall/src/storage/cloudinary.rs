//! Cloudinary upload client.
//!
//! Uploads go to `POST {base}/v1_1/{cloud_name}/image/upload` as signed
//! multipart requests. The signature is the SHA-256 hex digest of the
//! alphabetically sorted non-file parameters concatenated with the API
//! secret, per Cloudinary's signed upload scheme.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::instrument;
use url::Url;

use crate::config::StorageConfig;
use crate::errors::{Error, Result};
use crate::storage::{ImageStorage, StoredImage};

/// Applied to every upload so the CDN serves sensibly compressed variants
const UPLOAD_TRANSFORMATION: &str = "q_auto,f_auto";

pub struct CloudinaryClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
}

impl CloudinaryClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Sign the request parameters. Keys must already be in alphabetical
    /// order; `file` and `api_key` are excluded from the signature.
    fn signature(&self, folder: &str, timestamp: i64) -> String {
        let to_sign = format!(
            "folder={folder}&timestamp={timestamp}&transformation={transformation}{secret}",
            transformation = UPLOAD_TRANSFORMATION,
            secret = self.api_secret,
        );

        let digest = Sha256::digest(to_sign.as_bytes());
        hex::encode(digest)
    }

    fn upload_url(&self) -> Result<Url> {
        self.base_url
            .join(&format!("/v1_1/{}/image/upload", self.cloud_name))
            .map_err(|e| Error::Internal {
                operation: format!("build upload URL: {e}"),
            })
    }
}

#[async_trait]
impl ImageStorage for CloudinaryClient {
    #[instrument(skip(self, data), fields(filename = %filename, folder = %folder, bytes = data.len()))]
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str, folder: &str) -> Result<StoredImage> {
        let timestamp = Utc::now().timestamp();
        let signature = self.signature(folder, timestamp);

        let file_part = reqwest::multipart::Part::stream(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| Error::Internal {
                operation: format!("build multipart file part: {e}"),
            })?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("folder", folder.to_string())
            .text("transformation", UPLOAD_TRANSFORMATION);

        let response = self
            .http
            .post(self.upload_url()?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Image upload request failed: {e}");
                Error::Internal {
                    operation: "upload image to storage backend".to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Storage backend rejected upload with {status}: {body}");
            return Err(Error::Internal {
                operation: "upload image to storage backend".to_string(),
            });
        }

        let uploaded: CloudinaryUploadResponse = response.json().await.map_err(|e| {
            tracing::error!("Storage backend returned an unparseable upload response: {e}");
            Error::Internal {
                operation: "parse storage backend response".to_string(),
            }
        })?;

        Ok(StoredImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}
