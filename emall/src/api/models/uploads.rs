//! API response models for the image upload relay.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of relaying an upload to the image CDN. Field names match what the
/// admin frontend expects.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Delivery URL with the eager transformation applied
    pub image_url: String,
    /// CDN public id, kept so the asset can be referenced later
    pub public_id: String,
}
