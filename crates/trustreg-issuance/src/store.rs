//! Off-system metadata storage.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::IssuanceError;

/// URI scheme of [`InMemoryContentStore`] objects.
pub const CONTENT_URI_SCHEME: &str = "content://";

/// Pins a JSON document and returns an opaque URI for it.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put(&self, json: &str) -> Result<String, IssuanceError>;
}

/// Content-addressed in-memory store keyed by the BLAKE3 hash of the document.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    objects: DashMap<String, String>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a pinned document.
    pub fn get(&self, uri: &str) -> Option<String> {
        self.objects.get(uri).map(|doc| doc.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, json: &str) -> Result<String, IssuanceError> {
        serde_json::from_str::<serde_json::Value>(json)?;
        let uri = format!(
            "{}{}",
            CONTENT_URI_SCHEME,
            hex::encode(blake3::hash(json.as_bytes()).as_bytes())
        );
        self.objects.insert(uri.clone(), json.to_string());
        tracing::debug!(uri = %uri, bytes = json.len(), "metadata pinned");
        Ok(uri)
    }
}

/// Metadata document of a diploma access credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomaMetadata {
    pub name: String,
    pub description: String,
    /// Image URI.
    pub image: String,
    /// Free-form attributes of the diploma.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl DiplomaMetadata {
    pub fn to_json(&self) -> Result<String, IssuanceError> {
        Ok(serde_json::to_string(self)?)
    }
}
