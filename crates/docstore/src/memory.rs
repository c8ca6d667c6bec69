//! In-memory document store
//!
//! Reference implementation of the [`DocumentStore`] boundary; holds
//! records in a `RwLock`-guarded vector. Used in tests and single-process
//! setups where a database would be overkill.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use vault_core::Result;

use crate::{Document, DocumentStore};

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Top-level subset match: every filter field present and equal
fn matches(record: &Document, filter: &Document) -> bool {
    filter.iter().all(|(k, v)| record.get(k) == Some(v))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, filter: &Document) -> Result<Vec<Document>> {
        let records = self.records.read().await;
        let found: Vec<Document> = records
            .iter()
            .filter(|r| matches(r, filter))
            .cloned()
            .collect();
        debug!(matched = found.len(), total = records.len(), "Found documents");
        Ok(found)
    }

    async fn insert(&self, record: Document) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn update_one(&self, filter: &Document, patch: &Document) -> Result<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.iter_mut().find(|r| matches(r, filter)) {
            for (k, v) in patch {
                record.insert(k.clone(), v.clone());
            }
            debug!(fields = patch.len(), "Updated document");
        }
        Ok(())
    }
}
