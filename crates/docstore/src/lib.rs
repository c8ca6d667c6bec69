//! Docstore - Document store boundary for training run metadata
//!
//! Thin CRUD interface over schemaless JSON documents, with an in-memory
//! reference implementation. An empty filter matches every record and an
//! empty patch sets nothing; both defaults are constructed fresh per call,
//! never shared between calls.

mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use vault_core::Result;

pub use memory::MemoryStore;

/// A schemaless record: a JSON object map
pub type Document = Map<String, Value>;

/// Construct an empty filter (matches every record)
///
/// Built per call so no two call sites ever share a default value.
pub fn empty_filter() -> Document {
    Document::new()
}

/// Construct an empty patch (sets nothing)
pub fn empty_patch() -> Document {
    Document::new()
}

/// Async trait for document store backends
///
/// Filters match on top-level fields: a record matches when every filter
/// field is present with an equal value. Patches merge their fields into
/// the matched record, overwriting existing values.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch all records matching the filter
    async fn find(&self, filter: &Document) -> Result<Vec<Document>>;

    /// Insert a new record
    async fn insert(&self, record: Document) -> Result<()>;

    /// Apply the patch to the first record matching the filter
    ///
    /// A no-op when nothing matches.
    async fn update_one(&self, filter: &Document, patch: &Document) -> Result<()>;
}
