//! Document storage behind the ingestion pipeline.
//!
//! The pipeline only needs a handful of operations from the store: an existence check
//! for containers, one batch insert, and the identity-record lookups used by the
//! content-hash policy. They are grouped in the `DocumentStore` trait so the pipeline
//! can be driven by any backend; `SqliteStore` is the one the server runs with.
//!
//! A container is a named grouping of JSON documents, created on first insert.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use common::model::upload::UploadRecord;
use serde_json::Value;

pub trait DocumentStore: Send + Sync {
    /// Whether a container with this exact name holds (or once held) documents.
    fn collection_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Writes every document into `collection` as a single batch and returns how many
    /// were written. The container is created if it does not exist yet.
    fn insert_many(&self, collection: &str, documents: &[Value]) -> Result<usize, StoreError>;

    /// Whether an upload with this digest has been recorded.
    fn upload_recorded(&self, file_hash: &str) -> Result<bool, StoreError>;

    fn record_upload(&self, record: &UploadRecord) -> Result<(), StoreError>;

    fn count_documents(&self, collection: &str) -> Result<usize, StoreError>;
}
