use serde::{Deserialize, Serialize};

/// Outcome category of an upload, as seen by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Success,
    MissingFile,
    MissingCollectionName,
    Duplicate,
    ParseError,
    EmptyFile,
    FileTooLarge,
    InvalidForm,
    StorageError,
}

/// JSON body returned by `POST /api/topics/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: UploadStatus,
    /// Human readable message shown under the form.
    pub message: String,
    /// Container the documents went to, on success.
    pub collection: Option<String>,
    /// Number of documents written, on success.
    pub inserted: Option<usize>,
}

impl UploadResponse {
    pub fn success(collection: String, inserted: usize) -> Self {
        Self {
            status: UploadStatus::Success,
            message: format!(
                "Data uploaded successfully: {} document(s) stored in '{}'.",
                inserted, collection
            ),
            collection: Some(collection),
            inserted: Some(inserted),
        }
    }

    pub fn failure(status: UploadStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            collection: None,
            inserted: None,
        }
    }
}

/// JSON body returned by `GET /api/topics/policy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInfo {
    /// `content-hash`, `file-name` or `user-named`.
    pub policy: String,
    /// Whether the form has to send a `collection_name` field.
    pub requires_collection_name: bool,
}

/// JSON body returned by `GET /api/topics/collections/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    pub exists: bool,
    pub documents: usize,
}
