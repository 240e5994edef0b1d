//! Duplicate detection.
//!
//! A process runs with exactly one `DuplicatePolicy`. Each policy answers two
//! questions for an upload: which container the documents go to, and what marks the
//! upload as already ingested.
//!
//! - `ContentHash`: every upload goes to the same container; the MD5 digest of the raw
//!   bytes is the identity, recorded after a successful insert.
//! - `FileName`: the container is a slug of the uploaded filename; an existing
//!   container means the file was ingested before.
//! - `UserNamed`: the container is the sanitized name typed by the user; an existing
//!   container is rejected and named in the error.

use super::UploadedFile;
use crate::error::IngestError;
use crate::store::DocumentStore;
use common::model::upload::UploadRecord;
use regex::Regex;
use std::sync::OnceLock;

/// Container used when a name sanitizes down to nothing.
pub const FALLBACK_COLLECTION: &str = "uploaded_data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicatePolicy {
    ContentHash { collection: String },
    FileName,
    UserNamed,
}

/// Where an upload goes and how to tell whether it was ingested before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestPlan {
    pub collection: String,
    /// Present for the content-hash policy only; persisted once the batch is stored.
    pub identity: Option<UploadRecord>,
}

impl DuplicatePolicy {
    /// Parses the `DUPLICATE_POLICY` setting. `topics_collection` is the fixed
    /// destination of the content-hash policy.
    pub fn parse(raw: &str, topics_collection: String) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "content-hash" | "content_hash" | "hash" => Some(DuplicatePolicy::ContentHash {
                collection: topics_collection,
            }),
            "file-name" | "file_name" | "filename" => Some(DuplicatePolicy::FileName),
            "user-named" | "user_named" => Some(DuplicatePolicy::UserNamed),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DuplicatePolicy::ContentHash { .. } => "content-hash",
            DuplicatePolicy::FileName => "file-name",
            DuplicatePolicy::UserNamed => "user-named",
        }
    }

    pub fn requires_collection_name(&self) -> bool {
        matches!(self, DuplicatePolicy::UserNamed)
    }

    /// Resolves the destination of an upload without touching the store.
    ///
    /// Fails with `MissingCollectionName` when the user-named policy gets no name (an
    /// empty form field counts as none). The check happens before sanitization, so a
    /// whitespace-only name still falls back.
    pub fn plan(
        &self,
        file: &UploadedFile,
        collection_name: Option<&str>,
    ) -> Result<IngestPlan, IngestError> {
        match self {
            DuplicatePolicy::ContentHash { collection } => Ok(IngestPlan {
                collection: collection.clone(),
                identity: Some(UploadRecord {
                    file_hash: file.md5.clone(),
                }),
            }),
            DuplicatePolicy::FileName => Ok(IngestPlan {
                collection: sanitize_file_name(&file.name),
                identity: None,
            }),
            DuplicatePolicy::UserNamed => {
                let raw = collection_name
                    .filter(|name| !name.is_empty())
                    .ok_or(IngestError::MissingCollectionName)?;
                Ok(IngestPlan {
                    collection: sanitize_collection_name(raw),
                    identity: None,
                })
            }
        }
    }
}

impl IngestPlan {
    /// Rejects the upload with `DuplicateUpload` if it was ingested before.
    pub fn check(&self, store: &dyn DocumentStore) -> Result<(), IngestError> {
        match &self.identity {
            Some(record) => {
                if store.upload_recorded(&record.file_hash)? {
                    return Err(IngestError::DuplicateUpload(format!(
                        "content digest {}",
                        record.file_hash
                    )));
                }
            }
            None => {
                if store.collection_exists(&self.collection)? {
                    return Err(IngestError::DuplicateUpload(format!(
                        "collection '{}' already exists",
                        self.collection
                    )));
                }
            }
        }
        Ok(())
    }
}

fn non_alphanumeric_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid collection name regex"))
}

fn unsafe_file_name_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\- ]").expect("valid file name regex"))
}

/// Turns a user supplied name into a container name.
///
/// Trims and lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `_`, strips `_` from both ends. Falls back to `FALLBACK_COLLECTION` when
/// nothing is left.
pub fn sanitize_collection_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = non_alphanumeric_runs().replace_all(&lowered, "_");
    let name = collapsed.trim_matches('_');
    if name.is_empty() {
        FALLBACK_COLLECTION.to_string()
    } else {
        name.to_string()
    }
}

/// Turns an uploaded filename into a container name.
///
/// Directory components and the extension are dropped, unsafe characters removed,
/// spaces replaced with `_`, and the result lowercased.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    let safe = unsafe_file_name_chars().replace_all(stem, "");
    let name = safe.trim().replace(' ', "_").to_lowercase();
    if name.is_empty() {
        FALLBACK_COLLECTION.to_string()
    } else {
        name
    }
}
