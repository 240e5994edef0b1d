use serde::{Deserialize, Serialize};

/// Identity of an upload that has already been ingested.
///
/// Only the content-hash duplicate policy keeps these. A record is written once the
/// topic batch it belongs to has been stored and is never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Lowercase hex MD5 of the raw uploaded bytes.
    pub file_hash: String,
}
